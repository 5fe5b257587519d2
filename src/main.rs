//! Scholastic 命令行
//!
//! 入口：加载配置、初始化日志；ask 子命令跑一次神学查询，normalize 子命令对保存的结果 JSON 做归一化。

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use scholastic::agent::{ask, create_agent_components, outcome_from_file};
use scholastic::config::{load_config, Secrets};

#[derive(Parser)]
#[command(name = "scholastic")]
#[command(about = "Reformed Scholastic Theology Q&A", long_about = None)]
#[command(version)]
struct Cli {
    /// 额外的 TOML 配置文件（覆盖 config/default.toml）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a theological question
    Ask {
        /// The question; defaults to the sample question
        question: Option<String>,

        /// Also print the raw crew output
        #[arg(long)]
        raw: bool,
    },

    /// Extract the display answer from a saved crew result (JSON file)
    Normalize {
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = load_config(cli.config.clone()).context("Failed to load config")?;

    scholastic::observability::init(&cfg.app.log_file)
        .with_context(|| format!("Failed to open log file {}", cfg.app.log_file.display()))?;

    match cli.command {
        Commands::Ask { question, raw } => {
            let secrets = match Secrets::from_env() {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!("{}", e);
                    anyhow::bail!("{e}");
                }
            };
            let question = question.unwrap_or_else(|| cfg.web.default_question.clone());
            let components = create_agent_components(&cfg, &secrets);

            let outcome = ask(&components, &question).await;
            print!("{}", outcome.render_text(raw));
        }
        Commands::Normalize { file } => {
            let outcome = outcome_from_file(&file)?;
            print!("{}", outcome.render_text(false));
        }
    }

    Ok(())
}
