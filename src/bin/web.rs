//! Scholastic Web UI
//!
//! 启动: cargo run --bin scholastic-web --features web
//! 浏览器访问 http://127.0.0.1:8080

use std::sync::Arc;

use anyhow::Context;
use scholastic::agent::create_agent_components;
use scholastic::config::{load_config, Secrets};
use scholastic::web::{router, WebState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = load_config(None).context("Failed to load config")?;

    scholastic::observability::init(&cfg.app.log_file)
        .with_context(|| format!("Failed to open log file {}", cfg.app.log_file.display()))?;

    // 密钥缺失不退出：页面展示错误并禁用提问
    let (components, config_errors) = match Secrets::from_env() {
        Ok(secrets) => (Some(Arc::new(create_agent_components(&cfg, &secrets))), vec![]),
        Err(e) => {
            tracing::error!("{}", e);
            let errors = match e {
                scholastic::core::ConfigError::MissingSecrets(missing) => {
                    missing.iter().map(|m| m.to_string()).collect()
                }
                other => vec![other.to_string()],
            };
            (None, errors)
        }
    };

    let port = std::env::var("SCHOLASTIC_WEB_PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(cfg.web.port);

    let state = Arc::new(WebState {
        config: cfg,
        components,
        config_errors,
    });
    let app = router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Scholastic Web UI: http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
