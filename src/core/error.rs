//! 错误类型
//!
//! AgentError：Crew 执行过程中的错误（LLM、工具、解析、步数上限、输出文件）；
//! ConfigError：配置加载与密钥缺失。二者都在编排边界（agent::run_theology_search）被捕获。

use thiserror::Error;

/// Crew 运行过程中可能出现的错误
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("Tool execution failed: {0}")]
    ToolExecutionFailed(String),

    #[error("Tool timeout: {0}")]
    ToolTimeout(String),

    /// 模型调用了 Agent 未绑定的工具
    #[error("Hallucinated tool: {0}")]
    HallucinatedTool(String),

    /// 超过 llm.max_steps 仍未给出最终回答
    #[error("Max steps exceeded ({0}) without a final answer")]
    MaxStepsExceeded(usize),

    #[error("Failed to write output file {path}: {source}")]
    OutputFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 启动时缺失的密钥
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingSecret {
    LlmApiKey,
    SearchApiKey,
}

impl MissingSecret {
    /// 对应的环境变量名
    pub fn env_var(&self) -> &'static str {
        match self {
            MissingSecret::LlmApiKey => "OPENAI_API_KEY",
            MissingSecret::SearchApiKey => "SERPER_API_KEY",
        }
    }
}

impl std::fmt::Display for MissingSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingSecret::LlmApiKey => write!(f, "OpenAI API key not found in secrets."),
            MissingSecret::SearchApiKey => write!(f, "Serper Dev API key not found in secrets."),
        }
    }
}

/// 配置错误：文件/环境变量解析失败，或密钥缺失（查询路径不可用）
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config load error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("{}", join_missing(.0))]
    MissingSecrets(Vec<MissingSecret>),
}

fn join_missing(missing: &[MissingSecret]) -> String {
    missing
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
