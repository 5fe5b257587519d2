//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `SCHOLASTIC__*` 覆盖（双下划线表示嵌套，如 `SCHOLASTIC__LLM__MODEL=gpt-4o`）。
//! 密钥（OPENAI_API_KEY / SERPER_API_KEY）不放在 TOML 里，由 [`Secrets::from_env`] 在启动时读取一次，
//! 之后以显式结构体传递，核心逻辑不再读取环境变量。

use std::path::PathBuf;

use serde::Deserialize;

use crate::core::{ConfigError, MissingSecret};

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub task: TaskSection,
    pub tools: ToolsSection,
    pub web: WebSection,
}

/// [app] 段：应用名、日志文件
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    #[serde(default = "default_app_name")]
    pub name: String,
    /// 日志追加写入的本地文件（同时输出到 stdout）
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_file: default_log_file(),
        }
    }
}

fn default_app_name() -> String {
    "Reformed Scholastic Theology Q&A".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("theology_output.log")
}

/// [llm] 段：模型与采样参数
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    #[serde(default = "default_model")]
    pub model: String,
    /// OpenAI 兼容端点；缺省为官方 API
    pub base_url: Option<String>,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// 单次 Crew 执行内最多的 LLM 轮数（工具调用 + 最终回答）
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: None,
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            max_steps: default_max_steps(),
        }
    }
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_max_tokens() -> u32 {
    800
}

fn default_max_steps() -> usize {
    10
}

/// [task] 段：任务输出文件（空字符串表示不写文件）
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TaskSection {
    #[serde(default)]
    pub output_file: String,
}

/// [tools] 段：工具超时与搜索参数
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsSection {
    /// 单次工具调用超时（秒）
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
    #[serde(default)]
    pub search: SearchSection,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            tool_timeout_secs: default_tool_timeout_secs(),
            search: SearchSection::default(),
        }
    }
}

fn default_tool_timeout_secs() -> u64 {
    30
}

/// [tools.search] 段：Serper 端点、结果条数、超时、最大字符数
#[derive(Debug, Clone, Deserialize)]
pub struct SearchSection {
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_num_results")]
    pub num_results: usize,
    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_result_chars")]
    pub max_result_chars: usize,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            num_results: default_num_results(),
            timeout_secs: default_search_timeout_secs(),
            max_result_chars: default_max_result_chars(),
        }
    }
}

fn default_search_endpoint() -> String {
    "https://google.serper.dev/search".to_string()
}

fn default_num_results() -> usize {
    5
}

fn default_search_timeout_secs() -> u64 {
    15
}

fn default_max_result_chars() -> usize {
    8000
}

/// [web] 段：端口与输入框默认问题
#[derive(Debug, Clone, Deserialize)]
pub struct WebSection {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_question")]
    pub default_question: String,
}

impl Default for WebSection {
    fn default() -> Self {
        Self {
            port: default_port(),
            default_question: default_question(),
        }
    }
}

fn default_port() -> u16 {
    8080
}

fn default_question() -> String {
    crate::theology::DEFAULT_QUESTION.to_string()
}

/// 从 config 目录加载配置，环境变量 SCHOLASTIC__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 SCHOLASTIC__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("SCHOLASTIC")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    Ok(c.try_deserialize()?)
}

/// 启动时注入的两个密钥：LLM API Key 与搜索 API Key
#[derive(Clone)]
pub struct Secrets {
    pub llm_api_key: String,
    pub search_api_key: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("llm_api_key", &"<redacted>")
            .field("search_api_key", &"<redacted>")
            .finish()
    }
}

impl Secrets {
    /// 从进程环境读取 OPENAI_API_KEY / SERPER_API_KEY
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 通过任意查找函数读取密钥；空白值视为缺失，缺失项全部收集后一并报告
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |secret: MissingSecret| {
            lookup(secret.env_var())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let llm_api_key = read(MissingSecret::LlmApiKey);
        let search_api_key = read(MissingSecret::SearchApiKey);

        match (llm_api_key, search_api_key) {
            (Some(llm_api_key), Some(search_api_key)) => Ok(Self {
                llm_api_key,
                search_api_key,
            }),
            (llm, search) => {
                let mut missing = Vec::new();
                if llm.is_none() {
                    missing.push(MissingSecret::LlmApiKey);
                }
                if search.is_none() {
                    missing.push(MissingSecret::SearchApiKey);
                }
                Err(ConfigError::MissingSecrets(missing))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_original_llm_settings() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.llm.model, "gpt-3.5-turbo");
        assert_eq!(cfg.llm.temperature, 0.0);
        assert_eq!(cfg.llm.max_tokens, 800);
        assert_eq!(cfg.task.output_file, "");
        assert_eq!(cfg.app.log_file, PathBuf::from("theology_output.log"));
        assert_eq!(cfg.tools.search.endpoint, "https://google.serper.dev/search");
        assert!(cfg.web.default_question.contains("justification by faith"));
    }

    #[test]
    fn test_load_config_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[llm]\nmodel = \"gpt-4o-mini\"\nmax_tokens = 1200\n\n[tools.search]\nnum_results = 3\n\n[task]\noutput_file = \"answer.md\""
        )
        .unwrap();

        let cfg = load_config(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(cfg.llm.model, "gpt-4o-mini");
        assert_eq!(cfg.llm.max_tokens, 1200);
        assert_eq!(cfg.llm.max_steps, 10);
        assert_eq!(cfg.tools.search.num_results, 3);
        assert_eq!(cfg.tools.search.timeout_secs, 15);
        assert_eq!(cfg.task.output_file, "answer.md");
    }

    #[test]
    fn test_secrets_present() {
        let secrets = Secrets::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("SERPER_API_KEY", "serper-test"),
        ]))
        .unwrap();
        assert_eq!(secrets.llm_api_key, "sk-test");
        assert_eq!(secrets.search_api_key, "serper-test");
    }

    #[test]
    fn test_secrets_missing_reports_all() {
        let err = Secrets::from_lookup(lookup_from(&[])).unwrap_err();
        match err {
            ConfigError::MissingSecrets(missing) => {
                assert_eq!(
                    missing,
                    vec![MissingSecret::LlmApiKey, MissingSecret::SearchApiKey]
                );
            }
            other => panic!("Expected MissingSecrets, got {other:?}"),
        }
    }

    #[test]
    fn test_secrets_blank_counts_as_missing() {
        let err = Secrets::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("SERPER_API_KEY", "   "),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingSecrets(ref m) if m == &vec![MissingSecret::SearchApiKey]
        ));
    }

    #[test]
    fn test_secrets_debug_is_redacted() {
        let secrets = Secrets {
            llm_api_key: "sk-secret".into(),
            search_api_key: "serper-secret".into(),
        };
        let dbg = format!("{secrets:?}");
        assert!(!dbg.contains("sk-secret"));
        assert!(!dbg.contains("serper-secret"));
    }
}
