//! Headless 问答运行时
//!
//! 供 CLI 与 Web 前端调用：
//! create_agent_components 用配置与密钥构建 LLM 客户端和工具注册表（启动时一次）；
//! run_theology_search 是编排边界：每次提问新建 AgentSpec / TaskSpec / Crew，只执行一次，
//! 任何失败都在此记录日志并返回 None，绝不向上抛出；
//! ask 再经 normalize 得到展示用的 AskOutcome。

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;

use crate::config::{AppConfig, Secrets};
use crate::crew::{Crew, CrewLimits};
use crate::llm::{LlmClient, OpenAiClient};
use crate::result::{normalize, RawResult};
use crate::theology::{theology_agent, theology_task};
use crate::tools::{SearchTool, ToolRegistry};

/// 启动时构建、请求间只读共享的组件
pub struct AgentComponents {
    pub config: AppConfig,
    pub llm: Arc<dyn LlmClient>,
    pub tools: ToolRegistry,
}

impl AgentComponents {
    pub fn new(config: AppConfig, llm: Arc<dyn LlmClient>, tools: ToolRegistry) -> Self {
        Self { config, llm, tools }
    }
}

/// 用配置与密钥创建组件：OpenAI 兼容客户端 + Serper 搜索工具
pub fn create_agent_components(cfg: &AppConfig, secrets: &Secrets) -> AgentComponents {
    let llm: Arc<dyn LlmClient> = Arc::new(OpenAiClient::new(&cfg.llm, &secrets.llm_api_key));

    let mut tools = ToolRegistry::new();
    tools.register(SearchTool::new(&cfg.tools.search, secrets.search_api_key.clone()));

    AgentComponents::new(cfg.clone(), llm, tools)
}

/// 编排边界：执行一次神学查询；失败时记录并返回 None
pub async fn run_theology_search(components: &AgentComponents, question: &str) -> Option<RawResult> {
    let query_id = uuid::Uuid::new_v4();
    tracing::info!(%query_id, "Initiating theological query");

    let crew = Crew::new(
        theology_agent(),
        theology_task(question, &components.config.task.output_file),
        Arc::clone(&components.llm),
        &components.tools,
        CrewLimits::from_config(&components.config),
    )
    .with_query_id(query_id);

    match crew.kickoff().await {
        Ok(output) => {
            tracing::info!(
                %query_id,
                total_tokens = output.token_usage.total_tokens,
                "Theological query completed"
            );
            output.into_raw_result()
        }
        Err(e) => {
            tracing::error!(%query_id, error = ?e, "Error during theological search: {}", e);
            None
        }
    }
}

/// 状态行级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    Warning,
    Error,
}

pub const MSG_SUCCESS: &str = "✅ Response generated!";
pub const MSG_UNRECOGNIZED: &str =
    "⚠️ No recognizable textual output found in the task. Check the raw output above.";
pub const MSG_NO_RESPONSE: &str =
    "⚠️ No response generated. Please try again or refine your question.";

/// 一次提问的展示结果
#[derive(Debug, Clone, PartialEq)]
pub enum AskOutcome {
    /// 得到答案
    Answered { answer: String, raw: RawResult },
    /// 有结果但无可识别文本（不是错误）
    Unrecognized { raw: RawResult },
    /// 编排调用失败
    NoResponse,
}

impl AskOutcome {
    pub fn from_raw(raw: Option<RawResult>) -> Self {
        let Some(raw) = raw else {
            return AskOutcome::NoResponse;
        };
        match normalize(Some(&raw)) {
            Some(answer) => AskOutcome::Answered { answer, raw },
            None => AskOutcome::Unrecognized { raw },
        }
    }

    pub fn status(&self) -> Status {
        match self {
            AskOutcome::Answered { .. } => Status::Success,
            AskOutcome::Unrecognized { .. } => Status::Warning,
            AskOutcome::NoResponse => Status::Error,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AskOutcome::Answered { .. } => MSG_SUCCESS,
            AskOutcome::Unrecognized { .. } => MSG_UNRECOGNIZED,
            AskOutcome::NoResponse => MSG_NO_RESPONSE,
        }
    }

    pub fn answer(&self) -> Option<&str> {
        match self {
            AskOutcome::Answered { answer, .. } => Some(answer),
            _ => None,
        }
    }

    /// 原始结果（调试面板原样展示）
    pub fn raw(&self) -> Option<&RawResult> {
        match self {
            AskOutcome::Answered { raw, .. } | AskOutcome::Unrecognized { raw } => Some(raw),
            AskOutcome::NoResponse => None,
        }
    }

    /// 终端输出：可选的原始结果面板，状态行，答案
    pub fn render_text(&self, show_raw: bool) -> String {
        let mut out = String::new();
        if show_raw {
            out.push_str("📄 Raw CrewOutput\n");
            match self.raw() {
                Some(raw) => {
                    out.push_str(&serde_json::to_string_pretty(&raw.to_value()).unwrap_or_default());
                    out.push('\n');
                }
                None => out.push_str("None\n"),
            }
            out.push('\n');
        }
        out.push_str(self.message());
        out.push('\n');
        if let Some(answer) = self.answer() {
            out.push('\n');
            out.push_str(answer);
            out.push('\n');
        }
        out
    }
}

/// 读取保存的结果 JSON 文件并归一化
pub fn outcome_from_file(path: &Path) -> anyhow::Result<AskOutcome> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let raw = RawResult::from_json_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    tracing::info!(
        shape = %raw.as_ref().map(|r| r.shape()).unwrap_or_else(|| "absent".to_string()),
        "normalizing saved result"
    );
    Ok(AskOutcome::from_raw(raw))
}

/// 提问：编排调用 + 归一化
pub async fn ask(components: &AgentComponents, question: &str) -> AskOutcome {
    AskOutcome::from_raw(run_theology_search(components, question).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;
    use serde_json::json;

    fn components(llm: MockLlmClient) -> AgentComponents {
        AgentComponents::new(
            AppConfig::default(),
            Arc::new(llm),
            ToolRegistry::new(),
        )
    }

    #[tokio::test]
    async fn test_ask_answered() {
        let c = components(MockLlmClient::with_replies([
            "Final Answer:   Justification is by faith alone.  ",
        ]));
        let outcome = ask(&c, "What is justification?").await;
        assert_eq!(outcome.status(), Status::Success);
        assert_eq!(outcome.answer(), Some("Justification is by faith alone."));
        assert_eq!(outcome.message(), MSG_SUCCESS);
        let raw = outcome.raw().unwrap().to_value();
        assert_eq!(raw["tasks_output"][0]["agent"], json!(crate::theology::ROLE));
    }

    #[tokio::test]
    async fn test_orchestration_failure_yields_no_response() {
        let llm = MockLlmClient::new();
        llm.push_error("provider unavailable");
        let c = components(llm);
        assert_eq!(run_theology_search(&c, "q").await, None);

        let llm = MockLlmClient::new();
        llm.push_error("provider unavailable");
        let outcome = ask(&components(llm), "q").await;
        assert_eq!(outcome, AskOutcome::NoResponse);
        assert_eq!(outcome.status(), Status::Error);
        assert_eq!(outcome.message(), MSG_NO_RESPONSE);
        assert!(outcome.raw().is_none());
    }

    #[tokio::test]
    async fn test_blank_answer_is_unrecognized_with_raw_kept() {
        let c = components(MockLlmClient::with_replies(["Final Answer:   "]));
        let outcome = ask(&c, "q").await;
        assert_eq!(outcome.status(), Status::Warning);
        assert_eq!(outcome.message(), MSG_UNRECOGNIZED);
        assert!(outcome.answer().is_none());
        assert!(outcome.raw().is_some());
    }

    #[tokio::test]
    async fn test_question_reaches_llm_in_task_prompt() {
        let llm = Arc::new(MockLlmClient::with_replies(["Final Answer: ok"]));
        let c = AgentComponents::new(
            AppConfig::default(),
            llm.clone(),
            ToolRegistry::new(),
        );
        ask(&c, "Who wrote the Institutes?").await;
        let calls = llm.calls();
        assert!(calls[0][0].content.contains(crate::theology::ROLE));
        assert!(calls[0][1].content.contains("'Who wrote the Institutes?'"));
    }

    #[test]
    fn test_from_raw_scenario_empty_tasks_output() {
        let raw = RawResult::from_value(json!({ "tasks_output": [] }));
        let outcome = AskOutcome::from_raw(raw);
        assert_eq!(outcome.status(), Status::Warning);
        assert_eq!(outcome.raw().unwrap().to_value(), json!({ "tasks_output": [] }));
    }

    #[test]
    fn test_render_text() {
        let outcome = AskOutcome::from_raw(RawResult::from_value(json!({ "raw": "Sola Scriptura" })));
        assert_eq!(outcome.render_text(false), format!("{MSG_SUCCESS}\n\nSola Scriptura\n"));

        let with_raw = outcome.render_text(true);
        assert!(with_raw.starts_with("📄 Raw CrewOutput\n{"));
        assert!(with_raw.contains("\"raw\": \"Sola Scriptura\""));

        assert_eq!(
            AskOutcome::NoResponse.render_text(true),
            format!("📄 Raw CrewOutput\nNone\n\n{MSG_NO_RESPONSE}\n")
        );
    }

    #[test]
    fn test_create_components_registers_search() {
        let secrets = Secrets {
            llm_api_key: "sk-test".into(),
            search_api_key: "serper-test".into(),
        };
        let c = create_agent_components(&AppConfig::default(), &secrets);
        assert_eq!(c.tools.tool_names(), vec!["search".to_string()]);
    }
}
