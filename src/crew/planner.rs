//! Planner：调用 LLM 与解析输出
//!
//! LLM 每轮要么输出 JSON Tool Call，要么输出最终回答；parse_llm_output 区分二者。

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::AgentError;
use crate::llm::{Completion, LlmClient, Message};

/// LLM 返回的 Tool Call（{"tool": "search", "args": {"query": "..."}}）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

/// Planner 输出
#[derive(Debug, Clone)]
pub enum PlannerOutput {
    /// 最终回答
    Response(String),
    ToolCall(ToolCall),
}

const FINAL_ANSWER_PREFIX: &str = "Final Answer:";

/// 解析 LLM 输出
///
/// 含 "Final Answer:" 的输出一律视为最终回答（即使回答里带 ```json 代码块）；
/// 否则以 `{` 开头或含 ```json 代码块的输出必须是工具名非空的合法 Tool Call，不然为 JsonParseError；
/// 其余文本视为最终回答。
pub fn parse_llm_output(output: &str) -> Result<PlannerOutput, AgentError> {
    let trimmed = output.trim();

    if let Some(answer) = after_final_answer(trimmed) {
        return Ok(PlannerOutput::Response(answer.to_string()));
    }

    let json_str = if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + 7..];
        rest.find("```")
            .map(|end| rest[..end].trim())
            .unwrap_or(rest.trim())
    } else if trimmed.starts_with('{') {
        trimmed
    } else {
        return Ok(PlannerOutput::Response(trimmed.to_string()));
    };

    let parsed: ToolCall = serde_json::from_str(json_str)
        .map_err(|e| AgentError::JsonParseError(format!("{}: {}", e, json_str)))?;

    if parsed.tool.trim().is_empty() {
        return Err(AgentError::JsonParseError(format!(
            "tool name is empty: {}",
            json_str
        )));
    }
    Ok(PlannerOutput::ToolCall(parsed))
}

fn after_final_answer(text: &str) -> Option<&str> {
    text.find(FINAL_ANSWER_PREFIX)
        .map(|idx| text[idx + FINAL_ANSWER_PREFIX.len()..].trim())
}

/// Planner：持有 LLM 与 system prompt，plan 时拼 system + messages 后调用 LLM
pub struct Planner {
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
}

impl Planner {
    pub fn new(llm: Arc<dyn LlmClient>, system_prompt: impl Into<String>) -> Self {
        Self {
            llm,
            system_prompt: system_prompt.into(),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// 调用一次 LLM；返回的用量只属于这一次调用
    pub async fn plan(&self, messages: &[Message]) -> Result<Completion, AgentError> {
        let mut full_messages = vec![Message::system(self.system_prompt.clone())];
        full_messages.extend(messages.iter().cloned());
        self.llm
            .complete(&full_messages)
            .await
            .map_err(AgentError::LlmError)
    }
}
