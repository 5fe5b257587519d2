//! Crew 执行结果

use serde::{Deserialize, Serialize};

use crate::llm::TokenUsage;
use crate::result::RawResult;

/// 单个任务的输出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutput {
    pub description: String,
    pub expected_output: String,
    /// 执行该任务的 Agent role
    pub agent: String,
    pub raw: String,
}

/// 本次执行消耗的 token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageMetrics {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl From<TokenUsage> for UsageMetrics {
    fn from(usage: TokenUsage) -> Self {
        Self {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total(),
        }
    }
}

/// Crew 聚合输出：最终文本、各任务输出、token 统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewOutput {
    pub raw: String,
    pub tasks_output: Vec<TaskOutput>,
    pub token_usage: UsageMetrics,
}

impl CrewOutput {
    /// 经由 JSON 适配为 RawResult（与外部来源的结果走同一条路径）
    pub fn into_raw_result(self) -> Option<RawResult> {
        serde_json::to_value(self)
            .ok()
            .and_then(RawResult::from_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{normalize, RawView, TaskList};

    #[test]
    fn test_into_raw_result_keeps_tasks_output() {
        let out = CrewOutput {
            raw: "final".into(),
            tasks_output: vec![TaskOutput {
                description: "d".into(),
                expected_output: "e".into(),
                agent: "Theologian".into(),
                raw: " task answer ".into(),
            }],
            token_usage: UsageMetrics {
                prompt_tokens: 3,
                completion_tokens: 2,
                total_tokens: 5,
            },
        };
        let raw = out.into_raw_result().unwrap();
        match raw.view() {
            RawView::Record(record) => {
                assert!(matches!(record.tasks_output, Some(TaskList::Items(ref items)) if items.len() == 1));
            }
            other => panic!("Expected Record, got {other:?}"),
        }
        assert_eq!(normalize(Some(&raw)), Some("task answer".to_string()));
        assert_eq!(raw.to_value()["token_usage"]["total_tokens"], 5);
    }
}
