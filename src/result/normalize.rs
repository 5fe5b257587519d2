//! 结果归一化：从 RawResult 中提取可展示的答案文本
//!
//! 按顺序尝试，先命中者胜：
//! 1. 结果缺失 → None
//! 2. tasks_output / tasks 集合（非空）首项的 raw → result → output → response
//! 3. 结果自身的 raw → result → output → response
//! 4. 裸序列的首项（转为字符串；优先级最低）
//! 5. 否则 None
//!
//! 只接受去除首尾空白后非空的字符串；空串、纯空白、非字符串候选一律跳过，不做隐式转换。
//! 纯函数，从不失败。

use serde_json::Value;

use crate::result::raw::{RawResult, RawView, ResultRecord, TaskSlot, TextFields};

/// 提取展示用答案；None 表示没有可识别的文本（不是错误）
pub fn normalize(raw: Option<&RawResult>) -> Option<String> {
    let raw = raw?;
    tracing::debug!(shape = %raw.shape(), "normalizing crew result");

    match raw.view() {
        RawView::Record(record) => from_task_lists(record).or_else(|| first_text(&record.fields)),
        RawView::Sequence(items) => items.first().and_then(coerce_to_text),
        RawView::Opaque(_) => None,
    }
}

fn from_task_lists(record: &ResultRecord) -> Option<String> {
    record.task_lists().find_map(|list| match list.first()? {
        TaskSlot::Output(fields) => first_text(fields),
        TaskSlot::Other(_) => None,
    })
}

/// 按优先级返回第一个非空白字符串候选（已 trim）
fn first_text(fields: &TextFields) -> Option<String> {
    fields.candidates().into_iter().flatten().find_map(non_blank)
}

fn non_blank(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// 裸序列首项：字符串直接取用，其余 JSON 值转为紧凑 JSON 文本
fn coerce_to_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn norm(value: Value) -> Option<String> {
        let raw = RawResult::from_value(value);
        normalize(raw.as_ref())
    }

    #[test]
    fn test_absent_is_absent() {
        assert_eq!(normalize(None), None);
        assert_eq!(norm(Value::Null), None);
    }

    #[test]
    fn test_tasks_output_with_raw() {
        assert_eq!(
            norm(json!({ "tasks_output": [{ "raw": "  Justification is by faith alone. " }] })),
            Some("Justification is by faith alone.".to_string())
        );
    }

    #[test]
    fn test_tasks_output_with_result() {
        assert_eq!(
            norm(json!({ "tasks_output": [{ "result": "Sola gratia" }] })),
            Some("Sola gratia".to_string())
        );
    }

    #[test]
    fn test_legacy_tasks_collection() {
        assert_eq!(
            norm(json!({ "tasks": [{ "result": "On supralapsarianism..." }] })),
            Some("On supralapsarianism...".to_string())
        );
    }

    #[test]
    fn test_direct_attribute() {
        assert_eq!(norm(json!({ "raw": "Direct answer" })), Some("Direct answer".to_string()));
        assert_eq!(norm(json!({ "response": "Via response" })), Some("Via response".to_string()));
    }

    #[test]
    fn test_first_element_sequence() {
        assert_eq!(norm(json!(["Sequence answer"])), Some("Sequence answer".to_string()));
    }

    #[test]
    fn test_candidate_priority_order() {
        let value = json!({
            "tasks_output": [{
                "response": "fourth",
                "output": "third",
                "result": "second",
                "raw": "first"
            }]
        });
        assert_eq!(norm(value), Some("first".to_string()));

        let value = json!({ "tasks_output": [{ "raw": "   ", "output": "third", "response": "fourth" }] });
        assert_eq!(norm(value), Some("third".to_string()));
    }

    #[test]
    fn test_tasks_output_preferred_over_tasks_and_direct() {
        let value = json!({
            "tasks_output": [{ "raw": "from tasks_output" }],
            "tasks": [{ "raw": "from tasks" }],
            "raw": "direct"
        });
        assert_eq!(norm(value), Some("from tasks_output".to_string()));
    }

    #[test]
    fn test_blank_task_output_falls_through_to_direct() {
        let value = json!({ "tasks_output": [{ "raw": "" }], "raw": "Crew-level answer" });
        assert_eq!(norm(value), Some("Crew-level answer".to_string()));
    }

    #[test]
    fn test_textless_tasks_output_tries_tasks_before_direct() {
        let value = json!({
            "tasks_output": [{ "raw": "  " }],
            "tasks": [{ "result": "legacy answer" }],
            "raw": "direct"
        });
        assert_eq!(norm(value), Some("legacy answer".to_string()));
    }

    #[test]
    fn test_empty_tasks_output_falls_through_to_tasks() {
        let value = json!({ "tasks_output": [], "tasks": [{ "output": "legacy" }] });
        assert_eq!(norm(value), Some("legacy".to_string()));
    }

    #[test]
    fn test_empty_collection_without_direct_attributes_is_absent() {
        assert_eq!(norm(json!({ "tasks_output": [] })), None);
        assert_eq!(norm(json!({ "tasks_output": [], "token_usage": {} })), None);
    }

    #[test]
    fn test_blank_only_candidate_is_absent() {
        assert_eq!(norm(json!({ "raw": "" })), None);
        assert_eq!(norm(json!({ "raw": " \n\t " })), None);
        assert_eq!(norm(json!({ "tasks_output": [{ "result": "   " }] })), None);
        assert_eq!(norm(json!(["   "])), None);
    }

    #[test]
    fn test_non_string_candidates_are_skipped() {
        assert_eq!(norm(json!({ "raw": 42, "result": { "nested": "x" } })), None);
        assert_eq!(
            norm(json!({ "tasks_output": [{ "raw": ["list"], "output": "text" }] })),
            Some("text".to_string())
        );
    }

    #[test]
    fn test_only_first_task_is_checked() {
        let value = json!({ "tasks_output": [{ "raw": "" }, { "raw": "second task" }] });
        assert_eq!(norm(value), None);
    }

    #[test]
    fn test_non_record_first_task_falls_through() {
        let value = json!({ "tasks_output": ["bare string"], "result": "direct" });
        assert_eq!(norm(value), Some("direct".to_string()));
    }

    #[test]
    fn test_malformed_collection_falls_through() {
        let value = json!({ "tasks_output": { "raw": "not a list" }, "output": "direct" });
        assert_eq!(norm(value), Some("direct".to_string()));
    }

    #[test]
    fn test_sequence_coercion() {
        assert_eq!(norm(json!([42, "ignored"])), Some("42".to_string()));
        assert_eq!(norm(json!([null])), None);
        assert_eq!(norm(json!([])), None);
    }

    #[test]
    fn test_opaque_is_absent() {
        assert_eq!(norm(json!("a bare string")), None);
        assert_eq!(norm(json!(true)), None);
    }

    #[test]
    fn test_idempotent() {
        let raw = RawResult::from_value(json!({ "tasks": [{ "output": " Vos " }] })).unwrap();
        let before = raw.clone();
        let first = normalize(Some(&raw));
        let second = normalize(Some(&raw));
        assert_eq!(first, second);
        assert_eq!(first, Some("Vos".to_string()));
        assert_eq!(raw, before);
    }
}
