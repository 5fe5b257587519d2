//! RawResult：编排调用返回的聚合结果
//!
//! 不同版本的编排层返回形状不一，这里用一个封闭的 sum type 表示已知形状，
//! 由 serde 适配层（[`RawResult::from_value`]）在边界处把 JSON 填充进来。
//! 原始 JSON 随视图一起保留，供调试面板原样展示。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 候选文本字段，按优先级排列
pub const TEXT_FIELDS: [&str; 4] = ["raw", "result", "output", "response"];

/// 携带候选文本字段的记录（单个任务输出，或结果本身）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    /// 其余字段，原样保留
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TextFields {
    /// 按 raw → result → output → response 顺序的候选值
    pub fn candidates(&self) -> [Option<&Value>; 4] {
        [
            self.raw.as_ref(),
            self.result.as_ref(),
            self.output.as_ref(),
            self.response.as_ref(),
        ]
    }
}

/// 任务集合中的一项：记录，或无法识别的值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskSlot {
    Output(TextFields),
    Other(Value),
}

/// 任务集合：列表，或形状不对的值（保留原样）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskList {
    Items(Vec<TaskSlot>),
    Malformed(Value),
}

impl TaskList {
    /// 非空列表的首项；空列表或形状不对时为 None
    pub fn first(&self) -> Option<&TaskSlot> {
        match self {
            TaskList::Items(items) => items.first(),
            TaskList::Malformed(_) => None,
        }
    }
}

/// 对象形状的结果：可能带 tasks_output / tasks 集合，也可能直接带文本字段
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks_output: Option<TaskList>,
    /// 旧版本的字段名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<TaskList>,
    #[serde(flatten)]
    pub fields: TextFields,
}

impl ResultRecord {
    /// 按优先级排列的任务集合（tasks_output 在前）
    pub fn task_lists(&self) -> impl Iterator<Item = &TaskList> {
        [self.tasks_output.as_ref(), self.tasks.as_ref()]
            .into_iter()
            .flatten()
    }
}

/// 结果的类型化视图：归一化按它匹配
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawView {
    /// 裸序列，首项即答案（旧版本兼容）
    Sequence(Vec<Value>),
    Record(ResultRecord),
    /// 其他任何形状
    Opaque(Value),
}

/// 编排调用返回的聚合结果
///
/// 类型化视图只用于提取；原始 JSON 一并保留，序列化时原样输出（显式 null 字段也不丢）。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RawResult {
    original: Value,
    #[serde(skip)]
    view: RawView,
}

impl RawResult {
    /// 边界适配：JSON null 视为缺失，其余任何值都能落入某个视图
    pub fn from_value(value: Value) -> Option<RawResult> {
        if value.is_null() {
            return None;
        }
        let view = serde_json::from_value(value.clone())
            .unwrap_or_else(|_| RawView::Opaque(value.clone()));
        Some(RawResult {
            original: value,
            view,
        })
    }

    /// 从保存的 JSON 文本解析；文本为 null 时为 Ok(None)
    pub fn from_json_str(text: &str) -> serde_json::Result<Option<RawResult>> {
        serde_json::from_str(text).map(RawResult::from_value)
    }

    pub fn view(&self) -> &RawView {
        &self.view
    }

    /// 形状摘要（用于日志，不含内容）
    pub fn shape(&self) -> String {
        match &self.view {
            RawView::Sequence(items) => format!("sequence(len={})", items.len()),
            RawView::Record(record) => {
                let mut parts = Vec::new();
                if let Some(list) = &record.tasks_output {
                    parts.push(format!("tasks_output{}", list_shape(list)));
                }
                if let Some(list) = &record.tasks {
                    parts.push(format!("tasks{}", list_shape(list)));
                }
                for (name, value) in TEXT_FIELDS.iter().zip(record.fields.candidates()) {
                    if value.is_some() {
                        parts.push((*name).to_string());
                    }
                }
                format!("record{{{}}}", parts.join(","))
            }
            RawView::Opaque(value) => format!("opaque({})", value_kind(value)),
        }
    }

    /// 原始 JSON，供调试面板展示
    pub fn to_value(&self) -> Value {
        self.original.clone()
    }
}

fn list_shape(list: &TaskList) -> String {
    match list {
        TaskList::Items(items) => format!("[{}]", items.len()),
        TaskList::Malformed(v) => format!("<{}>", value_kind(v)),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
