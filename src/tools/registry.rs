//! 工具注册表
//!
//! 所有工具实现 Tool trait（name / description / parameters_schema / execute），由 ToolRegistry 按名注册与查找。
//! 注册表启动时构建，之后只读，在并发请求间共享。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

/// 工具 trait：名称、描述（供 LLM 理解）、参数 schema、异步执行（args 为 JSON）
#[async_trait]
pub trait Tool: Send + Sync {
    /// 工具名称（用于 JSON 中的 "tool" 字段）
    fn name(&self) -> &str;

    /// 工具描述（供 LLM 理解功能）
    fn description(&self) -> &str;

    /// 参数 JSON Schema；默认返回空对象
    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(&self, args: Value) -> Result<String, String>;
}

/// 工具注册表：按名称存储 Arc<dyn Tool>
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: impl Tool + 'static) {
        let name = tool.name().to_string();
        self.tools.insert(name, Arc::new(tool));
    }

    pub async fn execute(&self, name: &str, args: Value) -> Result<String, String> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| format!("Unknown tool: {name}"))?;
        tool.execute(args).await
    }

    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// 生成 prompt 中 Available tools 段落：仅包含 names 中列出且已注册的工具
    pub fn describe(&self, names: &[String]) -> String {
        names
            .iter()
            .filter_map(|n| self.tools.get(n))
            .map(|tool| {
                format!(
                    "- {}: {}\n  args schema: {}",
                    tool.name(),
                    tool.description(),
                    tool.parameters_schema()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
