//! Scholastic - Reformed Scholastic Theology Q&A
//!
//! 模块划分：
//! - **agent**: 无头问答运行时（编排边界 + 展示结果，供 CLI / Web 调用）
//! - **config**: 应用配置加载（TOML + 环境变量）与启动密钥
//! - **core**: 错误类型
//! - **crew**: Agent / Task 描述、Planner、单 Agent 单 Task 执行
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / Mock）
//! - **observability**: 日志初始化
//! - **result**: 聚合结果的类型化表示与归一化
//! - **theology**: 固定人设与任务模板
//! - **tools**: 工具注册表、执行器、Serper 搜索
//! - **web**: Axum 单页 UI 与 JSON API（feature = "web"）

pub mod agent;
pub mod config;
pub mod core;
pub mod crew;
pub mod llm;
pub mod observability;
pub mod result;
pub mod theology;
pub mod tools;
#[cfg(feature = "web")]
pub mod web;

pub use agent::{
    ask, create_agent_components, outcome_from_file, run_theology_search, AgentComponents, AskOutcome,
};
pub use result::{normalize, RawResult};
