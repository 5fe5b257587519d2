//! 工具箱：Tool trait、注册表、Serper 搜索（超时与审计在 Crew 调用处施加）

pub mod registry;
pub mod search;

pub use registry::{Tool, ToolRegistry};
pub use search::SearchTool;
