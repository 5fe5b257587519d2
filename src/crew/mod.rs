//! Crew 层：Agent / Task 描述、Planner、单 Agent 单 Task 执行与聚合输出

pub mod output;
pub mod planner;
pub mod runner;
pub mod spec;

pub use output::{CrewOutput, TaskOutput, UsageMetrics};
pub use planner::{parse_llm_output, Planner, PlannerOutput, ToolCall};
pub use runner::{Crew, CrewLimits};
pub use spec::{AgentSpec, TaskSpec};
