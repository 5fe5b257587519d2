//! 结果层：聚合结果的类型化表示与归一化

pub mod normalize;
pub mod raw;

pub use normalize::normalize;
pub use raw::{RawResult, RawView, ResultRecord, TaskList, TaskSlot, TextFields, TEXT_FIELDS};
