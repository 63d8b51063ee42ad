//! 目标：记录类型、提取合并例程、prompt 摘要

pub mod merge;
pub mod record;
pub mod summary;

pub use merge::{append_goal, finalize_goal, MergeOutcome};
pub use record::{value_kind, GoalPolicy, GoalRecord, HandlerOutput};
pub use summary::{goals_summary, GoalSummary, SummaryText};
