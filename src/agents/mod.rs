//! 对话 Agent：Handler 抽象、主 Agent 与两个专职子 Agent、注册表

pub mod goal_setting;
pub mod handler;
pub mod main_agent;
pub mod registry;
pub mod resume_feedback;

pub use goal_setting::{GoalSettingAgent, GOAL_SETTING_AGENT};
pub use handler::Handler;
pub use main_agent::{MainSupabossAgent, MAIN_AGENT, NO_GOALS_TEXT};
pub use registry::HandlerRegistry;
pub use resume_feedback::{ResumeFeedbackAgent, RESUME_FEEDBACK_AGENT};
