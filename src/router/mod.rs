//! 路由层：委派决策、回合调度与事件

pub mod decision;
pub mod dispatcher;
pub mod events;

pub use decision::{parse_decision, Decision, DelegationDecider, LlmDecider};
pub use dispatcher::{Router, TurnReply};
pub use events::TurnEvent;
