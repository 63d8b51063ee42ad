//! 会话：键值状态、会话对象与存储后端

pub mod session;
pub mod state;
pub mod store;

pub use session::{Session, SessionId};
pub use state::{SessionState, NEW_GOAL_DETAILS_KEY, USER_GOALS_KEY};
pub use store::{create_session_service, FileSessionService, InMemorySessionService, SessionService};
