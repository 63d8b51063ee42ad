//! 单个会话：身份、状态与对话历史

use serde::{Deserialize, Serialize};

use super::state::SessionState;
use crate::memory::ConversationMemory;

/// 会话 ID
pub type SessionId = String;

/// 一次持续的用户对话
///
/// 同一会话同一时刻只允许一个进行中的回合：持有者以 `&mut Session` 驱动 Router，
/// 回合完整结束后才提交状态。
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub app_name: String,
    pub user_id: String,
    pub state: SessionState,
    pub history: ConversationMemory,
    /// 最后更新时间（Unix 毫秒）
    pub last_update_time: i64,
}

impl Session {
    pub fn new(
        app_name: impl Into<String>,
        user_id: impl Into<String>,
        id: Option<SessionId>,
        max_context_turns: usize,
    ) -> Self {
        Self {
            id: id.unwrap_or_else(|| format!("session_{}", uuid::Uuid::new_v4())),
            app_name: app_name.into(),
            user_id: user_id.into(),
            state: SessionState::new(),
            history: ConversationMemory::new(max_context_turns),
            last_update_time: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn touch(&mut self) {
        self.last_update_time = chrono::Utc::now().timestamp_millis();
    }
}
