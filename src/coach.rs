//! 组装：由配置构建 Router 与会话
//!
//! create_router 注册两个子 Agent、用主 Agent 作根、LLM 作委派决策；
//! open_session 按固定 ID 续用已有会话，不存在时新建。

use std::sync::Arc;

use crate::agents::{GoalSettingAgent, HandlerRegistry, MainSupabossAgent, ResumeFeedbackAgent};
use crate::config::AppConfig;
use crate::core::CoachError;
use crate::llm::LlmClient;
use crate::router::{LlmDecider, Router};
use crate::session::{Session, SessionService};

pub fn create_router(cfg: &AppConfig, llm: Arc<dyn LlmClient>) -> Router {
    let mut registry = HandlerRegistry::new();
    registry.register(GoalSettingAgent::new(cfg.goals.validation));
    registry.register(ResumeFeedbackAgent);

    let decider = Arc::new(LlmDecider::new(llm.clone()));
    Router::new(Arc::new(MainSupabossAgent), registry, decider, llm)
}

/// 读取 (app, user, session_id) 对应的会话，没有则创建
pub async fn open_session(
    sessions: &dyn SessionService,
    app_name: &str,
    user_id: &str,
    session_id: &str,
) -> Result<Session, CoachError> {
    match sessions.get_session(app_name, user_id, session_id).await? {
        Some(session) => {
            tracing::info!("Resumed session: {}", session_id);
            Ok(session)
        }
        None => {
            tracing::info!("Creating new session: {}", session_id);
            sessions
                .create_session(app_name, user_id, Some(session_id))
                .await
        }
    }
}
