//! Router：根 Agent 的回合调度
//!
//! 每轮：主 Agent 按会话状态拼 instruction → DelegationDecider 决定直接回复还是委派 →
//! 委派时子 Agent 重新读取会话状态生成回复 → 写入 output_key 并执行回合结束回调 → 提交。
//!
//! 整轮在会话状态与历史的副本上进行，只有全部成功才写回 Session；
//! LLM 失败、未知子 Agent、中途取消都不会留下部分修改。Router 自身不记忆上一轮委派给了谁。

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::decision::{Decision, DelegationDecider};
use super::events::TurnEvent;
use crate::agents::{Handler, HandlerRegistry};
use crate::core::CoachError;
use crate::llm::LlmClient;
use crate::memory::Message;
use crate::session::{Session, SessionState};

/// 一轮的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReply {
    /// 实际作答的 Agent 名
    pub responder: String,
    /// 委派时主 Agent 的交接语
    pub preface: Option<String>,
    pub text: String,
}

/// 待提交的一轮：新状态 + 回复
struct StagedTurn {
    state: SessionState,
    reply: TurnReply,
}

pub struct Router {
    root: Arc<dyn Handler>,
    registry: HandlerRegistry,
    decider: Arc<dyn DelegationDecider>,
    llm: Arc<dyn LlmClient>,
}

impl Router {
    pub fn new(
        root: Arc<dyn Handler>,
        registry: HandlerRegistry,
        decider: Arc<dyn DelegationDecider>,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            root,
            registry,
            decider,
            llm,
        }
    }

    pub fn root_name(&self) -> &str {
        self.root.name()
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// 执行一轮对话。成功时提交状态与历史并返回回复；失败或取消时 Session 保持原样。
    pub async fn run_turn(
        &self,
        session: &mut Session,
        input: &str,
        events: Option<&mpsc::UnboundedSender<TurnEvent>>,
        cancel: &CancellationToken,
    ) -> Result<TurnReply, CoachError> {
        let mut history = session.history.clone();
        history.push(Message::user(input));

        let staged = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Turn cancelled, session {} left unchanged", session.id);
                return Err(CoachError::Cancelled);
            }
            result = self.execute(&session.state, history.messages(), events) => result?,
        };

        if let Some(preface) = &staged.reply.preface {
            history.push(Message::assistant(preface.clone()));
        }
        history.push(Message::assistant(staged.reply.text.clone()));

        session.state = staged.state;
        session.history = history;
        session.touch();

        if let Some(tx) = events {
            let _ = tx.send(TurnEvent::Done {
                responder: staged.reply.responder.clone(),
            });
        }
        Ok(staged.reply)
    }

    async fn execute(
        &self,
        state: &SessionState,
        history: &[Message],
        events: Option<&mpsc::UnboundedSender<TurnEvent>>,
    ) -> Result<StagedTurn, CoachError> {
        let instruction = self.root.instruction(state);
        let decision = self
            .decider
            .decide(&instruction, history, &self.registry)
            .await?;
        debug!("{} decided: {:?}", self.root.name(), decision);

        match decision {
            Decision::Reply(text) => {
                if let Some(tx) = events {
                    let _ = tx.send(TurnEvent::Chunk { text: text.clone() });
                }
                Ok(StagedTurn {
                    state: state.clone(),
                    reply: TurnReply {
                        responder: self.root.name().to_string(),
                        preface: None,
                        text,
                    },
                })
            }
            Decision::Delegate { handler, preface } => {
                let Some(target) = self.registry.get(&handler) else {
                    warn!("Delegation to unregistered handler '{}'", handler);
                    return Err(CoachError::UnknownHandler(handler));
                };
                info!("{} delegating turn to {}", self.root.name(), target.name());
                if let Some(tx) = events {
                    let _ = tx.send(TurnEvent::Delegated {
                        from: self.root.name().to_string(),
                        to: target.name().to_string(),
                        preface: preface.clone(),
                    });
                }

                let text = target
                    .respond(self.llm.as_ref(), state, history, events)
                    .await?;

                let mut staged = state.clone();
                if let Some(key) = target.output_key() {
                    staged.set(key, text.clone());
                }
                target.after_turn(&mut staged);

                Ok(StagedTurn {
                    state: staged,
                    reply: TurnReply {
                        responder: target.name().to_string(),
                        preface,
                        text,
                    },
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{
        GoalSettingAgent, MainSupabossAgent, ResumeFeedbackAgent, GOAL_SETTING_AGENT, MAIN_AGENT,
        RESUME_FEEDBACK_AGENT,
    };
    use crate::goals::GoalPolicy;
    use crate::llm::ScriptedLlmClient;
    use crate::router::LlmDecider;
    use crate::session::{NEW_GOAL_DETAILS_KEY, USER_GOALS_KEY};
    use serde_json::Value;

    const TRANSFER_TO_GOALS: &str =
        "Okay, I'll have our Goal Setting Coach help you with that.\n{\"transfer_to_agent\": \"GoalSettingAgent\"}";
    const FINAL_GOAL: &str = r#"{"name":"Learn X","specific":"s","measurable":"m","achievable":"a","relevant":"r","time_bound":"t"}"#;

    fn router(llm: Arc<ScriptedLlmClient>) -> Router {
        let mut registry = HandlerRegistry::new();
        registry.register(GoalSettingAgent::new(GoalPolicy::Lenient));
        registry.register(ResumeFeedbackAgent);
        Router::new(
            Arc::new(MainSupabossAgent),
            registry,
            Arc::new(LlmDecider::new(llm.clone())),
            llm,
        )
    }

    fn session() -> Session {
        Session::new("test_app", "user", Some("s1".to_string()), 20)
    }

    fn goal_count(session: &Session) -> usize {
        session
            .state
            .get(USER_GOALS_KEY)
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }

    #[tokio::test]
    async fn test_direct_reply_commits_history_only() {
        let llm = Arc::new(ScriptedLlmClient::new(["You've got this!"]));
        let router = router(llm);
        let mut session = session();

        let reply = router
            .run_turn(&mut session, "I feel stuck", None, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(reply.responder, MAIN_AGENT);
        assert_eq!(reply.text, "You've got this!");
        assert!(session.state.is_empty());
        assert_eq!(session.history.len(), 2);
        assert_eq!(session.history.messages()[0], Message::user("I feel stuck"));
    }

    #[tokio::test]
    async fn test_delegated_question_turn_leaves_goals_untouched() {
        let llm = Arc::new(ScriptedLlmClient::new([
            TRANSFER_TO_GOALS,
            "Great! Let's define a S.M.A.R.T. goal. First, what would you like to name this goal?",
        ]));
        let router = router(llm);
        let mut session = session();

        let reply = router
            .run_turn(&mut session, "I'd like some structure", None, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(reply.responder, GOAL_SETTING_AGENT);
        assert!(reply.preface.as_deref().unwrap().contains("Goal Setting Coach"));
        // 提问文本解析失败被吸收，临时键也已清理
        assert!(!session.state.contains(NEW_GOAL_DETAILS_KEY));
        assert_eq!(goal_count(&session), 0);
        // user + preface + reply
        assert_eq!(session.history.len(), 3);
    }

    #[tokio::test]
    async fn test_final_goal_json_is_merged() {
        let llm = Arc::new(ScriptedLlmClient::new([TRANSFER_TO_GOALS, FINAL_GOAL]));
        let router = router(llm);
        let mut session = session();

        router
            .run_turn(&mut session, "Within 2 months.", None, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(goal_count(&session), 1);
        assert_eq!(session.state.get(USER_GOALS_KEY).unwrap()[0]["name"], "Learn X");
    }

    #[tokio::test]
    async fn test_sub_agent_sees_current_goals() {
        let llm = Arc::new(ScriptedLlmClient::new([
            "{\"transfer_to_agent\": \"ResumeFeedbackAgent\"}",
            "Thanks for sharing your resume!",
        ]));
        let router = router(llm.clone());
        let mut session = session();
        session
            .state
            .set(USER_GOALS_KEY, serde_json::json!([{"name": "Become a PM"}]));

        let reply = router
            .run_turn(&mut session, "Here is my work history...", None, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(reply.responder, RESUME_FEEDBACK_AGENT);

        let prompts = llm.prompts();
        assert!(prompts[0][0].content.contains("  - Goal 1: Become a PM"));
        assert!(prompts[1][0].content.starts_with("You are the Resume Feedback Coach."));
        assert!(prompts[1][0].content.contains("  - Goal 1: Become a PM"));
        // 子 Agent 看到本轮用户输入
        assert_eq!(prompts[1].last().unwrap().content, "Here is my work history...");
    }

    #[tokio::test]
    async fn test_llm_failure_leaves_session_unchanged() {
        let llm = Arc::new(ScriptedLlmClient::default());
        llm.push_failure("connection refused");
        let router = router(llm);
        let mut session = session();
        session.state.set(USER_GOALS_KEY, serde_json::json!([{"name": "Keep"}]));
        let before_state = session.state.clone();

        let err = router
            .run_turn(&mut session, "hello", None, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, CoachError::Llm(_)));
        assert_eq!(session.state, before_state);
        assert!(session.history.is_empty());
    }

    #[tokio::test]
    async fn test_sub_agent_failure_leaves_session_unchanged() {
        let llm = Arc::new(ScriptedLlmClient::new([TRANSFER_TO_GOALS]));
        llm.push_failure("timeout");
        let router = router(llm);
        let mut session = session();

        let result = router
            .run_turn(&mut session, "set something up", None, &CancellationToken::new())
            .await;

        assert!(result.is_err());
        assert!(session.state.is_empty());
        assert!(session.history.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_handler_is_error() {
        let llm = Arc::new(ScriptedLlmClient::new([
            "{\"transfer_to_agent\": \"CareerAgent\"}",
        ]));
        let router = router(llm);
        let mut session = session();

        let err = router
            .run_turn(&mut session, "career advice", None, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CoachError::UnknownHandler(ref name) if name == "CareerAgent"));
        assert!(session.history.is_empty());
    }

    #[tokio::test]
    async fn test_every_turn_is_decided_by_the_model() {
        // 目标对话中提到 resume 也不能绕过决策直接转给简历 Agent
        let llm = Arc::new(ScriptedLlmClient::new([
            TRANSFER_TO_GOALS,
            "Great! First, what would you like to name this goal?",
            "{\"transfer_to_agent\": \"GoalSettingAgent\"}",
            "Good reason. Finally, when do you want to achieve it?",
        ]));
        let router = router(llm.clone());
        let mut session = session();
        let cancel = CancellationToken::new();

        let first = router
            .run_turn(&mut session, "I want to set a goal", None, &cancel)
            .await
            .unwrap();
        let second = router
            .run_turn(
                &mut session,
                "It matters because it will strengthen my resume",
                None,
                &cancel,
            )
            .await
            .unwrap();

        assert_eq!(first.responder, GOAL_SETTING_AGENT);
        assert_eq!(second.responder, GOAL_SETTING_AGENT);
        assert_eq!(llm.remaining(), 0);
        let prompts = llm.prompts();
        assert!(prompts[0][0].content.starts_with("You are Supaboss"));
        assert!(prompts[2][0].content.starts_with("You are Supaboss"));
        assert_eq!(
            prompts[2].last().unwrap().content,
            "It matters because it will strengthen my resume"
        );
    }

    #[tokio::test]
    async fn test_cancelled_turn_changes_nothing() {
        let llm = Arc::new(ScriptedLlmClient::new(["never used"]));
        let router = router(llm.clone());
        let mut session = session();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = router
            .run_turn(&mut session, "hello", None, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, CoachError::Cancelled));
        assert!(session.history.is_empty());
        assert_eq!(llm.remaining(), 1);
    }

    #[tokio::test]
    async fn test_events_for_delegated_turn() {
        let llm = Arc::new(ScriptedLlmClient::new([TRANSFER_TO_GOALS, "Great! First, a name?"]));
        let router = router(llm);
        let mut session = session();
        let (tx, mut rx) = mpsc::unbounded_channel();

        router
            .run_turn(&mut session, "help me plan", Some(&tx), &CancellationToken::new())
            .await
            .unwrap();
        drop(tx);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }

        assert!(matches!(
            events.first(),
            Some(TurnEvent::Delegated { to, .. }) if to == GOAL_SETTING_AGENT
        ));
        assert_eq!(
            events.last(),
            Some(&TurnEvent::Done {
                responder: GOAL_SETTING_AGENT.to_string()
            })
        );
        let streamed: String = events
            .iter()
            .filter_map(|e| match e {
                TurnEvent::Chunk { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(streamed, "Great! First, a name?");
    }
}
