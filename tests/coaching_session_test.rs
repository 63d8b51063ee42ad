//! 端到端对话：脚本化 LLM 驱动 Router，覆盖委派、目标入列、摘要回流与失败隔离

use std::sync::Arc;

use serde_json::Value;
use supaboss::agents::{GOAL_SETTING_AGENT, MAIN_AGENT, NO_GOALS_TEXT};
use supaboss::config::AppConfig;
use supaboss::goals::GoalRecord;
use supaboss::llm::ScriptedLlmClient;
use supaboss::session::{InMemorySessionService, SessionService, USER_GOALS_KEY};
use supaboss::{create_router, open_session};
use tokio_util::sync::CancellationToken;

const TO_GOALS: &str = r#"{"transfer_to_agent": "GoalSettingAgent"}"#;

fn goals(state: &supaboss::SessionState) -> Vec<Value> {
    state
        .get(USER_GOALS_KEY)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

#[tokio::test]
async fn test_goal_setting_conversation_records_goal() {
    let llm = Arc::new(ScriptedLlmClient::new([
        // 第 1 轮：主 Agent 决定交给目标教练
        TO_GOALS,
        "Great! Let's define a S.M.A.R.T. goal. First, what would you like to name this goal?",
        // 第 2 轮：主 Agent 决定继续交给目标教练
        TO_GOALS,
        "Okay, 'Learn Python'. Now, let's make it Specific.",
        // 第 3 轮：目标教练输出最终 JSON
        TO_GOALS,
        r#"{"name": "Learn Python", "specific": "Build a web scraper", "measurable": "Scraper works on one site", "achievable": "10 hours a week", "relevant": "Data analysis at work", "time_bound": "Within 2 months"}"#,
        // 第 4 轮：主 Agent 直接回复
        "Nice work! Anything else on your mind?",
    ]));
    let router = create_router(&AppConfig::default(), llm.clone());
    let sessions = InMemorySessionService::default();
    let mut session = open_session(&sessions, "supaboss_ai_cli", "cli_user_01", "s1")
        .await
        .unwrap();
    let cancel = CancellationToken::new();

    let first = router
        .run_turn(&mut session, "I want to set a goal", None, &cancel)
        .await
        .unwrap();
    assert_eq!(first.responder, GOAL_SETTING_AGENT);
    assert!(goals(&session.state).is_empty());

    router
        .run_turn(&mut session, "Learn Python", None, &cancel)
        .await
        .unwrap();
    assert!(goals(&session.state).is_empty());

    router
        .run_turn(&mut session, "Within 2 months.", None, &cancel)
        .await
        .unwrap();
    let recorded = goals(&session.state);
    assert_eq!(recorded.len(), 1);
    let goal = GoalRecord::from_value(&recorded[0]).unwrap();
    assert_eq!(goal.name, "Learn Python");
    assert_eq!(goal.time_bound, "Within 2 months");

    let last = router
        .run_turn(&mut session, "Thanks!", None, &cancel)
        .await
        .unwrap();
    assert_eq!(last.responder, MAIN_AGENT);

    // 每轮都由主 Agent 决策：目标入列前无目标，入列后的下一轮已列出新目标
    let prompts = llm.prompts();
    let root_prompts: Vec<&String> = prompts
        .iter()
        .map(|p| &p[0].content)
        .filter(|c| c.starts_with("You are Supaboss"))
        .collect();
    assert_eq!(root_prompts.len(), 4);
    assert!(root_prompts[0].contains(NO_GOALS_TEXT));
    assert!(root_prompts[2].contains(NO_GOALS_TEXT));
    assert!(root_prompts[3].contains("  - Goal 1: Learn Python"));

    // 会话写回后可再次读出
    sessions.save_session(&session).await.unwrap();
    let reloaded = sessions
        .get_session("supaboss_ai_cli", "cli_user_01", "s1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(goals(&reloaded.state).len(), 1);
    assert_eq!(reloaded.history.len(), session.history.len());
}

#[tokio::test]
async fn test_failed_turn_keeps_session_usable() {
    let llm = Arc::new(ScriptedLlmClient::default());
    llm.push_failure("service unavailable");
    llm.push_reply("I'm back. How can I help?");
    let router = create_router(&AppConfig::default(), llm);
    let sessions = InMemorySessionService::default();
    let mut session = open_session(&sessions, "app", "u", "s").await.unwrap();
    let cancel = CancellationToken::new();

    let err = router
        .run_turn(&mut session, "hello?", None, &cancel)
        .await
        .unwrap_err();
    assert!(err.user_message().contains("Please try again"));
    assert!(session.history.is_empty());

    let reply = router
        .run_turn(&mut session, "hello again", None, &cancel)
        .await
        .unwrap();
    assert_eq!(reply.text, "I'm back. How can I help?");
    assert_eq!(session.history.len(), 2);
}

#[tokio::test]
async fn test_structured_goal_without_name_is_kept_but_not_listed() {
    let llm = Arc::new(ScriptedLlmClient::new(["Welcome back!"]));
    let router = create_router(&AppConfig::default(), llm.clone());
    let sessions = InMemorySessionService::default();
    let mut session = open_session(&sessions, "app", "u", "s").await.unwrap();

    let mut state = session.state.clone();
    state.set(
        supaboss::session::NEW_GOAL_DETAILS_KEY,
        serde_json::json!({"specific": "no name given"}),
    );
    supaboss::goals::finalize_goal(
        &mut state,
        supaboss::session::NEW_GOAL_DETAILS_KEY,
        supaboss::goals::GoalPolicy::Lenient,
    );
    session.state = state;
    assert_eq!(goals(&session.state).len(), 1);

    router
        .run_turn(&mut session, "hi", None, &CancellationToken::new())
        .await
        .unwrap();
    let root_prompt = &llm.prompts()[0][0].content;
    assert!(!root_prompt.contains("Goal 1"));
    assert!(root_prompt.contains("not in the expected format"));
}
