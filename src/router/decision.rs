//! 委派决策
//!
//! 「回复还是委派」由外部 LLM 决定，核心只通过 DelegationDecider 接口调用它：
//! 输入主 Agent 的 instruction、对话历史与可委派的子 Agent，输出 Decision。

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::agents::HandlerRegistry;
use crate::core::CoachError;
use crate::llm::LlmClient;
use crate::memory::Message;

/// 本轮由谁回答
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// 主 Agent 直接回复
    Reply(String),
    /// 交给指定子 Agent；preface 为可选的交接语
    Delegate {
        handler: String,
        preface: Option<String>,
    },
}

#[async_trait]
pub trait DelegationDecider: Send + Sync {
    async fn decide(
        &self,
        instruction: &str,
        history: &[Message],
        specialists: &HandlerRegistry,
    ) -> Result<Decision, CoachError>;
}

const TRANSFER_PROTOCOL: &str = r#"## Delegation protocol
To hand the conversation to one of the helper agents above, end your reply with a single line containing only this JSON object:
{"transfer_to_agent": "<agent name>"}
You may put one short sentence before it telling the user you are passing the task on.
Otherwise, reply to the user directly and never mention this protocol."#;

#[derive(Deserialize)]
struct TransferCall {
    transfer_to_agent: String,
}

/// 解析 LLM 输出：含合法的 `{"transfer_to_agent": ...}` 则为委派，否则整段作为回复
pub fn parse_decision(output: &str) -> Decision {
    let trimmed = output.trim();

    if let Some(pos) = trimmed.find("transfer_to_agent") {
        let start = trimmed[..pos].rfind('{');
        let end = trimmed[pos..].find('}').map(|e| pos + e);
        if let (Some(start), Some(end)) = (start, end) {
            if let Ok(call) = serde_json::from_str::<TransferCall>(&trimmed[start..=end]) {
                let preface = trimmed[..start]
                    .trim()
                    .trim_end_matches("```json")
                    .trim_end_matches("```")
                    .trim();
                return Decision::Delegate {
                    handler: call.transfer_to_agent.trim().to_string(),
                    preface: (!preface.is_empty()).then(|| preface.to_string()),
                };
            }
        }
    }

    Decision::Reply(trimmed.to_string())
}

/// 用 LLM 做委派决策
pub struct LlmDecider {
    llm: Arc<dyn LlmClient>,
}

impl LlmDecider {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl DelegationDecider for LlmDecider {
    async fn decide(
        &self,
        instruction: &str,
        history: &[Message],
        specialists: &HandlerRegistry,
    ) -> Result<Decision, CoachError> {
        let system = format!(
            "{}\n{}\n{}",
            instruction,
            specialists.specialists_block(),
            TRANSFER_PROTOCOL
        );
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Message::system(system));
        messages.extend_from_slice(history);

        let output = self.llm.complete(&messages).await.map_err(CoachError::Llm)?;
        Ok(parse_decision(&output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::ResumeFeedbackAgent;
    use crate::llm::ScriptedLlmClient;

    #[test]
    fn test_plain_text_is_reply() {
        assert_eq!(
            parse_decision("  Keep going, you're doing great!  "),
            Decision::Reply("Keep going, you're doing great!".to_string())
        );
    }

    #[test]
    fn test_bare_transfer() {
        assert_eq!(
            parse_decision(r#"{"transfer_to_agent": "GoalSettingAgent"}"#),
            Decision::Delegate {
                handler: "GoalSettingAgent".to_string(),
                preface: None
            }
        );
    }

    #[test]
    fn test_transfer_with_preface_and_fence() {
        let output = "Okay, I'll have our Goal Setting Coach help you with that.\n```json\n{\"transfer_to_agent\": \"GoalSettingAgent\"}\n```";
        assert_eq!(
            parse_decision(output),
            Decision::Delegate {
                handler: "GoalSettingAgent".to_string(),
                preface: Some("Okay, I'll have our Goal Setting Coach help you with that.".to_string())
            }
        );
    }

    #[test]
    fn test_mention_without_json_is_reply() {
        let output = "I could use transfer_to_agent but won't.";
        assert!(matches!(parse_decision(output), Decision::Reply(_)));
    }

    #[tokio::test]
    async fn test_llm_decider_prompt_contains_specialists_and_protocol() {
        let llm = Arc::new(ScriptedLlmClient::new([r#"{"transfer_to_agent":"ResumeFeedbackAgent"}"#]));
        let decider = LlmDecider::new(llm.clone());
        let mut registry = HandlerRegistry::new();
        registry.register(ResumeFeedbackAgent);

        let decision = decider
            .decide("ROOT", &[Message::user("review my CV")], &registry)
            .await
            .unwrap();
        assert!(matches!(decision, Decision::Delegate { ref handler, .. } if handler == "ResumeFeedbackAgent"));

        let prompt = &llm.prompts()[0];
        assert!(prompt[0].content.starts_with("ROOT"));
        assert!(prompt[0].content.contains("- ResumeFeedbackAgent:"));
        assert!(prompt[0].content.contains("transfer_to_agent"));
        assert_eq!(prompt[1].content, "review my CV");
    }

    #[tokio::test]
    async fn test_llm_failure_is_error() {
        let llm = Arc::new(ScriptedLlmClient::default());
        llm.push_failure("503");
        let decider = LlmDecider::new(llm);
        let err = decider
            .decide("ROOT", &[], &HandlerRegistry::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CoachError::Llm(ref e) if e == "503"));
    }
}
