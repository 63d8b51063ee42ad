//! 子 Agent（Handler）抽象
//!
//! 每个 Handler 提供名称、描述（供委派决策参考）、按会话状态拼出的 instruction，
//! 以及可选的「原始输出键」与回合结束回调。调用入口 respond 默认实现为：
//! system = instruction，后接对话历史，流式调用 LLM 并把分段转发到事件通道。

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::sync::mpsc;

use crate::core::CoachError;
use crate::llm::LlmClient;
use crate::memory::Message;
use crate::router::TurnEvent;
use crate::session::SessionState;

#[async_trait]
pub trait Handler: Send + Sync {
    /// 唯一名称（委派时用它定位）
    fn name(&self) -> &str;

    /// 何时适用，自然语言
    fn description(&self) -> &str;

    /// 本轮 instruction；只读会话状态，无副作用
    fn instruction(&self, state: &SessionState) -> String;

    /// 本轮完整输出写入会话的临时键
    fn output_key(&self) -> Option<&str> {
        None
    }

    /// 回合成功结束、输出已写入 output_key 之后调用
    fn after_turn(&self, _state: &mut SessionState) {}

    async fn respond(
        &self,
        llm: &dyn LlmClient,
        state: &SessionState,
        history: &[Message],
        events: Option<&mpsc::UnboundedSender<TurnEvent>>,
    ) -> Result<String, CoachError> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Message::system(self.instruction(state)));
        messages.extend_from_slice(history);

        let mut stream = llm.complete_stream(&messages).await.map_err(CoachError::Llm)?;
        let mut text = String::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(CoachError::Llm)?;
            if let Some(tx) = events {
                let _ = tx.send(TurnEvent::Chunk {
                    text: chunk.clone(),
                });
            }
            text.push_str(&chunk);
        }
        Ok(text)
    }
}
