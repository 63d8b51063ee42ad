//! 回合过程事件：供 CLI 流式展示委派与回复

use serde::Serialize;

/// 单个回合内的过程事件（可序列化为 JSON 供前端展示）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnEvent {
    /// 主 Agent 把本轮交给子 Agent；preface 为主 Agent 的交接语
    Delegated {
        from: String,
        to: String,
        preface: Option<String>,
    },
    /// 回复的一小段（流式输出）
    Chunk { text: String },
    /// 回合已提交
    Done { responder: String },
}
