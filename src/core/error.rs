//! 错误类型
//!
//! 数据形状类错误（目标 JSON 解析失败、类型不符）在合并例程内部吸收，不会出现在这里；
//! 这里只列出会让一轮对话失败、需要向用户给出通用提示的错误。

use thiserror::Error;

/// 一轮对话或会话存取过程中可能出现的错误
#[derive(Error, Debug)]
pub enum CoachError {
    #[error("LLM error: {0}")]
    Llm(String),

    /// 委派决策给出了未注册的子 Agent 名
    #[error("Unknown handler: {0}")]
    UnknownHandler(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    /// 用户中断（Ctrl+C），本轮状态未提交
    #[error("Turn cancelled")]
    Cancelled,
}

impl CoachError {
    /// 给用户看的通用提示；具体原因只写日志
    pub fn user_message(&self) -> &'static str {
        match self {
            CoachError::Cancelled => "Session interrupted. Goodbye!",
            _ => "I encountered an issue. Please try again or restart the session.",
        }
    }
}
