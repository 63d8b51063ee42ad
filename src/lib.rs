//! Supaboss - 目标教练型对话助手
//!
//! 模块划分：
//! - **agents**: 主 Agent「Supaboss」与子 Agent（目标设定、简历反馈）、注册表
//! - **coach**: 由配置组装 Router、续用或新建会话
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型
//! - **goals**: S.M.A.R.T. 目标记录、提取合并例程、prompt 摘要
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / DeepSeek / Mock / Scripted）
//! - **memory**: 短期对话历史
//! - **observability**: 日志初始化
//! - **router**: 委派决策、意图快速匹配、回合调度
//! - **session**: 会话状态、会话对象与存储后端

pub mod agents;
pub mod coach;
pub mod config;
pub mod core;
pub mod goals;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod router;
pub mod session;

pub use coach::{create_router, open_session};
pub use router::{Router, TurnEvent, TurnReply};
pub use session::{Session, SessionState};
