//! 目标提取与合并
//!
//! 目标设定 Agent 一轮结束后，从会话临时键取出原始输出，解析为目标记录并追加到 `user_goals`。
//! 任何数据形状问题都在这里吸收：写日志、不改目标列表、不向调用方报错。
//! 没有去重，同一份数据合并两次会追加两条。

use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use super::record::{value_kind, GoalPolicy, GoalRecord, HandlerOutput};
use crate::session::{SessionState, USER_GOALS_KEY};

/// 一次合并尝试的结果（仅供调用方观察，失败已在内部处理完毕）
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    /// 临时键不存在，什么也没做
    NoOutput,
    /// 已追加，index 为新记录在目标列表中的位置
    Appended { index: usize },
    /// 文本不是合法 JSON
    ParseFailed(String),
    /// 值（或解析结果）不是映射
    Unsupported(&'static str),
    /// 严格模式下缺少必填字段
    Rejected { missing: Vec<&'static str> },
}

impl MergeOutcome {
    pub fn is_appended(&self) -> bool {
        matches!(self, MergeOutcome::Appended { .. })
    }
}

/// 取出并删除 `output_key` 下的原始输出，成功解析则追加到目标列表
pub fn finalize_goal(state: &mut SessionState, output_key: &str, policy: GoalPolicy) -> MergeOutcome {
    let Some(raw) = state.remove(output_key) else {
        return MergeOutcome::NoOutput;
    };

    let candidate = match HandlerOutput::from(raw) {
        HandlerOutput::RawText(text) => match parse_goal_text(&text) {
            Ok(Value::Object(map)) => {
                info!("Successfully parsed {} JSON string: {:?}", output_key, map);
                map
            }
            Ok(other) => {
                warn!(
                    "{} parsed as JSON {} instead of an object. Skipping append.",
                    output_key,
                    value_kind(&other)
                );
                return MergeOutcome::Unsupported(value_kind(&other));
            }
            Err(e) => {
                error!("Failed to decode JSON from {}: {} ({})", output_key, text, e);
                return MergeOutcome::ParseFailed(e.to_string());
            }
        },
        HandlerOutput::Structured(map) => {
            info!("{} was already structured: {:?}", output_key, map);
            map
        }
        HandlerOutput::Unsupported(value) => {
            warn!(
                "{} was neither a string nor a mapping: {}. Skipping append.",
                output_key,
                value_kind(&value)
            );
            return MergeOutcome::Unsupported(value_kind(&value));
        }
    };

    if policy == GoalPolicy::Strict {
        let missing = GoalRecord::missing_fields(&candidate);
        if !missing.is_empty() {
            warn!("Goal record rejected, missing fields: {:?}", missing);
            return MergeOutcome::Rejected { missing };
        }
    }

    append_goal(state, candidate)
}

/// 追加一条记录到目标列表末尾；列表缺失或损坏时先重建
pub fn append_goal(state: &mut SessionState, record: Map<String, Value>) -> MergeOutcome {
    let len = state.push_to_list(USER_GOALS_KEY, Value::Object(record));
    info!("Goal added to session state at position {}", len);
    debug!("Current goals in session: {:?}", state.get(USER_GOALS_KEY));
    MergeOutcome::Appended { index: len - 1 }
}

/// 整段包在单个 Markdown 代码块里时先剥掉围栏，其余文本原样交给 serde_json
fn parse_goal_text(text: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(strip_code_fence(text.trim()))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return text;
    };
    // 去掉语言标记（```json）
    match body.find('\n') {
        Some(newline) => body[newline + 1..].trim(),
        None => body.trim(),
    }
}
