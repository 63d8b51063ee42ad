//! 目标摘要：把会话中的目标列表渲染成 prompt 片段
//!
//! 纯函数，只读会话状态。条目是带 name 的映射时渲染名称，是字符串时原样渲染，
//! 其余条目静默跳过；编号取条目在完整列表中的位置，因此跳过的条目会留下空号。

use serde_json::Value;

use crate::session::{SessionState, USER_GOALS_KEY};

/// 目标列表的三种可见形态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalSummary {
    /// 没有目标（键缺失，或值为空：null、false、0、空串、空列表、空映射）
    Empty,
    /// 有内容，但没有一条能渲染（全部格式不符，或根本不是列表）
    Unrecognised,
    /// 渲染好的行，形如 `  - Goal 1: Learn Python`
    Listed(Vec<String>),
}

/// 各 Agent 自己的摘要措辞
#[derive(Debug, Clone, Copy)]
pub struct SummaryText {
    /// 列表前的标题行
    pub header: &'static str,
    /// 列表后的收尾行
    pub footer: &'static str,
    pub empty: &'static str,
    pub unrecognised: &'static str,
}

impl GoalSummary {
    pub fn from_state(state: &SessionState) -> Self {
        match state.get(USER_GOALS_KEY) {
            None => GoalSummary::Empty,
            Some(value) if is_blank(value) => GoalSummary::Empty,
            Some(Value::Array(items)) => {
                let lines: Vec<String> = items
                    .iter()
                    .enumerate()
                    .filter_map(|(i, item)| {
                        goal_label(item).map(|label| format!("  - Goal {}: {}", i + 1, label))
                    })
                    .collect();
                if lines.is_empty() {
                    GoalSummary::Unrecognised
                } else {
                    GoalSummary::Listed(lines)
                }
            }
            Some(_) => GoalSummary::Unrecognised,
        }
    }

    pub fn render(&self, text: &SummaryText) -> String {
        match self {
            GoalSummary::Empty => format!("\n{}", text.empty),
            GoalSummary::Unrecognised => format!("\n{}", text.unrecognised),
            GoalSummary::Listed(lines) => {
                format!("\n{}\n{}\n{}", text.header, lines.join("\n"), text.footer)
            }
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(true) => false,
    }
}

/// 渲染单条目标；无法识别的条目返回 None
fn goal_label(item: &Value) -> Option<String> {
    match item {
        Value::Object(map) => map.get("name").map(|name| match name {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// 读取会话状态并按给定措辞渲染
pub fn goals_summary(state: &SessionState, text: &SummaryText) -> String {
    GoalSummary::from_state(state).render(text)
}
