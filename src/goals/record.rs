//! 目标记录与子 Agent 原始输出
//!
//! GoalRecord 是 S.M.A.R.T. 目标的强类型视图；会话中实际存放的是 JSON 对象，
//! 因为宽松策略下缺字段的记录同样会被追加。

use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// 一个 S.M.A.R.T. 目标
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GoalRecord {
    /// 目标名称或简短标题
    pub name: String,
    /// Specific：具体要达成什么
    pub specific: String,
    /// Measurable：如何衡量进度与完成
    pub measurable: String,
    /// Achievable：以现有资源是否可行
    pub achievable: String,
    /// Relevant：为什么重要
    pub relevant: String,
    /// Time-bound：截止时间或时间范围
    pub time_bound: String,
}

impl GoalRecord {
    pub const FIELDS: [&'static str; 6] = [
        "name",
        "specific",
        "measurable",
        "achievable",
        "relevant",
        "time_bound",
    ];

    /// 从会话中的 JSON 值还原；缺字段或字段不是字符串时返回 None
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    pub fn to_value(&self) -> Value {
        json!({
            "name": self.name,
            "specific": self.specific,
            "measurable": self.measurable,
            "achievable": self.achievable,
            "relevant": self.relevant,
            "time_bound": self.time_bound,
        })
    }

    /// 候选记录中缺失（或不是字符串）的必填字段
    pub fn missing_fields(candidate: &Map<String, Value>) -> Vec<&'static str> {
        Self::FIELDS
            .iter()
            .copied()
            .filter(|f| !candidate.get(*f).is_some_and(Value::is_string))
            .collect()
    }

    /// JSON Schema 字符串，拼入目标设定 Agent 的 instruction
    pub fn schema_json() -> String {
        let schema = schema_for!(GoalRecord);
        serde_json::to_string_pretty(&schema).unwrap_or_default()
    }
}

/// 目标记录入列时的字段校验策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalPolicy {
    /// 任意 JSON 对象都追加，不检查字段
    #[default]
    Lenient,
    /// 六个字段必须齐全且为字符串，否则丢弃
    Strict,
}

/// 子 Agent 一轮结束时留下的原始输出，在边界处一次性分类
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutput {
    /// 文本，期望是序列化的目标 JSON
    RawText(String),
    /// 已经是结构化映射
    Structured(Map<String, Value>),
    /// 既不是文本也不是映射
    Unsupported(Value),
}

impl From<Value> for HandlerOutput {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => HandlerOutput::RawText(text),
            Value::Object(map) => HandlerOutput::Structured(map),
            other => HandlerOutput::Unsupported(other),
        }
    }
}

/// JSON 值的类型名，用于日志
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
