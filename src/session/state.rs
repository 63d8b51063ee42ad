//! 会话状态：字符串键到任意 JSON 值的映射
//!
//! 由 Router 显式传给每个需要它的组件（构建 prompt 时只读，子 Agent 结束一轮后可写），
//! 没有全局访问入口。核心只占用下列保留键。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 已记录的目标列表（按创建顺序追加）
pub const USER_GOALS_KEY: &str = "user_goals";

/// 目标设定 Agent 每轮原始输出的临时键，合并例程读取后即删除
pub const NEW_GOAL_DETAILS_KEY: &str = "new_goal_details";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionState {
    values: Map<String, Value>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// 取出并删除
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 向 `key` 下的数组末尾追加一项，返回追加后的长度。
    ///
    /// 键缺失或值不是数组时，先换成空数组（旧值丢弃）；已有数组中的元素保持原序。
    pub fn push_to_list(&mut self, key: &str, item: Value) -> usize {
        let mut items = match self.values.remove(key) {
            Some(Value::Array(items)) => items,
            _ => {
                tracing::info!("Initializing '{}' in session state as a new list", key);
                Vec::new()
            }
        };
        items.push(item);
        let len = items.len();
        self.values.insert(key.to_string(), Value::Array(items));
        len
    }
}
