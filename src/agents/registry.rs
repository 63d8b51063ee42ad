//! 子 Agent 注册表
//!
//! 按注册顺序保存 Arc<dyn Handler>，按名查找；渲染「可委派的专家」段落供委派决策使用。

use std::sync::Arc;

use crate::agents::Handler;

#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: Vec<Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册；同名 Handler 会被替换
    pub fn register(&mut self, handler: impl Handler + 'static) {
        self.register_arc(Arc::new(handler));
    }

    pub fn register_arc(&mut self, handler: Arc<dyn Handler>) {
        if let Some(existing) = self.handlers.iter_mut().find(|h| h.name() == handler.name()) {
            tracing::warn!("Handler '{}' registered twice, replacing", handler.name());
            *existing = handler;
        } else {
            self.handlers.push(handler);
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.iter().find(|h| h.name() == name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.handlers.iter().map(|h| h.name().to_string()).collect()
    }

    /// 返回 (name, description) 列表
    pub fn descriptions(&self) -> Vec<(String, String)> {
        self.handlers
            .iter()
            .map(|h| (h.name().to_string(), h.description().to_string()))
            .collect()
    }

    /// prompt 中的专家列表段落
    pub fn specialists_block(&self) -> String {
        let mut s = String::from("## Specialized helper agents\n");
        for (name, description) in self.descriptions() {
            s.push_str(&format!("- {}: {}\n", name, description));
        }
        s
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
