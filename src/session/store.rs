//! 会话存储抽象层
//!
//! 定义统一的会话存取接口，支持内存和 JSON 文件两种实现。
//! 读取返回会话的副本；调用方在一轮对话结束后显式 save_session。

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::session::{Session, SessionId};
use crate::core::CoachError;

/// 会话存储接口
#[async_trait]
pub trait SessionService: Send + Sync {
    /// 按 (app, user, id) 读取会话，不存在时返回 None
    async fn get_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<Option<Session>, CoachError>;

    /// 新建会话；未给 id 时自动生成，id 已存在则报错
    async fn create_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: Option<&str>,
    ) -> Result<Session, CoachError>;

    /// 写回会话（覆盖）
    async fn save_session(&self, session: &Session) -> Result<(), CoachError>;

    /// 删除会话，返回是否存在过
    async fn delete_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<bool, CoachError>;

    /// 列出用户的全部会话 ID
    async fn list_sessions(&self, app_name: &str, user_id: &str) -> Result<Vec<SessionId>, CoachError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SessionKey {
    app_name: String,
    user_id: String,
    session_id: String,
}

impl SessionKey {
    fn new(app_name: &str, user_id: &str, session_id: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
        }
    }

    fn of(session: &Session) -> Self {
        Self::new(&session.app_name, &session.user_id, &session.id)
    }
}

/// 内存会话存储
pub struct InMemorySessionService {
    sessions: RwLock<HashMap<SessionKey, Session>>,
    max_context_turns: usize,
}

impl InMemorySessionService {
    pub fn new(max_context_turns: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_context_turns,
        }
    }
}

impl Default for InMemorySessionService {
    fn default() -> Self {
        Self::new(20)
    }
}

#[async_trait]
impl SessionService for InMemorySessionService {
    async fn get_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<Option<Session>, CoachError> {
        let key = SessionKey::new(app_name, user_id, session_id);
        Ok(self.sessions.read().await.get(&key).cloned())
    }

    async fn create_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: Option<&str>,
    ) -> Result<Session, CoachError> {
        let session = Session::new(
            app_name,
            user_id,
            session_id.map(String::from),
            self.max_context_turns,
        );
        let mut sessions = self.sessions.write().await;
        let key = SessionKey::of(&session);
        if sessions.contains_key(&key) {
            return Err(CoachError::Session(format!("session '{}' already exists", session.id)));
        }
        sessions.insert(key, session.clone());
        Ok(session)
    }

    async fn save_session(&self, session: &Session) -> Result<(), CoachError> {
        self.sessions
            .write()
            .await
            .insert(SessionKey::of(session), session.clone());
        Ok(())
    }

    async fn delete_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<bool, CoachError> {
        let key = SessionKey::new(app_name, user_id, session_id);
        Ok(self.sessions.write().await.remove(&key).is_some())
    }

    async fn list_sessions(&self, app_name: &str, user_id: &str) -> Result<Vec<SessionId>, CoachError> {
        let mut ids: Vec<SessionId> = self
            .sessions
            .read()
            .await
            .keys()
            .filter(|k| k.app_name == app_name && k.user_id == user_id)
            .map(|k| k.session_id.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }
}

/// JSON 文件会话存储：`<root>/<app>/<user>/<session_id>.json`，每个会话一个文件
pub struct FileSessionService {
    root: PathBuf,
    max_context_turns: usize,
}

impl FileSessionService {
    pub fn new(root: impl AsRef<Path>, max_context_turns: usize) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            max_context_turns,
        }
    }

    fn user_dir(&self, app_name: &str, user_id: &str) -> Result<PathBuf, CoachError> {
        Ok(self
            .root
            .join(checked_component(app_name)?)
            .join(checked_component(user_id)?))
    }

    fn session_path(&self, app_name: &str, user_id: &str, session_id: &str) -> Result<PathBuf, CoachError> {
        Ok(self
            .user_dir(app_name, user_id)?
            .join(format!("{}.json", checked_component(session_id)?)))
    }

    async fn write(&self, session: &Session) -> Result<(), CoachError> {
        let path = self.session_path(&session.app_name, &session.user_id, &session.id)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(persistence)?;
        }
        let data = serde_json::to_string_pretty(session).map_err(persistence)?;
        // 先写临时文件再 rename，避免中断时留下半个文件
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, data).await.map_err(persistence)?;
        tokio::fs::rename(&tmp, &path).await.map_err(persistence)?;
        Ok(())
    }
}

/// 路径片段不能为空，也不能逃出根目录
fn checked_component(part: &str) -> Result<&str, CoachError> {
    if part.is_empty() || part == "." || part == ".." || part.contains(['/', '\\']) {
        return Err(CoachError::Session(format!("invalid path component: {:?}", part)));
    }
    Ok(part)
}

fn persistence(e: impl std::fmt::Display) -> CoachError {
    CoachError::Persistence(e.to_string())
}

#[async_trait]
impl SessionService for FileSessionService {
    async fn get_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<Option<Session>, CoachError> {
        let path = self.session_path(app_name, user_id, session_id)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(data) => Ok(Some(serde_json::from_str(&data).map_err(persistence)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(persistence(e)),
        }
    }

    async fn create_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: Option<&str>,
    ) -> Result<Session, CoachError> {
        let session = Session::new(
            app_name,
            user_id,
            session_id.map(String::from),
            self.max_context_turns,
        );
        let path = self.session_path(app_name, user_id, &session.id)?;
        if tokio::fs::try_exists(&path).await.map_err(persistence)? {
            return Err(CoachError::Session(format!("session '{}' already exists", session.id)));
        }
        self.write(&session).await?;
        Ok(session)
    }

    async fn save_session(&self, session: &Session) -> Result<(), CoachError> {
        self.write(session).await
    }

    async fn delete_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<bool, CoachError> {
        let path = self.session_path(app_name, user_id, session_id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(persistence(e)),
        }
    }

    async fn list_sessions(&self, app_name: &str, user_id: &str) -> Result<Vec<SessionId>, CoachError> {
        let dir = self.user_dir(app_name, user_id)?;
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(persistence(e)),
        };
        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(persistence)? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// 创建会话存储
///
/// 提供了目录则使用 JSON 文件存储；否则使用内存存储
pub fn create_session_service(dir: Option<&Path>, max_context_turns: usize) -> Arc<dyn SessionService> {
    match dir {
        Some(path) => {
            tracing::info!("Using file session store: {:?}", path);
            Arc::new(FileSessionService::new(path, max_context_turns))
        }
        None => {
            tracing::info!("Using in-memory session store");
            Arc::new(InMemorySessionService::new(max_context_turns))
        }
    }
}
