//! Process-wide table of live sessions, plus the file-backed recovery
//! record. A single mutex guards both the map and the persistence file, so
//! writes to `active_sessions.json` are naturally serialized with registry
//! mutations — the spec's single-writer discipline.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::warn;

use crate::error::{EngineError, Result};
use crate::model::{MeetingId, PersistedSession};
use crate::paths::active_sessions_file;
use crate::session::Session;

struct Inner {
    sessions: HashMap<MeetingId, Arc<Session>>,
    persisted: HashMap<MeetingId, PersistedSession>,
}

pub struct SessionRegistry {
    root: PathBuf,
    inner: Mutex<Inner>,
}

impl SessionRegistry {
    /// Loads any `active_sessions.json` already on disk — the recovery
    /// entry point at process startup. A missing or corrupt file is treated
    /// as empty rather than fatal; recovery is best-effort.
    pub fn load(root: PathBuf) -> Self {
        let path = active_sessions_file(&root);
        let persisted = std::fs::read(&path)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .unwrap_or_default();
        Self {
            root,
            inner: Mutex::new(Inner {
                sessions: HashMap::new(),
                persisted,
            }),
        }
    }

    pub async fn insert_unique(
        &self,
        session: Arc<Session>,
        record: PersistedSession,
    ) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.sessions.contains_key(&session.meeting_id) {
            return Err(EngineError::AlreadyActive(session.meeting_id.clone()));
        }
        inner.sessions.insert(session.meeting_id.clone(), session);
        inner.persisted.insert(record.meeting_id.clone(), record);
        self.flush_locked(&inner);
        Ok(())
    }

    pub async fn get(&self, meeting_id: &str) -> Option<Arc<Session>> {
        self.inner.lock().await.sessions.get(meeting_id).cloned()
    }

    /// Snapshot of every live session. Iteration is otherwise not exposed —
    /// this exists only for process-wide shutdown, which must reach every
    /// session's timers regardless of meeting id.
    pub(crate) async fn all_sessions(&self) -> Vec<Arc<Session>> {
        self.inner.lock().await.sessions.values().cloned().collect()
    }

    pub async fn remove(&self, meeting_id: &str) -> Option<Arc<Session>> {
        let mut inner = self.inner.lock().await;
        let removed = inner.sessions.remove(meeting_id);
        inner.persisted.remove(meeting_id);
        self.flush_locked(&inner);
        removed
    }

    pub async fn take_orphan(&self, meeting_id: &str) -> Option<PersistedSession> {
        let inner = self.inner.lock().await;
        if inner.sessions.contains_key(meeting_id) {
            return None;
        }
        inner.persisted.get(meeting_id).cloned()
    }

    /// Removes a persisted-only record (no live `Session`) — the
    /// `RecoverOrphan` cleanup path.
    pub async fn remove_persisted_only(&self, meeting_id: &str) {
        let mut inner = self.inner.lock().await;
        inner.persisted.remove(meeting_id);
        self.flush_locked(&inner);
    }

    fn flush_locked(&self, inner: &Inner) {
        let path = active_sessions_file(&self.root);
        match serde_json::to_vec_pretty(&inner.persisted) {
            Ok(bytes) => {
                if let Err(e) = std::fs::write(&path, bytes) {
                    warn!(error = %e, path = %path.display(), "failed to rewrite persistence file");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize persistence map"),
        }
    }
}
