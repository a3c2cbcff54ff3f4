//! In-memory registry of live sessions. Each session's state sits behind its
//! own mutex, so turns within a session run one at a time while sessions
//! never block each other.
//!
//! Sessions untouched for longer than the idle TTL are dropped, together
//! with the candidate details they hold.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::interview::models::ConversationState;

pub type SessionHandle = Arc<Mutex<ConversationState>>;

pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

struct Entry {
    handle: SessionHandle,
    last_activity: Instant,
}

#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, Entry>>>,
    idle_ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TTL)
    }
}

impl SessionRegistry {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
        }
    }

    /// Registers a session. Idle sessions are swept first.
    pub async fn insert(&self, state: ConversationState) -> SessionHandle {
        self.purge_idle().await;

        let id = state.session_id;
        let handle = Arc::new(Mutex::new(state));
        let entry = Entry {
            handle: handle.clone(),
            last_activity: Instant::now(),
        };
        self.sessions.write().await.insert(id, entry);
        handle
    }

    /// Looks a session up and marks it active.
    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        if entry.last_activity.elapsed() >= self.idle_ttl {
            sessions.remove(&id);
            return None;
        }
        entry.last_activity = Instant::now();
        Some(entry.handle.clone())
    }

    /// Drops a session. Returns false if it was not registered.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops every session idle for at least the TTL. Returns how many.
    pub async fn purge_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_activity.elapsed() < self.idle_ttl);
        let removed = before - sessions.len();
        if removed > 0 {
            info!("Discarded {removed} idle sessions");
        }
        removed
    }

    /// Runs `purge_idle` every `every` until the runtime shuts down.
    pub fn spawn_reaper(&self, every: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                registry.purge_idle().await;
            }
        })
    }
}
