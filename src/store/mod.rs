//! Session-keyed conversation storage.
//!
//! Sessions are held in memory behind a read-write lock; each session owns
//! its own mutex, so concurrent operations on different sessions never block
//! each other while appends to one session are serialized. Callers never see
//! the underlying map, only the operations below.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::error::ShopkeepError;
use crate::types::Turn;

#[derive(Debug)]
struct SessionState {
    turns: VecDeque<Turn>,
    last_activity: DateTime<Utc>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            turns: VecDeque::new(),
            last_activity: Utc::now(),
        }
    }

    fn push_capped(&mut self, turn: Turn, max_history: usize) {
        self.turns.push_back(turn);
        while self.turns.len() > max_history {
            self.turns.pop_front();
        }
        self.last_activity = Utc::now();
    }
}

/// In-memory conversation store with a bounded per-session history.
#[derive(Debug)]
pub struct ConversationStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<SessionState>>>>,
    max_history: usize,
}

impl ConversationStore {
    /// Create a store retaining at most `max_history` turns per session.
    pub fn new(max_history: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_history,
        }
    }

    /// Resolve a session id, creating an empty session when needed.
    ///
    /// A supplied id is used as-is (a live session is reused, an unknown one
    /// created); with no id a fresh collision-resistant id is generated.
    pub async fn get_or_create(&self, session_id: Option<&str>) -> String {
        let id = match session_id {
            Some(id) => id.to_string(),
            None => Uuid::new_v4().to_string(),
        };
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(SessionState::new())));
        id
    }

    /// Append one turn to a session's history.
    ///
    /// Fails when the session does not exist; callers go through
    /// [`get_or_create`](Self::get_or_create) first.
    pub async fn append(&self, session_id: &str, turn: Turn) -> Result<(), ShopkeepError> {
        let session = self.session(session_id).await?;
        let mut state = session.lock().await;
        state.push_capped(turn, self.max_history);
        Ok(())
    }

    /// Append a user/assistant pair under a single lock acquisition.
    ///
    /// Concurrent exchanges against the same session land whole, in the
    /// order their locks are acquired; pairs are never interleaved.
    pub async fn append_exchange(
        &self,
        session_id: &str,
        user: Turn,
        assistant: Turn,
    ) -> Result<(), ShopkeepError> {
        let session = self.session(session_id).await?;
        let mut state = session.lock().await;
        state.push_capped(user, self.max_history);
        state.push_capped(assistant, self.max_history);
        Ok(())
    }

    /// Return the most recent `limit` turns (all retained turns when
    /// `limit` is `None`), oldest first. Unknown sessions yield an empty
    /// history.
    pub async fn history(&self, session_id: &str, limit: Option<usize>) -> Vec<Turn> {
        let sessions = self.sessions.read().await;
        let Some(session) = sessions.get(session_id).cloned() else {
            return Vec::new();
        };
        drop(sessions);

        let state = session.lock().await;
        let skip = match limit {
            Some(limit) => state.turns.len().saturating_sub(limit),
            None => 0,
        };
        state.turns.iter().skip(skip).cloned().collect()
    }

    /// Remove a session entirely. Returns whether a session was removed;
    /// clearing an unknown id is not an error.
    pub async fn clear(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    /// Snapshot of the currently live session ids.
    pub async fn session_ids(&self) -> Vec<String> {
        self.sessions.read().await.keys().cloned().collect()
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Last activity timestamp of a session, if it exists.
    pub async fn last_activity(&self, session_id: &str) -> Option<DateTime<Utc>> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(session_id).cloned()?;
        drop(sessions);

        let state = session.lock().await;
        Some(state.last_activity)
    }

    async fn session(&self, session_id: &str) -> Result<Arc<Mutex<SessionState>>, ShopkeepError> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| ShopkeepError::SessionNotFound(session_id.to_string()))
    }

    #[cfg(test)]
    pub(crate) async fn set_last_activity(&self, session_id: &str, at: DateTime<Utc>) {
        if let Some(session) = self.sessions.read().await.get(session_id).cloned() {
            session.lock().await.last_activity = at;
        }
    }
}
