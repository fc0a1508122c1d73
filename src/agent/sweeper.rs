//! Periodic eviction of idle sessions.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::AssistantConfig;
use crate::store::ConversationStore;

/// Evicts sessions whose last activity is older than a configured age.
///
/// Eviction is pure maintenance: an in-flight exchange against an evicted
/// session simply recreates it on its next store access.
pub struct SessionSweeper {
    store: Arc<ConversationStore>,
    max_age: Duration,
    interval: Duration,
}

impl SessionSweeper {
    pub fn new(store: Arc<ConversationStore>, config: &AssistantConfig) -> Self {
        Self {
            store,
            max_age: config.session_max_age,
            interval: config.sweep_interval,
        }
    }

    /// Run one eviction pass. Returns the number of sessions evicted.
    pub async fn sweep(&self) -> usize {
        let now = Utc::now();
        let mut evicted = 0;

        for id in self.store.session_ids().await {
            let Some(last) = self.store.last_activity(&id).await else {
                continue;
            };
            // Negative (future) ages collapse to zero and are never stale.
            let idle = (now - last).to_std().unwrap_or_default();
            if idle > self.max_age && self.store.clear(&id).await {
                debug!(session = %id, idle_secs = idle.as_secs(), "evicting idle session");
                evicted += 1;
            }
        }

        if evicted > 0 {
            info!(evicted, "sweep evicted idle sessions");
        }
        evicted
    }

    /// Spawn the recurring sweep task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.tick().await; // first tick fires immediately
            loop {
                ticker.tick().await;
                self.sweep().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Turn;

    fn sweeper_with_max_age(store: Arc<ConversationStore>, max_age: Duration) -> SessionSweeper {
        let config = AssistantConfig {
            session_max_age: max_age,
            ..AssistantConfig::default()
        };
        SessionSweeper::new(store, &config)
    }

    #[tokio::test]
    async fn sweep_evicts_only_stale_sessions() {
        let store = Arc::new(ConversationStore::new(20));
        store.get_or_create(Some("stale")).await;
        store.get_or_create(Some("fresh")).await;
        store.append("fresh", Turn::user("hi")).await.unwrap();
        store
            .set_last_activity("stale", Utc::now() - chrono::Duration::hours(48))
            .await;

        let sweeper = sweeper_with_max_age(store.clone(), Duration::from_secs(24 * 60 * 60));
        let evicted = sweeper.sweep().await;

        assert_eq!(evicted, 1);
        assert_eq!(store.session_ids().await, vec!["fresh".to_string()]);
    }

    #[tokio::test]
    async fn sweep_with_no_stale_sessions_is_a_no_op() {
        let store = Arc::new(ConversationStore::new(20));
        store.get_or_create(Some("a")).await;

        let sweeper = sweeper_with_max_age(store.clone(), Duration::from_secs(60));
        assert_eq!(sweeper.sweep().await, 0);
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn evicted_session_is_recreated_on_next_access() {
        let store = Arc::new(ConversationStore::new(20));
        store.get_or_create(Some("s1")).await;
        store.append("s1", Turn::user("old")).await.unwrap();
        store
            .set_last_activity("s1", Utc::now() - chrono::Duration::days(2))
            .await;

        let sweeper = sweeper_with_max_age(store.clone(), Duration::from_secs(60));
        assert_eq!(sweeper.sweep().await, 1);

        let id = store.get_or_create(Some("s1")).await;
        assert_eq!(id, "s1");
        assert!(store.history("s1", None).await.is_empty());
    }

    #[tokio::test]
    async fn spawned_sweeper_runs_on_its_interval() {
        let store = Arc::new(ConversationStore::new(20));
        store.get_or_create(Some("stale")).await;
        store
            .set_last_activity("stale", Utc::now() - chrono::Duration::hours(2))
            .await;

        let config = AssistantConfig {
            session_max_age: Duration::from_secs(60 * 60),
            sweep_interval: Duration::from_millis(20),
            ..AssistantConfig::default()
        };
        let handle = SessionSweeper::new(store.clone(), &config).spawn();

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(store.session_count().await, 0);
        handle.abort();
    }
}
