//! Per-session state: the dashboard visit counter

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::AppResult;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Count one more visit for the session and return how many visits
    /// came before this one (0 for a new session)
    async fn record_visit(&self, session_id: &str) -> AppResult<i64>;
}

struct Visits {
    count: i64,
    expires_at: Instant,
}

/// Session counters kept in process memory
///
/// Like the Redis keys, a session expires `ttl` after its last visit and
/// expired sessions are dropped on the next write.
pub struct MemorySessionStore {
    ttl: Duration,
    visits: Mutex<HashMap<String, Visits>>,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            visits: Mutex::new(HashMap::new()),
        }
    }

    async fn record_visit_at(&self, session_id: &str, now: Instant) -> i64 {
        let mut visits = self.visits.lock().await;
        visits.retain(|_, v| v.expires_at > now);

        let entry = visits.entry(session_id.to_string()).or_insert(Visits {
            count: 0,
            expires_at: now,
        });
        let previous = entry.count;
        entry.count += 1;
        entry.expires_at = now + self.ttl;
        previous
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.visits.lock().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn record_visit(&self, session_id: &str) -> AppResult<i64> {
        Ok(self.record_visit_at(session_id, Instant::now()).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_WEEKS: Duration = Duration::from_secs(1_209_600);

    #[tokio::test]
    async fn nth_visit_reports_n_minus_one() {
        let store = MemorySessionStore::new(TWO_WEEKS);
        for expected in 0..5 {
            assert_eq!(store.record_visit("abc").await.unwrap(), expected);
        }
        assert_eq!(store.record_visit("other").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn expired_session_starts_over() {
        let store = MemorySessionStore::new(Duration::from_secs(60));
        let start = Instant::now();

        assert_eq!(store.record_visit_at("abc", start).await, 0);
        assert_eq!(store.record_visit_at("abc", start + Duration::from_secs(59)).await, 1);
        // Each visit pushes the expiry out again
        assert_eq!(store.record_visit_at("abc", start + Duration::from_secs(118)).await, 2);
        assert_eq!(store.record_visit_at("abc", start + Duration::from_secs(179)).await, 0);
    }

    #[tokio::test]
    async fn expired_sessions_are_dropped() {
        let store = MemorySessionStore::new(Duration::from_secs(60));
        let start = Instant::now();

        for i in 0..100 {
            store.record_visit_at(&format!("crawler-{}", i), start).await;
        }
        assert_eq!(store.len().await, 100);

        store.record_visit_at("reader", start + Duration::from_secs(61)).await;
        assert_eq!(store.len().await, 1);
    }
}
