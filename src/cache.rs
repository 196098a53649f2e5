//! Time-bounded response cache for single-shot generation results.
//!
//! One live value per fingerprint; values expire a fixed TTL after the `set`
//! that stored them. Expired entries are removed on read and by the periodic
//! purge task, so they are never observed. Nothing survives a process restart.
//!
//! The cache is an optimization only: a miss is always safe to treat as
//! "never computed".

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde_json::Value;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::fingerprint::Fingerprint;

/// Default time-to-live for cached responses (1 hour).
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

struct CacheEntry {
    value: Value,
    stored_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.duration_since(self.stored_at) >= ttl
    }
}

/// Shared TTL cache keyed by request fingerprint.
///
/// Cloning is cheap; all clones share the same entries.
#[derive(Clone)]
pub struct ResponseCache {
    entries: Arc<DashMap<Fingerprint, CacheEntry>>,
    ttl: Duration,
}

impl ResponseCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a live value.
    pub fn get(&self, key: &Fingerprint) -> Option<Value> {
        let now = Instant::now();
        {
            let entry = self.entries.get(key)?;
            if !entry.is_expired(now, self.ttl) {
                return Some(entry.value.clone());
            }
        }

        // A concurrent `set` may have refreshed the entry since the read above.
        self.entries
            .remove_if(key, |_, entry| entry.is_expired(now, self.ttl));
        None
    }

    /// Store a value, replacing any previous one and restarting its TTL.
    pub fn set(&self, key: Fingerprint, value: Value) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Remove every expired entry. Returns the number removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| !entry.is_expired(now, self.ttl));
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Spawn a task that purges expired entries every `interval` until `shutdown` fires.
    pub fn spawn_purge_task(&self, interval: Duration, shutdown: CancellationToken) {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        let removed = cache.purge_expired();
                        if removed > 0 {
                            debug!(removed, remaining = cache.len(), "Purged expired cache entries");
                        }
                    }
                }
            }
        });
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::fingerprint;
    use serde_json::json;

    fn key(n: u32) -> Fingerprint {
        fingerprint("test", &json!({ "n": n }))
    }

    #[tokio::test(start_paused = true)]
    async fn set_then_get_within_ttl() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.set(key(1), json!("cached text"));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get(&key(1)), Some(json!("cached text")));
    }

    #[tokio::test(start_paused = true)]
    async fn entry_is_absent_after_ttl() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.set(key(1), json!({"analysis": "ok"}));

        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(cache.get(&key(1)), None);
        // Expired entries are removed, not tombstoned.
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn set_overwrites_and_resets_ttl() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.set(key(1), json!("first"));

        tokio::time::advance(Duration::from_secs(45)).await;
        cache.set(key(1), json!("second"));

        tokio::time::advance(Duration::from_secs(45)).await;
        assert_eq!(cache.get(&key(1)), Some(json!("second")));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn missing_key_is_absent() {
        let cache = ResponseCache::default();
        assert_eq!(cache.get(&key(7)), None);
        assert_eq!(cache.ttl(), DEFAULT_TTL);
    }

    #[tokio::test(start_paused = true)]
    async fn purge_removes_only_expired_entries() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.set(key(1), json!("old"));
        tokio::time::advance(Duration::from_secs(30)).await;
        cache.set(key(2), json!("new"));
        tokio::time::advance(Duration::from_secs(30)).await;

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key(2)), Some(json!("new")));
    }

    #[tokio::test(start_paused = true)]
    async fn purge_task_runs_until_cancelled() {
        let cache = ResponseCache::new(Duration::from_secs(10));
        let shutdown = CancellationToken::new();
        cache.spawn_purge_task(Duration::from_secs(5), shutdown.clone());

        cache.set(key(1), json!("short-lived"));
        tokio::time::sleep(Duration::from_secs(16)).await;
        assert!(cache.is_empty());

        shutdown.cancel();
    }

    #[tokio::test]
    async fn clones_share_entries() {
        let cache = ResponseCache::default();
        let other = cache.clone();
        cache.set(key(3), json!(3));
        assert_eq!(other.get(&key(3)), Some(json!(3)));
    }
}
