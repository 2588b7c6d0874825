//! Handle cache keyed by connection-profile identity.
//!
//! Successful connections are memoized for a bounded time window so that
//! re-submitting the same form within a session does not reconnect. The
//! cache is owned by the session and passed explicitly; there is no
//! ambient global. Identity covers the backend variant and every
//! credential field, so changing any single field is a miss.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::db::{self, DatabaseHandle};
use crate::error::Result;
use crate::profile::ConnectionProfile;

/// How long a cached handle may be reused.
pub const HANDLE_TTL: Duration = Duration::from_secs(2 * 60 * 60);

struct CacheEntry {
    handle: Arc<dyn DatabaseHandle>,
    created_at: Instant,
}

/// In-process cache of live database handles.
pub struct HandleCache {
    entries: HashMap<ConnectionProfile, CacheEntry>,
    ttl: Duration,
}

impl HandleCache {
    /// Creates a cache with the default 2 hour TTL.
    pub fn new() -> Self {
        Self::with_ttl(HANDLE_TTL)
    }

    /// Creates a cache with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    /// Returns the cached handle for `profile` if it is still fresh at `now`.
    pub fn lookup(&self, profile: &ConnectionProfile, now: Instant) -> Option<Arc<dyn DatabaseHandle>> {
        self.entries.get(profile).and_then(|entry| {
            if now.duration_since(entry.created_at) < self.ttl {
                Some(Arc::clone(&entry.handle))
            } else {
                None
            }
        })
    }

    /// Stores a handle for `profile`, replacing any previous entry.
    pub fn store(&mut self, profile: ConnectionProfile, handle: Arc<dyn DatabaseHandle>, now: Instant) {
        self.entries.insert(
            profile,
            CacheEntry {
                handle,
                created_at: now,
            },
        );
    }

    /// Returns a handle for `profile`, reusing a fresh cached one or
    /// connecting anew.
    ///
    /// An expired entry is closed before the fresh connection replaces it.
    pub async fn get_or_connect(&mut self, profile: &ConnectionProfile) -> Result<Arc<dyn DatabaseHandle>> {
        let now = Instant::now();

        if let Some(handle) = self.lookup(profile, now) {
            debug!(backend = profile.kind().as_str(), "reusing cached handle");
            return Ok(handle);
        }

        if let Some(stale) = self.entries.remove(profile) {
            debug!(backend = profile.kind().as_str(), "closing expired handle");
            stale.handle.close().await;
        }

        let handle = db::connect(profile).await?;
        self.store(profile.clone(), Arc::clone(&handle), now);
        Ok(handle)
    }

    /// Number of cached entries, fresh or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for HandleCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockHandle;
    use crate::profile::{ConnectionProfile, DatabaseKind, RemoteFields};

    fn profile(password: &str) -> ConnectionProfile {
        let fields = RemoteFields {
            host: "db.example.com".to_string(),
            user: "reader".to_string(),
            password: password.to_string(),
            database: "students".to_string(),
        };
        ConnectionProfile::resolve(DatabaseKind::Postgres, &fields, None).unwrap()
    }

    #[test]
    fn test_fresh_entry_is_reused() {
        let mut cache = HandleCache::with_ttl(Duration::from_secs(10));
        let handle: Arc<dyn DatabaseHandle> = Arc::new(MockHandle::new());
        let t0 = Instant::now();

        cache.store(profile("pw"), Arc::clone(&handle), t0);

        let hit = cache.lookup(&profile("pw"), t0 + Duration::from_secs(5)).unwrap();
        assert!(Arc::ptr_eq(&hit, &handle));
    }

    #[test]
    fn test_expired_entry_is_a_miss() {
        let mut cache = HandleCache::with_ttl(Duration::from_secs(10));
        let handle: Arc<dyn DatabaseHandle> = Arc::new(MockHandle::new());
        let t0 = Instant::now();

        cache.store(profile("pw"), handle, t0);

        assert!(cache.lookup(&profile("pw"), t0 + Duration::from_secs(11)).is_none());
        // The stale entry is still present until replaced
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_any_changed_field_is_a_miss() {
        let mut cache = HandleCache::with_ttl(Duration::from_secs(10));
        let handle: Arc<dyn DatabaseHandle> = Arc::new(MockHandle::new());
        let t0 = Instant::now();

        cache.store(profile("pw"), handle, t0);

        assert!(cache.lookup(&profile("other"), t0).is_none());
    }

    #[test]
    fn test_distinct_profiles_coexist() {
        let mut cache = HandleCache::with_ttl(Duration::from_secs(10));
        let a: Arc<dyn DatabaseHandle> = Arc::new(MockHandle::new());
        let b: Arc<dyn DatabaseHandle> = Arc::new(MockHandle::new());
        let t0 = Instant::now();

        cache.store(profile("a"), Arc::clone(&a), t0);
        cache.store(profile("b"), Arc::clone(&b), t0);

        assert_eq!(cache.len(), 2);
        assert!(Arc::ptr_eq(&cache.lookup(&profile("a"), t0).unwrap(), &a));
        assert!(Arc::ptr_eq(&cache.lookup(&profile("b"), t0).unwrap(), &b));
    }

    #[tokio::test]
    async fn test_get_or_connect_local_roundtrip() {
        use sqlx::sqlite::SqliteConnectOptions;
        use sqlx::SqlitePool;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("student.db");
        let pool = SqlitePool::connect_with(
            SqliteConnectOptions::new()
                .filename(&path)
                .create_if_missing(true),
        )
        .await
        .unwrap();
        sqlx::query("CREATE TABLE student (name TEXT)")
            .execute(&pool)
            .await
            .unwrap();
        pool.close().await;

        let local = ConnectionProfile::Local { path };
        let mut cache = HandleCache::new();

        let first = cache.get_or_connect(&local).await.unwrap();
        let second = cache.get_or_connect(&local).await.unwrap();

        // Same Arc back within the TTL window, no second connection
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }
}
