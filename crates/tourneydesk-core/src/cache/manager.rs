use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::stats::{CacheStats, CacheStatsSnapshot};
use crate::models::EntityKind;

/// Default freshness window when none is configured
const DEFAULT_STALE_MINUTES: i64 = 5;

/// Logical cache key: a resource name plus an optional sub-key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    resource: String,
    scope: Option<String>,
}

impl QueryKey {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            scope: None,
        }
    }

    pub fn scoped(resource: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            scope: Some(scope.into()),
        }
    }

    /// The whole collection of an entity kind
    pub fn all(kind: EntityKind) -> Self {
        Self::new(kind.resource())
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope {
            Some(ref scope) => write!(f, "{}:{}", self.resource, scope),
            None => f.write_str(&self.resource),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QueryOptions {
    pub stale_after: Duration,
    /// Skip the cache lookup and always fetch
    pub force_refresh: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stale_after: Duration::minutes(DEFAULT_STALE_MINUTES),
            force_refresh: false,
        }
    }
}

impl QueryOptions {
    pub fn fresh_for(stale_after: Duration) -> Self {
        Self {
            stale_after,
            force_refresh: false,
        }
    }

    pub fn force(mut self) -> Self {
        self.force_refresh = true;
        self
    }
}

/// A cached value with the time it was stored.
#[derive(Debug, Clone)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
    pub invalidated: bool,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
            invalidated: false,
        }
    }

    pub fn age(&self) -> Duration {
        Utc::now() - self.cached_at
    }

    pub fn is_stale(&self, stale_after: Duration) -> bool {
        self.invalidated || self.age() > stale_after
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age().num_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }
}

type Slot = CachedData<Arc<dyn Any + Send + Sync>>;

/// In-memory query cache keyed by [`QueryKey`].
///
/// Clone is cheap; clones share the same entries.
#[derive(Clone)]
pub struct QueryCache {
    entries: Arc<RwLock<HashMap<QueryKey, Slot>>>,
    stats: Arc<CacheStats>,
    defaults: QueryOptions,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(Duration::minutes(DEFAULT_STALE_MINUTES))
    }
}

impl QueryCache {
    pub fn new(stale_after: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            stats: Arc::new(CacheStats::default()),
            defaults: QueryOptions::fresh_for(stale_after),
        }
    }

    /// Options carrying the configured freshness window
    pub fn options(&self) -> QueryOptions {
        self.defaults
    }

    /// Return the cached value for `key` if fresh, otherwise run `fetcher`
    /// and store its result.
    ///
    /// A failed fetch leaves any previous entry in place.
    pub async fn get<T, E, F, Fut>(&self, key: &QueryKey, options: QueryOptions, fetcher: F) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        E: fmt::Display,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !options.force_refresh {
            if let Some(value) = self.fresh::<T>(key, options.stale_after).await {
                self.stats.record_hit();
                debug!(key = %key, "Cache hit");
                return Ok(value);
            }
        }

        self.stats.record_miss();
        debug!(key = %key, forced = options.force_refresh, "Cache miss, fetching");

        match fetcher().await {
            Ok(value) => {
                self.insert(key.clone(), value.clone()).await;
                Ok(value)
            }
            Err(e) => {
                self.stats.record_fetch_error();
                warn!(key = %key, error = %e, "Fetch failed, keeping previous cache entry");
                Err(e)
            }
        }
    }

    async fn fresh<T: Clone + 'static>(&self, key: &QueryKey, stale_after: Duration) -> Option<T> {
        let entries = self.entries.read().await;
        let slot = entries.get(key)?;
        if slot.is_stale(stale_after) {
            return None;
        }
        let value = slot.data.downcast_ref::<T>();
        if value.is_none() {
            debug!(key = %key, "Cached value has a different type, treating as miss");
        }
        value.cloned()
    }

    /// The stored entry for `key`, fresh or not
    pub async fn peek<T: Clone + 'static>(&self, key: &QueryKey) -> Option<CachedData<T>> {
        let entries = self.entries.read().await;
        let slot = entries.get(key)?;
        let data = slot.data.downcast_ref::<T>()?.clone();
        Some(CachedData {
            data,
            cached_at: slot.cached_at,
            invalidated: slot.invalidated,
        })
    }

    pub async fn insert<T: Send + Sync + 'static>(&self, key: QueryKey, value: T) {
        let data: Arc<dyn Any + Send + Sync> = Arc::new(value);
        self.entries.write().await.insert(key, CachedData::new(data));
    }

    /// Mark one entry stale. Returns whether the key was present.
    pub async fn invalidate(&self, key: &QueryKey) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get_mut(key) {
            Some(slot) => {
                slot.invalidated = true;
                self.stats.record_invalidations(1);
                true
            }
            None => false,
        }
    }

    /// Mark every entry of `resource` stale, whatever its scope
    pub async fn invalidate_resource(&self, resource: &str) -> usize {
        let mut entries = self.entries.write().await;
        let mut count = 0;
        for (key, slot) in entries.iter_mut() {
            if key.resource == resource {
                slot.invalidated = true;
                count += 1;
            }
        }
        self.stats.record_invalidations(count as u64);
        count
    }

    /// Mark stale every resource derived from `kind`
    pub async fn invalidate_entity(&self, kind: EntityKind) -> usize {
        let mut count = 0;
        for resource in kind.dependent_resources() {
            count += self.invalidate_resource(resource).await;
        }
        debug!(kind = %kind, entries = count, "Invalidated dependent cache entries");
        count
    }

    pub async fn entry_age(&self, key: &QueryKey) -> Option<String> {
        let entries = self.entries.read().await;
        entries.get(key).map(|slot| slot.age_display())
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop every entry
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    #[cfg(test)]
    async fn backdate(&self, key: &QueryKey, by: Duration) {
        if let Some(slot) = self.entries.write().await.get_mut(key) {
            slot.cached_at = slot.cached_at - by;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn fetch_counted(calls: &AtomicUsize, value: Vec<u32>) -> Result<Vec<u32>, String> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    }

    #[test]
    fn test_cached_data_age_display() {
        let mut cached = CachedData::new(vec![1, 2, 3]);
        assert_eq!(cached.age_display(), "just now");
        cached.cached_at = Utc::now() - Duration::minutes(5);
        assert_eq!(cached.age_display(), "5m ago");
        cached.cached_at = Utc::now() - Duration::minutes(95);
        assert_eq!(cached.age_display(), "2h ago");
        cached.cached_at = Utc::now() - Duration::hours(50);
        assert_eq!(cached.age_display(), "2d ago");
    }

    #[test]
    fn test_query_key_display() {
        assert_eq!(QueryKey::new("teams").to_string(), "teams");
        assert_eq!(QueryKey::scoped("matches", "c1").to_string(), "matches:c1");
        assert_eq!(QueryKey::all(EntityKind::ParticipantStatistic).resource(), "participant-stats");
    }

    #[tokio::test]
    async fn test_get_returns_cached_value_while_fresh() {
        let cache = QueryCache::default();
        let key = QueryKey::new("teams");
        let calls = AtomicUsize::new(0);

        let first = cache
            .get(&key, cache.options(), || fetch_counted(&calls, vec![1]))
            .await
            .unwrap();
        let second = cache
            .get(&key, cache.options(), || fetch_counted(&calls, vec![2]))
            .await
            .unwrap();

        assert_eq!(first, vec![1]);
        assert_eq!(second, vec![1]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 1);
    }

    #[tokio::test]
    async fn test_stale_entry_is_refetched() {
        let cache = QueryCache::new(Duration::minutes(5));
        let key = QueryKey::new("teams");
        let calls = AtomicUsize::new(0);

        cache
            .get(&key, cache.options(), || fetch_counted(&calls, vec![1]))
            .await
            .unwrap();
        cache.backdate(&key, Duration::minutes(6)).await;

        let value = cache
            .get(&key, cache.options(), || fetch_counted(&calls, vec![2]))
            .await
            .unwrap();
        assert_eq!(value, vec![2]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let cache = QueryCache::default();
        let key = QueryKey::new("matches");
        cache.insert(key.clone(), vec![1u32]).await;

        assert!(cache.invalidate(&key).await);
        assert!(!cache.invalidate(&QueryKey::new("missing")).await);

        let value = cache
            .get(&key, cache.options(), || async { Ok::<_, String>(vec![9u32]) })
            .await
            .unwrap();
        assert_eq!(value, vec![9]);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_value() {
        let cache = QueryCache::default();
        let key = QueryKey::new("teams");
        cache.insert(key.clone(), vec![1u32]).await;
        cache.invalidate(&key).await;

        let result = cache
            .get(&key, cache.options(), || async { Err::<Vec<u32>, _>("offline".to_string()) })
            .await;
        assert_eq!(result.unwrap_err(), "offline");

        let kept = cache.peek::<Vec<u32>>(&key).await.unwrap();
        assert_eq!(kept.data, vec![1]);
        assert!(kept.invalidated);
        assert_eq!(cache.stats().fetch_errors, 1);
    }

    #[tokio::test]
    async fn test_invalidate_resource_covers_all_scopes() {
        let cache = QueryCache::default();
        cache.insert(QueryKey::new("matches"), 1u8).await;
        cache.insert(QueryKey::scoped("matches", "c1"), 2u8).await;
        cache.insert(QueryKey::new("teams"), 3u8).await;

        assert_eq!(cache.invalidate_resource("matches").await, 2);
        assert!(!cache.peek::<u8>(&QueryKey::new("teams")).await.unwrap().invalidated);
    }

    #[tokio::test]
    async fn test_invalidate_entity_uses_dependents() {
        let cache = QueryCache::default();
        cache.insert(QueryKey::new("matches"), 1u8).await;
        cache.insert(QueryKey::new("player-stats"), 2u8).await;
        cache.insert(QueryKey::new("users"), 3u8).await;

        assert_eq!(cache.invalidate_entity(EntityKind::Match).await, 2);
        assert!(!cache.peek::<u8>(&QueryKey::new("users")).await.unwrap().invalidated);
    }

    #[tokio::test]
    async fn test_force_refresh_bypasses_cache() {
        let cache = QueryCache::default();
        let key = QueryKey::new("users");
        cache.insert(key.clone(), 1u8).await;
        let value = cache
            .get(&key, cache.options().force(), || async { Ok::<_, String>(2u8) })
            .await
            .unwrap();
        assert_eq!(value, 2);
    }

    #[tokio::test]
    async fn test_type_mismatch_is_a_miss() {
        let cache = QueryCache::default();
        let key = QueryKey::new("teams");
        cache.insert(key.clone(), "text".to_string()).await;
        let value = cache
            .get(&key, cache.options(), || async { Ok::<_, String>(5u32) })
            .await
            .unwrap();
        assert_eq!(value, 5);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = QueryCache::default();
        cache.insert(QueryKey::new("teams"), 1u8).await;
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.entry_age(&QueryKey::new("teams")).await.as_deref(), Some("just now"));
        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}
