//! Concurrent logical path → resolved asset cache.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::index::AssetEntry;

/// Hit/miss counters and size of a [`ResolutionCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that ran the resolver.
    pub misses: u64,
    /// Stored entries.
    pub entries: usize,
}

/// Caches successful resolutions for the life of the process.
///
/// On a miss the resolver runs without any lock held, so concurrent first
/// requests for one key may each resolve it; the first insert wins and every
/// caller gets the stored value. Failed resolutions are never stored.
///
/// # Example
///
/// ```rust
/// use webjars_core::ResolutionCache;
///
/// let cache: ResolutionCache<String> = ResolutionCache::new();
/// let first = cache.get_or_resolve("/a.js", || Ok::<_, ()>("lib/1.0/a.js".to_string()));
/// let second = cache.get_or_resolve("/a.js", || Err(()));
/// assert_eq!(first, second);
/// assert_eq!(cache.stats().hits, 1);
/// ```
#[derive(Debug)]
pub struct ResolutionCache<V = Arc<AssetEntry>> {
    entries: DashMap<String, V>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V> Default for ResolutionCache<V> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }
}

impl<V: Clone> ResolutionCache<V> {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `key`, or runs `resolve` and stores its
    /// result if absent.
    pub fn get_or_resolve<F, E>(&self, key: &str, resolve: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        self.lookup(key, resolve).map(|(value, _)| value)
    }

    /// Like [`get_or_resolve`](Self::get_or_resolve), also reporting whether
    /// the value came from the cache.
    pub fn lookup<F, E>(&self, key: &str, resolve: F) -> Result<(V, bool), E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(cached) = self.entries.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            webjars_telemetry::metrics::record_cache_lookup(true);
            return Ok((cached.value().clone(), true));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        webjars_telemetry::metrics::record_cache_lookup(false);

        let resolved = resolve()?;
        let stored = self.entries.entry(key.to_string()).or_insert(resolved);
        Ok((stored.value().clone(), false))
    }

    /// Returns the cached value without resolving.
    pub fn get(&self, key: &str) -> Option<V> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Barrier;

    #[test]
    fn test_lookup_reports_hits() {
        let cache: ResolutionCache<&str> = ResolutionCache::new();
        assert_eq!(cache.lookup("k", || Ok::<_, ()>("v")), Ok(("v", false)));
        assert_eq!(cache.lookup("k", || Err(())), Ok(("v", true)));
        assert_eq!(cache.lookup("other", || Err::<&str, _>(())), Err(()));
    }

    #[test]
    fn test_hit_skips_resolver() {
        let cache: ResolutionCache<u32> = ResolutionCache::new();
        assert_eq!(cache.get_or_resolve("k", || Ok::<_, ()>(1)), Ok(1));
        let value = cache.get_or_resolve("k", || -> Result<u32, ()> {
            panic!("resolver must not run on a hit")
        });
        assert_eq!(value, Ok(1));
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                entries: 1
            }
        );
    }

    #[test]
    fn test_failures_are_not_cached() {
        let cache: ResolutionCache<u32> = ResolutionCache::new();
        let calls = AtomicUsize::new(0);
        for _ in 0..3 {
            let result = cache.get_or_resolve("missing", || {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>("not found")
            });
            assert_eq!(result, Err("not found"));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(cache.is_empty());
        assert_eq!(cache.get("missing"), None);
    }

    #[test]
    fn test_concurrent_first_requests_converge() {
        const THREADS: usize = 16;
        let cache: ResolutionCache<usize> = ResolutionCache::new();
        let barrier = Barrier::new(THREADS);

        let results: Vec<usize> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|id| {
                    let cache = &cache;
                    let barrier = &barrier;
                    scope.spawn(move || {
                        barrier.wait();
                        // each thread proposes a different value; only one may stick
                        cache.get_or_resolve("/race.js", || Ok::<_, ()>(id)).unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let stored = cache.get("/race.js").unwrap();
        assert!(results.iter().all(|&v| v == stored));
        assert_eq!(cache.len(), 1);
        let stats = cache.stats();
        assert_eq!(stats.hits + stats.misses, THREADS as u64);
    }

    #[test]
    fn test_concurrent_failures_stay_consistent() {
        let cache: ResolutionCache<usize> = ResolutionCache::new();
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    let result = cache.get_or_resolve("/none.js", || Err::<usize, _>("nope"));
                    assert_eq!(result, Err("nope"));
                });
            }
        });
        assert!(cache.is_empty());
    }
}
