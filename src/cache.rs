//! Shared result cache for batched relation reads.

use std::future::Future;
use std::sync::Arc;

use bindery_core::config::CacheSettings;
use bindery_core::{Error, Fingerprint, Record, Result};
use moka::future::Cache;

/// Rows of one executed statement, keyed by its [`Fingerprint`].
///
/// Entries expire after a fixed TTL and nothing else invalidates them, so a write is
/// visible to batched reads at the latest one TTL later. Concurrent misses on the same
/// fingerprint share a single computation, and failures are never stored.
#[derive(Clone)]
pub struct QueryCache {
    cache: Cache<Fingerprint, Arc<[Record]>>,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

impl QueryCache {
    pub fn new(settings: &CacheSettings) -> Self {
        let cache = Cache::builder()
            .max_capacity(settings.max_entries)
            .time_to_live(settings.ttl())
            .build();
        Self { cache }
    }

    /// Returns the cached rows for `fingerprint`, running `compute` on a miss.
    pub async fn get_or_compute<F>(&self, fingerprint: Fingerprint, compute: F) -> Result<Arc<[Record]>>
    where
        F: Future<Output = Result<Vec<Record>>>,
    {
        if let Some(rows) = self.cache.get(&fingerprint).await {
            #[cfg(feature = "tracing")]
            tracing::trace!(%fingerprint, rows = rows.len(), "bindery.cache.hit");
            return Ok(rows);
        }

        self.cache
            .try_get_with(fingerprint, async {
                #[cfg(feature = "tracing")]
                tracing::trace!(%fingerprint, "bindery.cache.miss");
                compute.await.map(Arc::from)
            })
            .await
            .map_err(|e: Arc<Error>| (*e).clone())
    }

    /// Number of live entries. Approximate until pending maintenance has run.
    #[inline]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindery_core::Statement;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fingerprint(sql: &str) -> Fingerprint {
        Statement {
            sql: sql.into(),
            params: vec![],
        }
        .fingerprint()
    }

    #[tokio::test]
    async fn hit_skips_compute() {
        let cache = QueryCache::new(&CacheSettings::default());
        let runs = AtomicUsize::new(0);
        let key = fingerprint("SELECT 1");

        for _ in 0..2 {
            let rows = cache
                .get_or_compute(key, async {
                    runs.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![Record::new().with("id", 1)])
                })
                .await
                .unwrap();
            assert_eq!(rows.len(), 1);
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache = QueryCache::new(&CacheSettings::default());
        let key = fingerprint("SELECT 2");

        let err = cache
            .get_or_compute(key, async { Err(Error::Execution("boom".into())) })
            .await
            .unwrap_err();
        assert_eq!(err, Error::Execution("boom".into()));

        let rows = cache
            .get_or_compute(key, async { Ok(vec![]) })
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn concurrent_misses_share_one_computation() {
        let cache = QueryCache::new(&CacheSettings::default());
        let runs = &AtomicUsize::new(0);
        let key = fingerprint("SELECT 3");
        let compute = || async move {
            runs.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            Ok(vec![Record::new()])
        };

        let (a, b) = tokio::join!(
            cache.get_or_compute(key, compute()),
            cache.get_or_compute(key, compute())
        );
        assert_eq!(a.unwrap().len(), 1);
        assert_eq!(b.unwrap().len(), 1);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}
