//! Per-relation batch coalescing.
//!
//! A [`BatchLoader`] collects keyed loads for one relation, runs a single windowed
//! statement for all of them at the flush boundary, and hands each caller the slice of
//! rows belonging to its parent.
//!
//! Registration happens when [`BatchLoader::load`] is *called*, not when the returned
//! future is first polled, so every load issued before the boundary lands in the same
//! batch:
//!
//! ```no_run
//! # use bindery::{BatchKey, BatchLoader, DispatchMode, PaginationSpec, Relation};
//! # async fn run<E: bindery::Executor>(executor: std::sync::Arc<E>, spec: PaginationSpec) {
//! let loader = BatchLoader::new(Relation::BooksByAuthor.config(), executor, None, DispatchMode::Auto);
//! let a = loader.load(BatchKey::new(1, spec.clone()));
//! let b = loader.load(BatchKey::new(2, spec));
//! // one statement for both parents
//! let (a, b) = futures_util::future::join(a, b).await;
//! # }
//! ```

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bindery_core::sql::{self, PARENT_KEY};
use bindery_core::{
    DispatchMode, Error, Executor, PaginationSpec, Record, RelationConfig, Result,
};
use hashbrown::HashMap;
use tokio::sync::oneshot;

use crate::cache::QueryCache;
use crate::index::RelationIndex;

/// One load request: a parent and the (already normalized) page of its children.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BatchKey {
    pub parent_id: i64,
    pub pagination: PaginationSpec,
}

impl BatchKey {
    #[inline]
    pub const fn new(parent_id: i64, pagination: PaginationSpec) -> Self {
        Self {
            parent_id,
            pagination,
        }
    }
}

type Reply = oneshot::Sender<Result<Vec<Record>>>;

/// A distinct key of the open batch and everyone waiting on it.
struct Entry {
    key: BatchKey,
    waiters: Vec<Reply>,
}

#[derive(Default)]
struct Batch {
    /// Bumped every time the batch is taken for flushing.
    generation: u64,
    entries: Vec<Entry>,
    positions: HashMap<BatchKey, usize>,
}

impl Batch {
    fn register(&mut self, key: BatchKey, reply: Reply) -> u64 {
        match self.positions.get(&key) {
            Some(&pos) => self.entries[pos].waiters.push(reply),
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push(Entry {
                    key,
                    waiters: vec![reply],
                });
            }
        }
        self.generation
    }

    fn waiting(&self) -> usize {
        self.entries.iter().map(|e| e.waiters.len()).sum()
    }
}

struct Shared<E> {
    relation: &'static RelationConfig,
    executor: Arc<E>,
    cache: Option<QueryCache>,
    dispatch: DispatchMode,
    batch: Mutex<Batch>,
}

/// Coalesces loads of one relation into windowed batch reads.
///
/// Cheap to clone; clones share the open batch.
pub struct BatchLoader<E> {
    shared: Arc<Shared<E>>,
}

impl<E> Clone for BatchLoader<E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<E> std::fmt::Debug for BatchLoader<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchLoader")
            .field("relation", &self.shared.relation.name)
            .field("dispatch", &self.shared.dispatch)
            .field("cached", &self.shared.cache.is_some())
            .finish_non_exhaustive()
    }
}

impl<E: Executor> BatchLoader<E> {
    pub fn new(
        relation: &'static RelationConfig,
        executor: Arc<E>,
        cache: Option<QueryCache>,
        dispatch: DispatchMode,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                relation,
                executor,
                cache,
                dispatch,
                batch: Mutex::new(Batch::default()),
            }),
        }
    }

    #[inline]
    pub fn relation(&self) -> &'static RelationConfig {
        self.shared.relation
    }

    /// Registers `key` in the open batch and returns a future for its rows.
    ///
    /// Identical keys in one batch share a single slot. The future resolves to an empty
    /// `Vec` when the parent has no children. With [`DispatchMode::Manual`] it stays
    /// pending until [`flush`](Self::flush) runs.
    pub fn load(&self, key: BatchKey) -> impl Future<Output = Result<Vec<Record>>> + Send + use<E> {
        let (tx, rx) = oneshot::channel();
        let generation = self.shared.lock().register(key, tx);
        let shared = Arc::clone(&self.shared);

        async move {
            if shared.dispatch == DispatchMode::Auto {
                // let the rest of this wave register first
                tokio::task::yield_now().await;
                Shared::dispatch(&shared, Some(generation));
            }
            rx.await.unwrap_or(Err(Error::Canceled))
        }
    }

    /// Flushes the open batch and waits until every waiter of it has been answered.
    ///
    /// A no-op when nothing is pending.
    pub async fn flush(&self) {
        if let Some(handle) = Shared::dispatch(&self.shared, None) {
            // a panicked flush drops its senders, which waiters observe as `Canceled`
            let _ = handle.await;
        }
    }

    /// Number of waiters registered in the open batch.
    pub fn pending(&self) -> usize {
        self.shared.lock().waiting()
    }
}

impl<E: Executor> Shared<E> {
    fn lock(&self) -> MutexGuard<'_, Batch> {
        self.batch.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes the open batch if it is non-empty and, when `generation` is given, still
    /// the one the caller registered in.
    fn take(&self, generation: Option<u64>) -> Option<Vec<Entry>> {
        let mut batch = self.lock();
        if batch.entries.is_empty() || generation.is_some_and(|g| g != batch.generation) {
            return None;
        }
        batch.generation = batch.generation.wrapping_add(1);
        batch.positions.clear();
        Some(std::mem::take(&mut batch.entries))
    }

    /// Starts resolving the open batch on its own task, so dropping the caller that
    /// triggered it does not starve the other waiters.
    fn dispatch(this: &Arc<Self>, generation: Option<u64>) -> Option<tokio::task::JoinHandle<()>> {
        let entries = this.take(generation)?;
        let shared = Arc::clone(this);
        Some(tokio::spawn(async move { shared.resolve(entries).await }))
    }

    async fn resolve(&self, entries: Vec<Entry>) {
        match self.run(&entries).await {
            Ok(index) => {
                for entry in entries {
                    let rows = index.get(entry.key.parent_id);
                    for waiter in entry.waiters {
                        let _ = waiter.send(Ok(rows.to_vec()));
                    }
                }
            }
            Err(error) => {
                #[cfg(feature = "tracing")]
                tracing::error!(relation = self.relation.name, %error, "bindery.batch.failed");
                for waiter in entries.into_iter().flat_map(|e| e.waiters) {
                    let _ = waiter.send(Err(error.clone()));
                }
            }
        }
    }

    async fn run(&self, entries: &[Entry]) -> Result<RelationIndex> {
        let Some(first) = entries.first() else {
            return Ok(RelationIndex::default());
        };
        // the first key's page applies to the whole batch
        let pagination = &first.key.pagination;
        let divergent = entries
            .iter()
            .filter(|e| e.key.pagination != *pagination)
            .count();
        if divergent > 0 {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                relation = self.relation.name,
                divergent,
                applied = ?pagination,
                "PartitionMismatch: batch mixes pagination, applying the first key's"
            );
        }

        let mut parent_ids: Vec<i64> = entries.iter().map(|e| e.key.parent_id).collect();
        parent_ids.sort_unstable();
        parent_ids.dedup();
        bindery_core::bindery_trace_batch!(self.relation.name, entries.len(), parent_ids.len());

        let stmt = sql::select_children_windowed(E::DIALECT, self.relation, &parent_ids, pagination)?;
        let rows = match &self.cache {
            Some(cache) => cache
                .get_or_compute(stmt.fingerprint(), async { self.executor.query(&stmt).await })
                .await?
                .to_vec(),
            None => self.executor.query(&stmt).await?,
        };
        Ok(RelationIndex::build(rows, PARENT_KEY))
    }
}
