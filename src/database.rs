//! Entry point tying the executor, configuration and shared cache together.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::join_all;

use bindery_core::{
    Config, DispatchMode, Error, Executor, PaginationInput, PaginationSettings, Record, Result,
    sql,
};

use crate::cache::QueryCache;
use crate::catalog::{Entity, Relation};
use crate::loader::{BatchKey, BatchLoader};
use crate::mapper::RecordMapper;

/// Long-lived handle shared by every request.
///
/// Holds the executor and the query cache. Batch loaders are *not* shared: each request
/// gets its own through [`Database::session`].
pub struct Database<E> {
    executor: Arc<E>,
    cache: Option<QueryCache>,
    config: Arc<Config>,
}

impl<E> Clone for Database<E> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            cache: self.cache.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<E> std::fmt::Debug for Database<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl<E: Executor> Database<E> {
    pub fn new(executor: E, config: Config) -> Self {
        Self::with_shared(Arc::new(executor), config)
    }

    /// Like [`new`](Self::new) for an executor the caller keeps a handle to.
    pub fn with_shared(executor: Arc<E>, config: Config) -> Self {
        let cache = config.cache.enabled.then(|| QueryCache::new(&config.cache));
        #[cfg(feature = "tracing")]
        tracing::debug!(
            dialect = %E::DIALECT,
            cache = config.cache.enabled,
            dispatch = ?config.loader.dispatch,
            "bindery.database"
        );
        Self {
            executor,
            cache,
            config: Arc::new(config),
        }
    }

    #[inline]
    pub fn executor(&self) -> &Arc<E> {
        &self.executor
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn cache(&self) -> Option<&QueryCache> {
        self.cache.as_ref()
    }

    pub fn mapper(&self, entity: Entity) -> RecordMapper<E> {
        RecordMapper::new(entity.config(), Arc::clone(&self.executor), self.config.pagination)
    }

    /// Fresh loaders for one request, all backed by the shared cache.
    pub fn session(&self) -> Session<E> {
        self.session_with(self.config.loader.dispatch)
    }

    pub fn session_with(&self, dispatch: DispatchMode) -> Session<E> {
        let loaders = Relation::ALL.map(|relation| {
            BatchLoader::new(
                relation.config(),
                Arc::clone(&self.executor),
                self.cache.clone(),
                dispatch,
            )
        });
        Session {
            loaders,
            pagination: self.config.pagination,
        }
    }

    /// Links a book to a theme and returns the book.
    pub async fn associate_theme(&self, book_id: i64, theme_id: i64) -> Result<Option<Record>> {
        let relation = Relation::BooksByTheme;
        let stmt = sql::insert_link(E::DIALECT, relation.config(), theme_id, book_id)
            .ok_or_else(|| Error::Mapping(format!("relation {relation} has no join table")))?;
        self.executor.execute(&stmt).await?;
        self.mapper(Entity::Book).find_by_key(book_id).await
    }
}

/// Per-request batching scope: one loader per relation.
pub struct Session<E> {
    loaders: [BatchLoader<E>; Relation::ALL.len()],
    pagination: PaginationSettings,
}

impl<E> std::fmt::Debug for Session<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("loaders", &self.loaders)
            .finish_non_exhaustive()
    }
}

impl<E: Executor> Session<E> {
    #[inline]
    pub fn loader(&self, relation: Relation) -> &BatchLoader<E> {
        &self.loaders[relation as usize]
    }

    /// Queues a children read for `parent_id` and returns its future.
    ///
    /// The raw pagination is normalized against the child entity's default order. An
    /// unknown order column fails this call alone and never joins the batch.
    pub fn load_children(
        &self,
        relation: Relation,
        parent_id: i64,
        pagination: Option<&PaginationInput>,
    ) -> impl Future<Output = Result<Vec<Record>>> + Send + use<E> {
        let spec = self
            .pagination
            .normalize(pagination, relation.child().default_order_by);
        let pending = relation
            .child()
            .column(&spec.order_by)
            .map(|_| self.loader(relation).load(BatchKey::new(parent_id, spec)));
        async move { pending?.await }
    }

    /// Flushes every loader that has pending keys, concurrently.
    pub async fn flush(&self) {
        join_all(self.loaders.iter().map(BatchLoader::flush)).await;
    }
}

/// Turns an absent record into [`Error::NotFound`].
pub fn ensure_found(record: Option<Record>, entity: Entity) -> Result<Record> {
    record.ok_or(Error::NotFound {
        entity: entity.config().name,
    })
}
