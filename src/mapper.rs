//! Single-row CRUD against any configured table.

use std::sync::Arc;

use bindery_core::{
    EntityConfig, Error, Executor, PaginationInput, PaginationSettings, Record, Result, sql,
};

use crate::catalog::Relation;

/// CRUD for one entity, parameterized by its [`EntityConfig`].
///
/// Every method issues exactly one statement straight to the executor. Reads here never
/// go through the query cache.
pub struct RecordMapper<E> {
    entity: &'static EntityConfig,
    executor: Arc<E>,
    pagination: PaginationSettings,
}

impl<E> Clone for RecordMapper<E> {
    fn clone(&self) -> Self {
        Self {
            entity: self.entity,
            executor: Arc::clone(&self.executor),
            pagination: self.pagination,
        }
    }
}

impl<E> std::fmt::Debug for RecordMapper<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordMapper")
            .field("table", &self.entity.table)
            .finish_non_exhaustive()
    }
}

impl<E: Executor> RecordMapper<E> {
    pub fn new(entity: &'static EntityConfig, executor: Arc<E>, pagination: PaginationSettings) -> Self {
        Self {
            entity,
            executor,
            pagination,
        }
    }

    #[inline]
    pub fn entity(&self) -> &'static EntityConfig {
        self.entity
    }

    /// The row with primary key `id`, or `None`.
    pub async fn find_by_key(&self, id: i64) -> Result<Option<Record>> {
        let stmt = sql::select_by_key(E::DIALECT, self.entity, id);
        Ok(self.executor.query(&stmt).await?.into_iter().next())
    }

    /// One page of the table. Ordering defaults to the entity's default column.
    pub async fn find_all(&self, pagination: Option<&PaginationInput>) -> Result<Vec<Record>> {
        let spec = self.pagination.normalize(pagination, self.entity.default_order_by);
        let stmt = sql::select_page(E::DIALECT, self.entity, &spec)?;
        self.executor.query(&stmt).await
    }

    /// Inserts exactly the columns present in `fields` and returns the stored row.
    pub async fn create(&self, fields: &Record) -> Result<Record> {
        let stmt = sql::insert(E::DIALECT, self.entity, fields)?;
        self.executor
            .query(&stmt)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Execution(format!("insert into {} returned no row", self.entity.table)))
    }

    /// Partial update; `None` when no row has this id.
    pub async fn update(&self, id: i64, fields: &Record) -> Result<Option<Record>> {
        let stmt = sql::update(E::DIALECT, self.entity, id, fields)?;
        Ok(self.executor.query(&stmt).await?.into_iter().next())
    }

    /// `true` iff exactly one row was removed.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let stmt = sql::delete(E::DIALECT, self.entity, id);
        Ok(self.executor.execute(&stmt).await? == 1)
    }

    /// Children of a single parent, without batching.
    ///
    /// `relation` must yield rows of this mapper's entity.
    pub async fn find_by_parent(
        &self,
        relation: Relation,
        parent_id: i64,
        pagination: Option<&PaginationInput>,
    ) -> Result<Vec<Record>> {
        let config = relation.config();
        if config.child != self.entity {
            return Err(Error::Mapping(format!(
                "relation {relation} yields {}, not {}",
                config.child.table, self.entity.table
            )));
        }
        let spec = self.pagination.normalize(pagination, self.entity.default_order_by);
        let stmt = sql::select_children(E::DIALECT, config, parent_id, &spec)?;
        self.executor.query(&stmt).await
    }
}
