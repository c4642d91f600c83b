//! Repositories: CRUD for the library tables on top of generated SQL.
//!
//! Each repository owns an [`Executor`] and builds every statement through a
//! [`QueryGenerator`] for the executor's dialect. Inserts use `RETURNING` where the dialect
//! has it and fall back to `last_insert_id` + re-select otherwise.

use crate::error::{LibError, LibResult};
use crate::executor::Executor;
use crate::filter::WhereExpr;
use crate::generator::QueryGenerator;
use crate::page::{Page, PageRequest};
use crate::record::{Column, FromRow, Record, Row};
use std::future::Future;

/// Debug event on target `libris::repository`; compiled out without the `tracing` feature.
macro_rules! repo_event {
    ($($field:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(target: "libris::repository", $($field)*);
    };
}
pub(crate) use repo_event;

/// Warning on target `libris::repository`, for failed compensations that leave copy counts off.
macro_rules! repo_warn {
    ($($field:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::warn!(target: "libris::repository", $($field)*);
    };
}
pub(crate) use repo_warn;

mod book;
mod loan;
mod member;

pub use book::BookRepository;
pub use loan::LoanRepository;
pub use member::MemberRepository;

/// CRUD over one table.
pub trait Repository: Send + Sync {
    type Item: Send;
    type New: Sync;
    type Patch: Sync;

    fn create(&self, data: &Self::New) -> impl Future<Output = LibResult<Self::Item>> + Send;

    /// Apply `patch` to the row with `id`; `None` when no such row exists.
    fn update(
        &self,
        id: i64,
        patch: &Self::Patch,
    ) -> impl Future<Output = LibResult<Option<Self::Item>>> + Send;

    /// Delete the row with `id` and return it as it was.
    fn delete(&self, id: i64) -> impl Future<Output = LibResult<Option<Self::Item>>> + Send;

    fn get_by_id(&self, id: i64) -> impl Future<Output = LibResult<Option<Self::Item>>> + Send;

    fn list(
        &self,
        req: &PageRequest,
    ) -> impl Future<Output = LibResult<Page<Self::Item>>> + Send;
}

/// Table access shared by the concrete repositories.
#[derive(Debug, Clone)]
pub(crate) struct Table<E> {
    pub(crate) exec: E,
    pub(crate) generator: QueryGenerator,
}

impl<E: Executor> Table<E> {
    pub(crate) fn new(exec: E) -> Self {
        let generator = QueryGenerator::new(exec.dialect());
        Self { exec, generator }
    }

    pub(crate) async fn find<T>(&self, id_column: Column<T>, id: i64) -> LibResult<Option<T>>
    where
        T: Record + FromRow + Send,
    {
        let query =
            self.generator
                .select(T::TABLE, &[], &WhereExpr::eq(id_column, id), 0, 1)?;
        self.exec.fetch_optional_as(&query).await
    }

    /// Insert one row and read it back.
    pub(crate) async fn insert<T>(&self, row: Row, id_column: Column<T>) -> LibResult<T>
    where
        T: Record + FromRow + Send,
    {
        let rows = [row];
        if self.generator.dialect().supports_returning() {
            let query = self.generator.insert_returning(T::TABLE, &rows, &[])?;
            return self.exec.fetch_one_as(&query).await;
        }

        let query = self.generator.insert(T::TABLE, &rows)?;
        let result = self.exec.execute(&query).await?;
        let id = result.last_insert_id.ok_or_else(|| {
            LibError::Other(format!("insert into {} reported no id", T::TABLE))
        })?;
        let id = i64::try_from(id)
            .map_err(|_| LibError::decode(id_column.name(), "inserted id out of range"))?;
        self.find(id_column, id)
            .await?
            .ok_or_else(|| LibError::not_found(format!("{} {id} vanished after insert", T::TABLE)))
    }

    /// `UPDATE ... WHERE filter`; returns the number of rows changed.
    pub(crate) async fn update_where<T: Record>(
        &self,
        set: &Row,
        filter: &WhereExpr<T>,
    ) -> LibResult<u64> {
        let query = self.generator.update(T::TABLE, set, filter)?;
        Ok(self.exec.execute(&query).await?.rows_affected)
    }

    /// Update by id, then re-read. An empty `set` only re-reads.
    pub(crate) async fn update_by_id<T>(
        &self,
        id_column: Column<T>,
        id: i64,
        set: &Row,
    ) -> LibResult<Option<T>>
    where
        T: Record + FromRow + Send,
    {
        if set.is_empty() {
            return self.find(id_column, id).await;
        }
        let Some(current) = self.find(id_column, id).await? else {
            return Ok(None);
        };
        // MySQL reports 0 affected rows for a no-op update, so existence is checked first.
        if self
            .update_where(set, &WhereExpr::eq(id_column, id))
            .await?
            == 0
        {
            return Ok(Some(current));
        }
        self.find(id_column, id).await
    }

    pub(crate) async fn delete_by_id<T>(&self, id_column: Column<T>, id: i64) -> LibResult<Option<T>>
    where
        T: Record + FromRow + Send,
    {
        let Some(current) = self.find(id_column, id).await? else {
            return Ok(None);
        };
        let query = self
            .generator
            .delete(T::TABLE, &WhereExpr::eq(id_column, id))?;
        match self.exec.execute(&query).await?.rows_affected {
            0 => Ok(None),
            _ => Ok(Some(current)),
        }
    }

    /// COUNT, then one LIMIT/OFFSET window.
    pub(crate) async fn page<T>(&self, filter: &WhereExpr<T>, req: &PageRequest) -> LibResult<Page<T>>
    where
        T: Record + FromRow + Send,
    {
        req.validate()?;
        let count = self.generator.count(T::TABLE, Some(filter))?;
        let total = self.exec.fetch_count(&count).await?;
        if total <= req.offset {
            return Ok(Page::new(Vec::new(), req, total));
        }
        let select = self.generator.select_page(T::TABLE, &[], filter, req)?;
        let items = self.exec.fetch_all_as(&select).await?;
        Ok(Page::new(items, req, total))
    }
}
