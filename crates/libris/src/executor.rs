//! The execution boundary.
//!
//! Generators only produce [`Query`] values; an [`Executor`] runs them against a connection.
//! Implementations own connection acquisition and transactions. Typed helpers
//! (`fetch_one_as`, `fetch_count`, ...) are provided on top of two required methods.

use crate::dialect::Dialect;
use crate::error::{LibError, LibResult};
use crate::query::Query;
use crate::record::{FromRow, Row};
use std::future::Future;

/// Outcome of a statement that returns no rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    /// Auto-increment id of the last inserted row, for drivers that report one.
    pub last_insert_id: Option<u64>,
}

impl ExecResult {
    pub fn affected(rows_affected: u64) -> Self {
        Self {
            rows_affected,
            last_insert_id: None,
        }
    }

    pub fn inserted(rows_affected: u64, last_insert_id: u64) -> Self {
        Self {
            rows_affected,
            last_insert_id: Some(last_insert_id),
        }
    }
}

/// Runs generated queries.
///
/// This allows repositories to accept a plain client, a transaction, a pooled connection,
/// or a wrapper such as [`TracingExecutor`](crate::TracingExecutor).
pub trait Executor: Send + Sync {
    /// Dialect this executor expects queries to be generated for.
    fn dialect(&self) -> Dialect;

    /// Run a query and return all rows.
    fn fetch_all(&self, query: &Query) -> impl Future<Output = LibResult<Vec<Row>>> + Send;

    /// Run a statement and report affected rows.
    fn execute(&self, query: &Query) -> impl Future<Output = LibResult<ExecResult>> + Send;

    /// First row, if any. Extra rows are ignored.
    fn fetch_optional(&self, query: &Query) -> impl Future<Output = LibResult<Option<Row>>> + Send {
        async move { Ok(self.fetch_all(query).await?.into_iter().next()) }
    }

    /// First row; [`LibError::NotFound`] when there is none.
    fn fetch_one(&self, query: &Query) -> impl Future<Output = LibResult<Row>> + Send {
        async move {
            self.fetch_optional(query)
                .await?
                .ok_or_else(|| LibError::not_found("Expected one row, got none"))
        }
    }

    fn fetch_all_as<T: FromRow + Send>(
        &self,
        query: &Query,
    ) -> impl Future<Output = LibResult<Vec<T>>> + Send {
        async move {
            let rows = self.fetch_all(query).await?;
            rows.iter().map(T::from_row).collect()
        }
    }

    fn fetch_optional_as<T: FromRow + Send>(
        &self,
        query: &Query,
    ) -> impl Future<Output = LibResult<Option<T>>> + Send {
        async move {
            match self.fetch_optional(query).await? {
                Some(row) => T::from_row(&row).map(Some),
                None => Ok(None),
            }
        }
    }

    fn fetch_one_as<T: FromRow + Send>(
        &self,
        query: &Query,
    ) -> impl Future<Output = LibResult<T>> + Send {
        async move {
            let row = self.fetch_one(query).await?;
            T::from_row(&row)
        }
    }

    /// Read the `count` column produced by a COUNT query.
    fn fetch_count(&self, query: &Query) -> impl Future<Output = LibResult<u64>> + Send {
        async move {
            let row = self.fetch_one(query).await?;
            let count: i64 = row.try_get("count")?;
            u64::try_from(count).map_err(|_| LibError::decode("count", "negative count"))
        }
    }
}

impl<E: Executor> Executor for &E {
    fn dialect(&self) -> Dialect {
        (**self).dialect()
    }

    fn fetch_all(&self, query: &Query) -> impl Future<Output = LibResult<Vec<Row>>> + Send {
        (**self).fetch_all(query)
    }

    fn execute(&self, query: &Query) -> impl Future<Output = LibResult<ExecResult>> + Send {
        (**self).execute(query)
    }
}

/// Reject a query generated for a different dialect than the executor speaks.
pub fn ensure_dialect(executor: Dialect, query: &Query) -> LibResult<()> {
    if query.dialect() == executor {
        Ok(())
    } else {
        Err(LibError::DialectMismatch {
            query: query.dialect().to_string(),
            executor: executor.to_string(),
        })
    }
}
