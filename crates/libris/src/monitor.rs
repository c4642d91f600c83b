//! SQL logging via `tracing`.
//!
//! [`TracingExecutor`] wraps any [`Executor`] and emits one event before each call (the SQL
//! that will run) and one after (elapsed time and row count). Bound values are never
//! logged, only their count.
//!
//! ```ignore
//! let exec = TracingExecutor::new(client).slow_threshold(Duration::from_millis(250));
//! let books = BookRepository::new(exec);
//! ```

use crate::dialect::Dialect;
use crate::error::{LibError, LibResult};
use crate::executor::{ExecResult, Executor};
use crate::query::Query;
use crate::record::Row;
use std::time::{Duration, Instant};
use tracing::Level;

const TARGET: &str = "libris.sql";

/// Truncate at a char boundary at or below `max_bytes`.
pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Dispatch a tracing event at a runtime-determined level.
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN => tracing::warn!($($field)*),
            Level::INFO => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

/// An executor wrapper that logs every query on target `libris.sql`.
#[derive(Debug, Clone)]
pub struct TracingExecutor<E> {
    inner: E,
    level: Level,
    max_sql_length: Option<usize>,
    slow_threshold: Option<Duration>,
}

impl<E> TracingExecutor<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            level: Level::DEBUG,
            max_sql_length: Some(200),
            slow_threshold: None,
        }
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display, in bytes.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Log calls slower than `threshold` at WARN.
    pub fn slow_threshold(mut self, threshold: Duration) -> Self {
        self.slow_threshold = Some(threshold);
        self
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn into_inner(self) -> E {
        self.inner
    }

    fn display_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }

    fn before(&self, query: &Query) {
        let sql = self.display_sql(query.sql());
        emit_at_level!(
            self.level,
            target: TARGET,
            kind = query.kind(),
            param_count = query.values().len(),
            sql = %sql,
            "executing"
        );
    }

    fn after(&self, query: &Query, elapsed: Duration, outcome: Result<u64, &LibError>) {
        let elapsed_ms = elapsed.as_millis() as u64;
        match outcome {
            Err(error) => tracing::warn!(
                target: TARGET,
                kind = query.kind(),
                elapsed_ms,
                error = %error,
                "query failed"
            ),
            Ok(rows) if self.slow_threshold.is_some_and(|t| elapsed >= t) => tracing::warn!(
                target: TARGET,
                kind = query.kind(),
                elapsed_ms,
                rows,
                sql = %self.display_sql(query.sql()),
                "slow query"
            ),
            Ok(rows) => emit_at_level!(
                self.level,
                target: TARGET,
                kind = query.kind(),
                elapsed_ms,
                rows,
                "done"
            ),
        }
    }
}

impl<E: Executor> Executor for TracingExecutor<E> {
    fn dialect(&self) -> Dialect {
        self.inner.dialect()
    }

    async fn fetch_all(&self, query: &Query) -> LibResult<Vec<Row>> {
        self.before(query);
        let start = Instant::now();
        let result = self.inner.fetch_all(query).await;
        self.after(
            query,
            start.elapsed(),
            result.as_ref().map(|rows| rows.len() as u64),
        );
        result
    }

    async fn execute(&self, query: &Query) -> LibResult<ExecResult> {
        self.before(query);
        let start = Instant::now();
        let result = self.inner.execute(query).await;
        self.after(
            query,
            start.elapsed(),
            result.as_ref().map(|r| r.rows_affected),
        );
        result
    }
}
