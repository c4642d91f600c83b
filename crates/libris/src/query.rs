//! Generator output: SQL text plus ordered bound values.

use crate::dialect::Dialect;
use crate::value::Value;
use std::fmt;

/// A generated statement ready to hand to an [`Executor`](crate::Executor).
///
/// The k-th placeholder in [`sql`](Self::sql) binds `values()[k - 1]`.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "a Query does nothing until it is executed"]
pub struct Query {
    sql: String,
    values: Vec<Value>,
    dialect: Dialect,
}

impl Query {
    pub(crate) fn new(sql: String, values: Vec<Value>, dialect: Dialect) -> Self {
        Self {
            sql,
            values,
            dialect,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.values)
    }

    /// Number of placeholders in the SQL text; always equals `values().len()`.
    pub fn placeholder_count(&self) -> usize {
        self.dialect.count_placeholders(&self.sql)
    }

    /// Leading keyword, lower-cased (`select`, `insert`, ...).
    pub fn kind(&self) -> &'static str {
        let head = self.sql.trim_start();
        let keyword = head.split_whitespace().next().unwrap_or_default();
        match keyword.to_ascii_uppercase().as_str() {
            "SELECT" => "select",
            "INSERT" => "insert",
            "UPDATE" => "update",
            "DELETE" => "delete",
            _ => "other",
        }
    }

    /// Parameters as references for tokio-postgres.
    #[cfg(feature = "postgres")]
    pub fn params_ref(&self) -> Vec<&(dyn tokio_postgres::types::ToSql + Sync)> {
        self.values
            .iter()
            .map(|v| v as &(dyn tokio_postgres::types::ToSql + Sync))
            .collect()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}
