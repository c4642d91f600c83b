//! tokio-postgres executors.
//!
//! Queries must be generated with [`Dialect::Postgres`]. Result columns are converted to
//! [`Value`]s by their Postgres type.

use crate::dialect::Dialect;
use crate::error::{LibError, LibResult};
use crate::executor::{ExecResult, Executor, ensure_dialect};
use crate::query::Query;
use crate::record::Row;
use crate::value::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tokio_postgres::GenericClient as PgClient;
use tokio_postgres::types::{FromSql, Type};

/// Convert a driver row into a [`Row`].
pub fn convert_row(row: &tokio_postgres::Row) -> LibResult<Row> {
    let mut out = Row::with_capacity(row.len());
    for (idx, column) in row.columns().iter().enumerate() {
        let name = column.name();
        let ty = column.type_();
        let value = if *ty == Type::BOOL {
            get::<bool>(row, idx)
        } else if *ty == Type::INT2 {
            get::<i16>(row, idx)
        } else if *ty == Type::INT4 {
            get::<i32>(row, idx)
        } else if *ty == Type::INT8 {
            get::<i64>(row, idx)
        } else if *ty == Type::FLOAT4 {
            get::<f32>(row, idx)
        } else if *ty == Type::FLOAT8 {
            get::<f64>(row, idx)
        } else if [Type::TEXT, Type::VARCHAR, Type::BPCHAR, Type::NAME].contains(ty) {
            get::<String>(row, idx)
        } else if *ty == Type::TIMESTAMPTZ {
            get::<DateTime<Utc>>(row, idx)
        } else if *ty == Type::TIMESTAMP {
            row.try_get::<_, Option<NaiveDateTime>>(idx)
                .map(|t| Value::from(t.map(|t| t.and_utc())))
        } else if *ty == Type::DATE {
            get::<NaiveDate>(row, idx)
        } else {
            return Err(LibError::decode(
                name,
                format!("unsupported column type {ty}"),
            ));
        };
        let value = value.map_err(|e| LibError::decode(name, e.to_string()))?;
        out.push(name, value);
    }
    Ok(out)
}

fn get<'a, T>(row: &'a tokio_postgres::Row, idx: usize) -> Result<Value, tokio_postgres::Error>
where
    T: FromSql<'a> + Into<Value>,
{
    row.try_get::<_, Option<T>>(idx).map(Value::from)
}

async fn fetch_all_with<C: PgClient + Sync>(client: &C, query: &Query) -> LibResult<Vec<Row>> {
    ensure_dialect(Dialect::Postgres, query)?;
    let rows = client
        .query(query.sql(), &query.params_ref())
        .await
        .map_err(LibError::from_db_error)?;
    rows.iter().map(convert_row).collect()
}

async fn execute_with<C: PgClient + Sync>(client: &C, query: &Query) -> LibResult<ExecResult> {
    ensure_dialect(Dialect::Postgres, query)?;
    let n = client
        .execute(query.sql(), &query.params_ref())
        .await
        .map_err(LibError::from_db_error)?;
    Ok(ExecResult::affected(n))
}

impl Executor for tokio_postgres::Client {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn fetch_all(&self, query: &Query) -> LibResult<Vec<Row>> {
        fetch_all_with(self, query).await
    }

    async fn execute(&self, query: &Query) -> LibResult<ExecResult> {
        execute_with(self, query).await
    }
}

impl Executor for tokio_postgres::Transaction<'_> {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn fetch_all(&self, query: &Query) -> LibResult<Vec<Row>> {
        fetch_all_with(self, query).await
    }

    async fn execute(&self, query: &Query) -> LibResult<ExecResult> {
        execute_with(self, query).await
    }
}

#[cfg(feature = "pool")]
impl Executor for deadpool_postgres::Client {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn fetch_all(&self, query: &Query) -> LibResult<Vec<Row>> {
        let client: &tokio_postgres::Client = self;
        fetch_all_with(client, query).await
    }

    async fn execute(&self, query: &Query) -> LibResult<ExecResult> {
        let client: &tokio_postgres::Client = self;
        execute_with(client, query).await
    }
}
