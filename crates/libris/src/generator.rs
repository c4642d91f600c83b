//! Statement generators: INSERT, UPDATE, DELETE, SELECT and COUNT.
//!
//! Each method is pure. It validates its inputs, compiles the filter with
//! [`write_expr`](crate::compile::write_expr), and returns a [`Query`]. Statements that
//! would be malformed or unguarded (no rows, no SET columns, no WHERE on UPDATE/DELETE)
//! are rejected before any SQL is returned.
//!
//! # Example
//! ```
//! use libris::{Column, QueryGenerator, Value, WhereExpr};
//!
//! struct Book;
//! const ID: Column<Book> = Column::new("id");
//!
//! let q = QueryGenerator::mysql().select("books", &[], &WhereExpr::eq(ID, 5), 0, 10)?;
//! assert_eq!(q.sql(), "SELECT * FROM books WHERE (`id` = ?) LIMIT 10 OFFSET 0");
//! assert_eq!(q.values(), &[Value::Int(5)]);
//! # Ok::<(), libris::LibError>(())
//! ```

use crate::compile::{Fragment, ParamSink, write_expr};
use crate::dialect::{Dialect, write_quoted};
use crate::error::{LibError, LibResult};
use crate::filter::WhereExpr;
use crate::ident::{Ident, check_column};
use crate::page::PageRequest;
use crate::query::Query;
use crate::record::{Record, Row};

/// Builds statements for one dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryGenerator {
    dialect: Dialect,
}

impl QueryGenerator {
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub const fn mysql() -> Self {
        Self::new(Dialect::MySql)
    }

    pub const fn postgres() -> Self {
        Self::new(Dialect::Postgres)
    }

    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// `INSERT INTO <table> (<cols>) VALUES (...), (...)`.
    ///
    /// Every row must name the same columns in the same order as the first.
    pub fn insert(&self, table: &str, rows: &[Row]) -> LibResult<Query> {
        let (sql, sink) = self.insert_body(table, rows)?;
        Ok(Query::new(sql, sink.into_values(), self.dialect))
    }

    /// INSERT one row per record into `R::TABLE`.
    pub fn insert_records<R: Record>(&self, records: &[R]) -> LibResult<Query> {
        let rows: Vec<Row> = records.iter().map(Record::to_row).collect();
        self.insert(R::TABLE, &rows)
    }

    /// INSERT followed by `RETURNING <fields | *>`. Postgres only.
    pub fn insert_returning(&self, table: &str, rows: &[Row], fields: &[&str]) -> LibResult<Query> {
        if !self.dialect.supports_returning() {
            return Err(LibError::Unsupported(format!(
                "INSERT ... RETURNING is not available for {}",
                self.dialect
            )));
        }
        let (mut sql, sink) = self.insert_body(table, rows)?;
        sql.push_str(" RETURNING ");
        sql.push_str(&self.select_list(fields)?);
        Ok(Query::new(sql, sink.into_values(), self.dialect))
    }

    fn insert_body(&self, table: &str, rows: &[Row]) -> LibResult<(String, ParamSink)> {
        let table = Ident::parse(table)?;
        let Some(first) = rows.first() else {
            return Err(LibError::EmptyInput(format!(
                "INSERT into '{}' requires at least one row",
                table.name()
            )));
        };
        if first.is_empty() {
            return Err(LibError::EmptyInput(format!(
                "INSERT into '{}' requires at least one column",
                table.name()
            )));
        }
        for (i, row) in rows.iter().enumerate().skip(1) {
            if !row.same_shape(first) {
                return Err(LibError::ShapeMismatch {
                    row: i,
                    expected: first.column_list(),
                    found: row.column_list(),
                });
            }
        }

        let mut sql = String::from("INSERT INTO ");
        sql.push_str(&table.to_quoted(self.dialect));
        sql.push_str(" (");
        for (i, col) in first.columns().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            check_column(col)?;
            write_quoted(&mut sql, col, self.dialect);
        }
        sql.push_str(") VALUES ");

        let mut sink = ParamSink::new(self.dialect);
        for (i, row) in rows.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push('(');
            for (j, value) in row.values().enumerate() {
                if j > 0 {
                    sql.push_str(", ");
                }
                sink.push(&mut sql, value.clone());
            }
            sql.push(')');
        }
        Ok((sql, sink))
    }

    /// `UPDATE <table> SET <col> = ?, ... WHERE <filter>`.
    ///
    /// SET values are bound before WHERE values.
    pub fn update<M>(&self, table: &str, set: &Row, filter: &WhereExpr<M>) -> LibResult<Query> {
        let table = Ident::parse(table)?;
        if set.is_empty() {
            return Err(LibError::EmptySet {
                table: table.name().to_string(),
            });
        }
        if filter.is_empty() {
            return Err(LibError::EmptyWhere {
                statement: "UPDATE",
                table: table.name().to_string(),
            });
        }

        let mut sink = ParamSink::new(self.dialect);
        let mut sql = String::from("UPDATE ");
        sql.push_str(&table.to_sql(self.dialect));
        sql.push_str(" SET ");
        for (i, (col, value)) in set.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            check_column(col)?;
            write_quoted(&mut sql, col, self.dialect);
            sql.push_str(" = ");
            sink.push(&mut sql, value.clone());
        }
        sql.push_str(" WHERE ");
        write_expr(filter, &mut sql, &mut sink)?;
        Ok(Query::new(sql, sink.into_values(), self.dialect))
    }

    /// `DELETE FROM <table> WHERE <filter>`.
    pub fn delete<M>(&self, table: &str, filter: &WhereExpr<M>) -> LibResult<Query> {
        let table = Ident::parse(table)?;
        if filter.is_empty() {
            return Err(LibError::EmptyWhere {
                statement: "DELETE",
                table: table.name().to_string(),
            });
        }
        let mut sink = ParamSink::new(self.dialect);
        let mut sql = String::from("DELETE FROM ");
        sql.push_str(&table.to_sql(self.dialect));
        sql.push_str(" WHERE ");
        write_expr(filter, &mut sql, &mut sink)?;
        Ok(Query::new(sql, sink.into_values(), self.dialect))
    }

    /// `SELECT <* | fields> FROM <table>[ WHERE <filter>] LIMIT <limit> OFFSET <offset>`.
    ///
    /// Field names are validated identifiers and emitted as written.
    pub fn select<M>(
        &self,
        table: &str,
        fields: &[&str],
        filter: &WhereExpr<M>,
        offset: u64,
        limit: u64,
    ) -> LibResult<Query> {
        let table = Ident::parse(table)?;
        let mut sink = ParamSink::new(self.dialect);
        let mut sql = String::from("SELECT ");
        sql.push_str(&self.select_list(fields)?);
        sql.push_str(" FROM ");
        sql.push_str(&table.to_sql(self.dialect));
        self.push_where(&mut sql, filter, &mut sink)?;
        sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}"));
        Ok(Query::new(sql, sink.into_values(), self.dialect))
    }

    /// [`select`](Self::select) with the window taken from a page request.
    pub fn select_page<M>(
        &self,
        table: &str,
        fields: &[&str],
        filter: &WhereExpr<M>,
        req: &PageRequest,
    ) -> LibResult<Query> {
        req.validate()?;
        self.select(table, fields, filter, req.offset, req.limit)
    }

    /// `SELECT COUNT(*) AS <count> FROM <table>[ WHERE <filter>]`.
    pub fn count<M>(&self, table: &str, filter: Option<&WhereExpr<M>>) -> LibResult<Query> {
        let table = Ident::parse(table)?;
        let mut sink = ParamSink::new(self.dialect);
        let mut sql = String::from("SELECT COUNT(*) AS ");
        write_quoted(&mut sql, "count", self.dialect);
        sql.push_str(" FROM ");
        sql.push_str(&table.to_sql(self.dialect));
        if let Some(filter) = filter {
            self.push_where(&mut sql, filter, &mut sink)?;
        }
        Ok(Query::new(sql, sink.into_values(), self.dialect))
    }

    /// The compiled filter alone, without the `WHERE` keyword.
    pub fn where_clause<M>(&self, filter: &WhereExpr<M>) -> LibResult<Fragment> {
        crate::compile::compile_where(filter, self.dialect)
    }

    fn push_where<M>(
        &self,
        sql: &mut String,
        filter: &WhereExpr<M>,
        sink: &mut ParamSink,
    ) -> LibResult<()> {
        if filter.is_empty() {
            return Ok(());
        }
        sql.push_str(" WHERE ");
        write_expr(filter, sql, sink)
    }

    fn select_list(&self, fields: &[&str]) -> LibResult<String> {
        if fields.is_empty() {
            return Ok("*".to_string());
        }
        let rendered = fields
            .iter()
            .map(|f| Ident::parse(f).map(|i| i.to_sql(self.dialect)))
            .collect::<LibResult<Vec<_>>>()?;
        Ok(rendered.join(", "))
    }
}

const MYSQL: QueryGenerator = QueryGenerator::mysql();

/// MySQL-flavoured [`QueryGenerator::insert`].
pub fn generate_insert_sql(table: &str, rows: &[Row]) -> LibResult<Query> {
    MYSQL.insert(table, rows)
}

/// MySQL-flavoured [`QueryGenerator::update`].
pub fn generate_update_sql<M>(table: &str, set: &Row, filter: &WhereExpr<M>) -> LibResult<Query> {
    MYSQL.update(table, set, filter)
}

/// MySQL-flavoured [`QueryGenerator::delete`].
pub fn generate_delete_sql<M>(table: &str, filter: &WhereExpr<M>) -> LibResult<Query> {
    MYSQL.delete(table, filter)
}

/// MySQL-flavoured [`QueryGenerator::select`].
pub fn generate_select_sql<M>(
    table: &str,
    fields: &[&str],
    filter: &WhereExpr<M>,
    offset: u64,
    limit: u64,
) -> LibResult<Query> {
    MYSQL.select(table, fields, filter, offset, limit)
}

/// MySQL-flavoured [`QueryGenerator::count`].
pub fn generate_count_sql<M>(table: &str, filter: Option<&WhereExpr<M>>) -> LibResult<Query> {
    MYSQL.count(table, filter)
}

/// MySQL-flavoured [`QueryGenerator::where_clause`].
pub fn generate_where_clause_sql<M>(filter: &WhereExpr<M>) -> LibResult<Fragment> {
    MYSQL.where_clause(filter)
}
