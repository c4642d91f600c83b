//! WHERE-expression compiler.
//!
//! Compilation walks the tree depth-first, left to right, writing SQL text and pushing
//! bound values into a [`ParamSink`]. The sink hands out placeholders, so numbering for
//! `$n` dialects continues across every clause of a statement without string rewriting.

use crate::dialect::{Dialect, write_quoted};
use crate::error::{LibError, LibResult};
use crate::filter::{Op, SimpleWhere, WhereExpr};
use crate::ident::check_column;
use crate::value::Value;

/// Compiled SQL text plus the values bound to its placeholders, in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fragment {
    pub sql: String,
    pub values: Vec<Value>,
}

impl Fragment {
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

/// Collects bound values for one statement and renders their placeholders.
#[derive(Debug, Clone)]
pub struct ParamSink {
    dialect: Dialect,
    values: Vec<Value>,
}

impl ParamSink {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            values: Vec::new(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Bind `value` and write its placeholder into `out`.
    pub fn push(&mut self, out: &mut String, value: Value) {
        self.values.push(value);
        self.dialect.write_placeholder(out, self.values.len());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

/// Compile a filter expression into a standalone fragment.
///
/// An empty expression yields an empty fragment; callers omit `WHERE` in that case.
pub fn compile_where<M>(expr: &WhereExpr<M>, dialect: Dialect) -> LibResult<Fragment> {
    let mut sink = ParamSink::new(dialect);
    let mut sql = String::new();
    write_expr(expr, &mut sql, &mut sink)?;
    Ok(Fragment {
        sql,
        values: sink.into_values(),
    })
}

/// Compile `expr` into `out`, continuing the sink's placeholder numbering.
pub fn write_expr<M>(expr: &WhereExpr<M>, out: &mut String, sink: &mut ParamSink) -> LibResult<()> {
    match expr {
        WhereExpr::Simple(s) => write_simple(s, out, sink),
        WhereExpr::And(exprs) => write_group(exprs, " AND ", out, sink),
        WhereExpr::Or(exprs) => write_group(exprs, " OR ", out, sink),
    }
}

fn write_group<M>(
    exprs: &[WhereExpr<M>],
    joiner: &str,
    out: &mut String,
    sink: &mut ParamSink,
) -> LibResult<()> {
    let mut first = true;
    for e in exprs.iter().filter(|e| !e.is_empty()) {
        out.push_str(if first { "(" } else { joiner });
        first = false;
        write_expr(e, out, sink)?;
    }
    if !first {
        out.push(')');
    }
    Ok(())
}

fn write_simple<M>(s: &SimpleWhere<M>, out: &mut String, sink: &mut ParamSink) -> LibResult<()> {
    if s.is_empty() {
        return Ok(());
    }
    out.push('(');
    for (i, (column, param)) in s.iter().enumerate() {
        if i > 0 {
            out.push_str(" AND ");
        }
        check_column(column.name())?;
        write_quoted(out, column.name(), sink.dialect());

        if param.value.is_null() {
            match param.op {
                Op::Equals => out.push_str(" IS NULL"),
                Op::NotEquals => out.push_str(" IS NOT NULL"),
                op => {
                    return Err(LibError::NullOperand {
                        column: column.name().to_string(),
                        op: op.to_string(),
                    });
                }
            }
            continue;
        }

        out.push(' ');
        out.push_str(param.op.sql());
        out.push(' ');
        sink.push(out, param.op.bind(&param.value));
    }
    out.push(')');
    Ok(())
}

#[cfg(test)]
mod tests;
