//! Filter expressions over a record type.
//!
//! A [`WhereExpr<M>`] is a tree whose leaves are [`SimpleWhere<M>`] maps from column to
//! predicate. Inner nodes combine children with AND or OR. The tree is plain data; the
//! compiler in [`crate::compile`] turns it into SQL.
//!
//! # Example
//! ```
//! use libris::{Column, Op, SimpleWhere, WhereExpr};
//!
//! struct Book;
//! const AUTHOR: Column<Book> = Column::new("author");
//! const PUBLISHER: Column<Book> = Column::new("publisher");
//! const COPIES: Column<Book> = Column::new("totalNumberOfCopies");
//!
//! let expr = WhereExpr::or(vec![
//!     SimpleWhere::new()
//!         .with(AUTHOR, Op::Contains, "Murthy")
//!         .with(PUBLISHER, Op::Equals, "Penguin UK")
//!         .into(),
//!     WhereExpr::gte(COPIES, 10),
//! ]);
//! assert!(!expr.is_empty());
//! ```

use crate::error::LibError;
use crate::record::Column;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Comparison operator of a single column predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Op {
    Equals,
    NotEquals,
    StartsWith,
    NotStartsWith,
    EndsWith,
    NotEndsWith,
    Contains,
    NotContains,
    GreaterThan,
    GreaterThanEquals,
    LesserThan,
    LesserThanEquals,
}

impl Op {
    pub const ALL: [Op; 12] = [
        Op::Equals,
        Op::NotEquals,
        Op::StartsWith,
        Op::NotStartsWith,
        Op::EndsWith,
        Op::NotEndsWith,
        Op::Contains,
        Op::NotContains,
        Op::GreaterThan,
        Op::GreaterThanEquals,
        Op::LesserThan,
        Op::LesserThanEquals,
    ];

    /// SQL comparison text.
    pub const fn sql(self) -> &'static str {
        match self {
            Op::Equals => "=",
            Op::NotEquals => "!=",
            Op::StartsWith | Op::EndsWith | Op::Contains => "LIKE",
            Op::NotStartsWith | Op::NotEndsWith | Op::NotContains => "NOT LIKE",
            Op::GreaterThan => ">",
            Op::GreaterThanEquals => ">=",
            Op::LesserThan => "<",
            Op::LesserThanEquals => "<=",
        }
    }

    /// Whether the bound value is wrapped in `%` wildcards.
    pub const fn is_pattern(self) -> bool {
        matches!(
            self,
            Op::StartsWith
                | Op::NotStartsWith
                | Op::EndsWith
                | Op::NotEndsWith
                | Op::Contains
                | Op::NotContains
        )
    }

    /// The value actually bound for `value`: pattern operators attach wildcards.
    pub fn bind(self, value: &Value) -> Value {
        match self {
            Op::StartsWith | Op::NotStartsWith => Value::Text(format!("{}%", value.pattern_text())),
            Op::EndsWith | Op::NotEndsWith => Value::Text(format!("%{}", value.pattern_text())),
            Op::Contains | Op::NotContains => Value::Text(format!("%{}%", value.pattern_text())),
            _ => value.clone(),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Op::Equals => "EQUALS",
            Op::NotEquals => "NOT_EQUALS",
            Op::StartsWith => "STARTS_WITH",
            Op::NotStartsWith => "NOT_STARTS_WITH",
            Op::EndsWith => "ENDS_WITH",
            Op::NotEndsWith => "NOT_ENDS_WITH",
            Op::Contains => "CONTAINS",
            Op::NotContains => "NOT_CONTAINS",
            Op::GreaterThan => "GREATER_THAN",
            Op::GreaterThanEquals => "GREATER_THAN_EQUALS",
            Op::LesserThan => "LESSER_THAN",
            Op::LesserThanEquals => "LESSER_THAN_EQUALS",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Op {
    type Err = LibError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Op::ALL
            .into_iter()
            .find(|op| op.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| LibError::validation(format!("unknown comparison operator: {s}")))
    }
}

/// One column predicate: operator plus operand.
///
/// A `Value::Null` operand is only meaningful with `Equals` (IS NULL) and `NotEquals`
/// (IS NOT NULL); the compiler rejects it elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereParam {
    pub op: Op,
    pub value: Value,
}

impl WhereParam {
    pub fn new(op: Op, value: impl Into<Value>) -> Self {
        Self {
            op,
            value: value.into(),
        }
    }
}

/// Column predicates joined by AND, in insertion order. Column keys are unique.
pub struct SimpleWhere<M> {
    entries: Vec<(Column<M>, WhereParam)>,
}

impl<M> SimpleWhere<M> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add (or replace) the predicate for `column`.
    pub fn with(mut self, column: Column<M>, op: Op, value: impl Into<Value>) -> Self {
        self.insert(column, WhereParam::new(op, value));
        self
    }

    /// Set the predicate for `column`; a repeated column keeps its first position.
    pub fn insert(&mut self, column: Column<M>, param: WhereParam) {
        match self.entries.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = param,
            None => self.entries.push((column, param)),
        }
    }

    pub fn get(&self, column: Column<M>) -> Option<&WhereParam> {
        self.entries
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, p)| p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Column<M>, &WhereParam)> {
        self.entries.iter().map(|(c, p)| (*c, p))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<M> Default for SimpleWhere<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for SimpleWhere<M> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<M> PartialEq for SimpleWhere<M> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<M> fmt::Debug for SimpleWhere<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(c, p)| (c.name(), p)))
            .finish()
    }
}

impl<M> FromIterator<(Column<M>, WhereParam)> for SimpleWhere<M> {
    fn from_iter<I: IntoIterator<Item = (Column<M>, WhereParam)>>(iter: I) -> Self {
        let mut s = SimpleWhere::new();
        for (c, p) in iter {
            s.insert(c, p);
        }
        s
    }
}

/// A filter expression tree over model `M`.
pub enum WhereExpr<M> {
    Simple(SimpleWhere<M>),
    And(Vec<WhereExpr<M>>),
    Or(Vec<WhereExpr<M>>),
}

impl<M> WhereExpr<M> {
    /// An empty simple expression (matches everything; compiles to nothing).
    pub fn all() -> Self {
        WhereExpr::Simple(SimpleWhere::new())
    }

    pub fn simple(s: SimpleWhere<M>) -> Self {
        WhereExpr::Simple(s)
    }

    pub fn and(exprs: Vec<WhereExpr<M>>) -> Self {
        WhereExpr::And(exprs)
    }

    pub fn or(exprs: Vec<WhereExpr<M>>) -> Self {
        WhereExpr::Or(exprs)
    }

    /// Single-predicate expression.
    pub fn pred(column: Column<M>, op: Op, value: impl Into<Value>) -> Self {
        WhereExpr::Simple(SimpleWhere::new().with(column, op, value))
    }

    pub fn eq(column: Column<M>, value: impl Into<Value>) -> Self {
        Self::pred(column, Op::Equals, value)
    }

    pub fn ne(column: Column<M>, value: impl Into<Value>) -> Self {
        Self::pred(column, Op::NotEquals, value)
    }

    pub fn is_null(column: Column<M>) -> Self {
        Self::pred(column, Op::Equals, Value::Null)
    }

    pub fn is_not_null(column: Column<M>) -> Self {
        Self::pred(column, Op::NotEquals, Value::Null)
    }

    pub fn starts_with(column: Column<M>, value: impl Into<Value>) -> Self {
        Self::pred(column, Op::StartsWith, value)
    }

    pub fn ends_with(column: Column<M>, value: impl Into<Value>) -> Self {
        Self::pred(column, Op::EndsWith, value)
    }

    pub fn contains(column: Column<M>, value: impl Into<Value>) -> Self {
        Self::pred(column, Op::Contains, value)
    }

    pub fn not_contains(column: Column<M>, value: impl Into<Value>) -> Self {
        Self::pred(column, Op::NotContains, value)
    }

    pub fn gt(column: Column<M>, value: impl Into<Value>) -> Self {
        Self::pred(column, Op::GreaterThan, value)
    }

    pub fn gte(column: Column<M>, value: impl Into<Value>) -> Self {
        Self::pred(column, Op::GreaterThanEquals, value)
    }

    pub fn lt(column: Column<M>, value: impl Into<Value>) -> Self {
        Self::pred(column, Op::LesserThan, value)
    }

    pub fn lte(column: Column<M>, value: impl Into<Value>) -> Self {
        Self::pred(column, Op::LesserThanEquals, value)
    }

    /// Combine with another expression under AND, flattening an existing AND node.
    pub fn and_also(self, other: WhereExpr<M>) -> Self {
        match self {
            WhereExpr::And(mut exprs) => {
                exprs.push(other);
                WhereExpr::And(exprs)
            }
            this => WhereExpr::And(vec![this, other]),
        }
    }

    /// True when the expression compiles to no SQL at all.
    pub fn is_empty(&self) -> bool {
        match self {
            WhereExpr::Simple(s) => s.is_empty(),
            WhereExpr::And(exprs) | WhereExpr::Or(exprs) => exprs.iter().all(WhereExpr::is_empty),
        }
    }

    /// Number of column predicates in the tree.
    pub fn predicate_count(&self) -> usize {
        match self {
            WhereExpr::Simple(s) => s.len(),
            WhereExpr::And(exprs) | WhereExpr::Or(exprs) => {
                exprs.iter().map(WhereExpr::predicate_count).sum()
            }
        }
    }
}

impl<M> Default for WhereExpr<M> {
    fn default() -> Self {
        Self::all()
    }
}

impl<M> From<SimpleWhere<M>> for WhereExpr<M> {
    fn from(s: SimpleWhere<M>) -> Self {
        WhereExpr::Simple(s)
    }
}

impl<M> Clone for WhereExpr<M> {
    fn clone(&self) -> Self {
        match self {
            WhereExpr::Simple(s) => WhereExpr::Simple(s.clone()),
            WhereExpr::And(e) => WhereExpr::And(e.clone()),
            WhereExpr::Or(e) => WhereExpr::Or(e.clone()),
        }
    }
}

impl<M> PartialEq for WhereExpr<M> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (WhereExpr::Simple(a), WhereExpr::Simple(b)) => a == b,
            (WhereExpr::And(a), WhereExpr::And(b)) | (WhereExpr::Or(a), WhereExpr::Or(b)) => a == b,
            _ => false,
        }
    }
}

impl<M> fmt::Debug for WhereExpr<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WhereExpr::Simple(s) => s.fmt(f),
            WhereExpr::And(e) => f.debug_tuple("And").field(e).finish(),
            WhereExpr::Or(e) => f.debug_tuple("Or").field(e).finish(),
        }
    }
}
