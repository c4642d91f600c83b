//! Records: typed columns, rows of named values, and the traits tying structs to tables.

use crate::error::LibResult;
use crate::value::{FromValue, Value, decode};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// A column name tagged with the model it belongs to.
///
/// `WhereExpr<M>` only accepts `Column<M>` keys, so a filter over books cannot mention a
/// member column. `#[derive(Record)]` generates one `COL_<FIELD>` constant per field.
pub struct Column<M> {
    name: &'static str,
    _model: PhantomData<fn() -> M>,
}

impl<M> Column<M> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _model: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<M> Clone for Column<M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for Column<M> {}

impl<M> PartialEq for Column<M> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<M> Eq for Column<M> {}

impl<M> Hash for Column<M> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl<M> fmt::Debug for Column<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Column").field(&self.name).finish()
    }
}

impl<M> fmt::Display for Column<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A struct persisted as one row of a table.
pub trait Record {
    /// Table name.
    const TABLE: &'static str;
    /// Column names in field order.
    const COLUMNS: &'static [&'static str];
    /// Primary key column, if the struct carries one.
    const ID_COLUMN: Option<&'static str>;

    /// The struct's values keyed by column, in field order.
    fn to_row(&self) -> Row;
}

/// Decode a struct from a [`Row`].
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> LibResult<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> LibResult<Self> {
        Ok(row.clone())
    }
}

/// An ordered list of `(column, value)` pairs with unique column names.
///
/// Used both as the payload for INSERT/UPDATE and as the decoded form of a result row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    entries: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Set a column. An existing column keeps its position and gets the new value.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((column, value)),
        }
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    /// Typed access; a missing column decodes as NULL (so `Option<T>` fields tolerate it).
    pub fn try_get<T: FromValue>(&self, column: &str) -> LibResult<T> {
        decode(column, self.get(column))
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        let idx = self.entries.iter().position(|(c, _)| c == column)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether both rows name the same columns in the same order.
    pub fn same_shape(&self, other: &Row) -> bool {
        self.columns().eq(other.columns())
    }

    pub(crate) fn column_list(&self) -> String {
        self.columns().collect::<Vec<_>>().join(", ")
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.push(k, v);
        }
        row
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
