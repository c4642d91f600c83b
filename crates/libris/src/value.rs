//! Bound scalar values.
//!
//! Every value that ends up behind a placeholder is a [`Value`]. Keeping the set closed
//! lets the generator stay free of trait objects while executors convert values into
//! whatever their driver expects.

use crate::error::{LibError, LibResult};
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

/// A scalar bound to a placeholder (or carried in a [`Row`](crate::Row)).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
}

impl Value {
    /// Whether this value is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the variant, used in decode errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Timestamp(_) => "timestamp",
            Value::Date(_) => "date",
        }
    }

    /// Text used by the LIKE-based operators before wildcards are attached.
    ///
    /// `%` and `_` inside the value are passed through unescaped.
    pub fn pattern_text(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Borrow the inner string, if this is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Read the inner integer, if this is an int.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
            Value::Timestamp(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S")),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// Typed extraction from a [`Value`].
///
/// The error string describes the mismatch; [`Row::try_get`](crate::Row::try_get) attaches
/// the column name.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, String>;
}

fn mismatch(expected: &str, found: &Value) -> String {
    format!("expected {expected}, found {}", found.kind())
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, String> {
        Ok(value.clone())
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Int(i) => Ok(*i),
            other => Err(mismatch("int", other)),
        }
    }
}

macro_rules! impl_from_value_narrow {
    ($($t:ty),*) => {
        $(
            impl FromValue for $t {
                fn from_value(value: &Value) -> Result<Self, String> {
                    let wide = i64::from_value(value)?;
                    <$t>::try_from(wide)
                        .map_err(|_| format!("{wide} is out of range for {}", stringify!($t)))
                }
            }
        )*
    };
}

impl_from_value_narrow!(i16, i32, u32, u64);

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Float(x) => Ok(*x),
            Value::Int(i) => Ok(*i as f64),
            other => Err(mismatch("float", other)),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Bool(b) => Ok(*b),
            // MySQL reports BOOLEAN columns as TINYINT
            Value::Int(0) => Ok(false),
            Value::Int(1) => Ok(true),
            other => Err(mismatch("bool", other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            other => Err(mismatch("text", other)),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Timestamp(t) => Ok(*t),
            other => Err(mismatch("timestamp", other)),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Date(d) => Ok(*d),
            Value::Timestamp(t) => Ok(t.date_naive()),
            other => Err(mismatch("date", other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// Parse a text value into a domain enum via `FromStr`, for use in `FromValue` impls.
pub fn parse_text<T>(value: &Value) -> Result<T, String>
where
    T: std::str::FromStr<Err = LibError>,
{
    let text = String::from_value(value)?;
    text.parse::<T>().map_err(|e| e.to_string())
}

/// Decode helper shared by derive output and hand-written `FromRow` impls.
pub(crate) fn decode<T: FromValue>(column: &str, value: Option<&Value>) -> LibResult<T> {
    match value {
        Some(v) => T::from_value(v).map_err(|msg| LibError::decode(column, msg)),
        None => T::from_value(&Value::Null)
            .map_err(|_| LibError::decode(column, "column missing from row")),
    }
}

#[cfg(feature = "postgres")]
mod pg {
    use super::Value;
    use bytes::BytesMut;
    use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};

    type BoxError = Box<dyn std::error::Error + Sync + Send>;

    impl ToSql for Value {
        fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
            match self {
                Value::Null => Ok(IsNull::Yes),
                Value::Bool(b) => b.to_sql_checked(ty, out),
                Value::Int(i) => {
                    if *ty == Type::INT2 {
                        i16::try_from(*i)?.to_sql_checked(ty, out)
                    } else if *ty == Type::INT4 {
                        i32::try_from(*i)?.to_sql_checked(ty, out)
                    } else {
                        i.to_sql_checked(ty, out)
                    }
                }
                Value::Float(x) => {
                    if *ty == Type::FLOAT4 {
                        (*x as f32).to_sql_checked(ty, out)
                    } else {
                        x.to_sql_checked(ty, out)
                    }
                }
                Value::Text(s) => s.to_sql_checked(ty, out),
                Value::Timestamp(t) => {
                    if *ty == Type::TIMESTAMP {
                        t.naive_utc().to_sql_checked(ty, out)
                    } else {
                        t.to_sql_checked(ty, out)
                    }
                }
                Value::Date(d) => d.to_sql_checked(ty, out),
            }
        }

        fn accepts(ty: &Type) -> bool {
            <bool as ToSql>::accepts(ty)
                || <i16 as ToSql>::accepts(ty)
                || <i32 as ToSql>::accepts(ty)
                || <i64 as ToSql>::accepts(ty)
                || <f32 as ToSql>::accepts(ty)
                || <f64 as ToSql>::accepts(ty)
                || <String as ToSql>::accepts(ty)
                || <chrono::DateTime<chrono::Utc> as ToSql>::accepts(ty)
                || <chrono::NaiveDateTime as ToSql>::accepts(ty)
                || <chrono::NaiveDate as ToSql>::accepts(ty)
        }

        to_sql_checked!();
    }
}
