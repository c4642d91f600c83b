use proc_macro2::Span;
use syn::{Error, Result};

pub(crate) fn is_valid_sql_ident(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Validate a column name given in `#[record(column = "...")]` or produced by `rename_all`.
pub(crate) fn check_column(s: &str, span: Span) -> Result<String> {
    let s = s.trim();
    if s.is_empty() {
        return Err(Error::new(span, "column name must not be empty"));
    }
    if !is_valid_sql_ident(s) {
        return Err(Error::new(
            span,
            format!("column '{s}' is not a valid SQL identifier (expected [A-Za-z_][A-Za-z0-9_$]*)"),
        ));
    }
    Ok(s.to_string())
}

/// Validate a table name; `schema.table` is allowed.
pub(crate) fn check_table(s: &str, span: Span) -> Result<String> {
    let s = s.trim();
    if s.is_empty() || !s.split('.').all(is_valid_sql_ident) {
        return Err(Error::new(
            span,
            format!("table '{s}' is not a valid SQL identifier"),
        ));
    }
    Ok(s.to_string())
}
