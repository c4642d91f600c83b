//! Derive macros for libris
//!
//! Provides `#[derive(Record)]` and `#[derive(FromRow)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod from_row;
mod record;
mod sql_ident;

/// Derive `Record` metadata and `to_row` for a struct.
///
/// # Example
///
/// ```ignore
/// use libris::Record;
///
/// #[derive(Record)]
/// #[record(table = "books", rename_all = "camelCase")]
/// struct Book {
///     #[record(id)]
///     id: i64,
///     title: String,
///     #[record(column = "numofPages")]
///     num_of_pages: i32,
/// }
///
/// assert_eq!(Book::COL_NUM_OF_PAGES.name(), "numofPages");
/// ```
///
/// # Generated
///
/// - `impl Record`: `TABLE`, `COLUMNS`, `ID_COLUMN`, `to_row`
/// - `COL_*: Column<Self>` constants, one per field
///
/// # Attributes
///
/// - `#[record(table = "name")]` - Table name (required)
/// - `#[record(rename_all = "camelCase")]` - Derive column names from field names
///   (`snake_case`, `camelCase`, `PascalCase`)
/// - `#[record(partial)]` - `Option` fields are left out of `to_row` when `None`
/// - `#[record(id)]` - Mark field as primary key
/// - `#[record(column = "name")]` - Map field to a different column name
/// - `#[record(skip)]` - Not a column
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive `FromRow` for a struct, decoding each field with `Row::try_get`.
///
/// Column names follow the same `#[record(...)]` rules as `Record`; skipped fields take
/// `Default::default()`.
#[proc_macro_derive(FromRow, attributes(record))]
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    from_row::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
