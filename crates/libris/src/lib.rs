//! # libris
//!
//! Type-safe SQL generation for a library-management backend.
//!
//! ## Features
//!
//! - **Typed WHERE expressions**: columns are tied to their record type, so a `Book` filter
//!   cannot name a `Member` column
//! - **Parameterized output**: every value is bound through a placeholder, never inlined
//! - **Safe defaults**: DELETE and UPDATE require a non-empty WHERE, UPDATE requires SET
//! - **Two dialects**: MySQL (`?`, backticks) and Postgres (`$n`, double quotes, RETURNING)
//! - **Pagination**: one `PageRequest` / `Page<T>` contract for every list endpoint
//! - **Repositories**: books, members and loans on top of any [`Executor`]
//!
//! ## WHERE expressions
//!
//! ```
//! use libris::{Book, Dialect, Op, SimpleWhere, WhereExpr, compile_where};
//!
//! let filter = WhereExpr::or(vec![
//!     SimpleWhere::new()
//!         .with(Book::COL_AUTHOR, Op::Contains, "Murthy")
//!         .with(Book::COL_PUBLISHER, Op::Equals, "Penguin UK")
//!         .into(),
//!     WhereExpr::gte(Book::COL_NUM_OF_PAGES, 300),
//! ]);
//!
//! let fragment = compile_where(&filter, Dialect::MySql).unwrap();
//! assert_eq!(
//!     fragment.sql,
//!     "((`author` LIKE ? AND `publisher` = ?) OR (`numofPages` >= ?))"
//! );
//! assert_eq!(fragment.values.len(), 3);
//! ```
//!
//! ## Statements
//!
//! ```
//! use libris::{Book, PageRequest, QueryGenerator, WhereExpr};
//!
//! let generator = QueryGenerator::mysql();
//! let query = generator
//!     .select_page("books", &[], &WhereExpr::eq(Book::COL_ID, 1), &PageRequest::default())
//!     .unwrap();
//! assert_eq!(
//!     query.sql(),
//!     "SELECT * FROM books WHERE (`id` = ?) LIMIT 10 OFFSET 0"
//! );
//! ```
//!
//! ## Repositories
//!
//! ```ignore
//! use libris::{BookRepository, LibraryConfig, PageRequest, Repository, create_pool_from_config};
//!
//! let config = LibraryConfig::from_env()?;
//! let pool = create_pool_from_config(&config)?;
//! let books = BookRepository::new(pool.get().await?);
//! let page = books.list(&PageRequest::default().with_search("dune")).await?;
//! ```

// Derive output names `::libris::...`, which must also resolve inside this crate.
extern crate self as libris;

pub mod compile;
pub mod config;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod filter;
pub mod generator;
pub mod ident;
pub mod model;
pub mod page;
pub mod prelude;
pub mod query;
pub mod record;
pub mod repository;
pub mod value;

#[cfg(feature = "postgres")]
pub mod pg;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "tracing")]
pub mod monitor;

pub use compile::{Fragment, ParamSink, compile_where};
pub use config::LibraryConfig;
pub use dialect::{Dialect, quote_ident};
pub use error::{LibError, LibResult};
pub use executor::{ExecResult, Executor};
pub use filter::{Op, SimpleWhere, WhereExpr, WhereParam};
pub use generator::{
    QueryGenerator, generate_count_sql, generate_delete_sql, generate_insert_sql,
    generate_select_sql, generate_update_sql, generate_where_clause_sql,
};
pub use ident::{Ident, IdentPart};
pub use model::{
    Book, BookPatch, Loan, LoanKind, LoanPatch, LoanPolicy, LoanStatus, Member, MemberPatch,
    MemberRole, NewBook, NewLoan, NewMember,
};
pub use page::{DEFAULT_PAGE_LIMIT, Page, PageRequest, Pagination};
pub use query::Query;
pub use record::{Column, FromRow, Record, Row};
pub use repository::{BookRepository, LoanRepository, MemberRepository, Repository};
pub use value::{FromValue, Value};

pub use libris_derive::{FromRow, Record};

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_from_config, create_pool_with_config};

#[cfg(feature = "tracing")]
pub use monitor::TracingExecutor;
