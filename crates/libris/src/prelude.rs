//! Common imports for handlers built on libris.
//!
//! ```ignore
//! use libris::prelude::*;
//! ```

pub use crate::{
    Column, Dialect, Executor, FromRow, LibError, LibResult, Op, Page, PageRequest, Query,
    QueryGenerator, Record, Repository, Row, SimpleWhere, Value, WhereExpr,
};

pub use crate::{BookRepository, LoanRepository, MemberRepository};

#[cfg(feature = "pool")]
pub use crate::{create_pool, create_pool_from_config};

#[cfg(feature = "tracing")]
pub use crate::TracingExecutor;
