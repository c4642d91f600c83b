//! Error types for libris

use thiserror::Error;

/// Result type alias for libris operations
pub type LibResult<T> = Result<T, LibError>;

/// Error types for SQL generation and execution
#[derive(Debug, Error)]
pub enum LibError {
    /// INSERT received no rows (or a row with no columns)
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// UPDATE received an empty changeset
    #[error("UPDATE on '{table}' requires at least one SET column")]
    EmptySet { table: String },

    /// UPDATE/DELETE whose WHERE expression compiled to nothing
    #[error("{statement} on '{table}' requires a non-empty WHERE expression")]
    EmptyWhere {
        statement: &'static str,
        table: String,
    },

    /// INSERT row whose columns differ from the first row
    #[error("Row {row} has columns [{found}], expected [{expected}]")]
    ShapeMismatch {
        row: usize,
        expected: String,
        found: String,
    },

    /// A null operand used with an operator other than EQUALS/NOT_EQUALS
    #[error("Operator {op} on column '{column}' cannot take a NULL value")]
    NullOperand { column: String, op: String },

    /// The dialect cannot express the requested statement
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// A query built for one dialect was handed to an executor of another
    #[error("Query was generated for {query} but executor speaks {executor}")]
    DialectMismatch { query: String, executor: String },

    /// Validation error (identifiers, payloads)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid pagination request
    #[error("Invalid page request: {0}")]
    InvalidPage(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Domain-level conflict (e.g. no copies left to lend)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// Query execution error
    #[cfg(feature = "postgres")]
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl LibError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Whether the error was raised while building SQL, before any executor was involved.
    pub fn is_generator_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput(_)
                | Self::EmptySet { .. }
                | Self::EmptyWhere { .. }
                | Self::ShapeMismatch { .. }
                | Self::NullOperand { .. }
                | Self::Unsupported(_)
                | Self::Validation(_)
        )
    }

    /// Parse a tokio_postgres error into a more specific LibError
    #[cfg(feature = "postgres")]
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            let message = db_err.message();

            match db_err.code().code() {
                "23505" => return Self::UniqueViolation(format!("{}: {}", constraint, message)),
                "23503" => {
                    return Self::ForeignKeyViolation(format!("{}: {}", constraint, message));
                }
                "23514" => return Self::CheckViolation(format!("{}: {}", constraint, message)),
                _ => {}
            }
        }
        Self::Query(err)
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for LibError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
