//! Common error types for CourseHub

use thiserror::Error;

/// Common result type for CourseHub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across CourseHub crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("{0}")]
    NotFound(String),

    /// Caller's role does not permit the operation
    #[error("{0}")]
    Forbidden(String),

    /// Missing, invalid or expired credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Uniqueness or state conflict
    #[error("{0}")]
    Conflict(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map a unique-constraint violation to `Conflict`, leaving other errors as `Database`
    pub fn from_unique(err: sqlx::Error, message: impl Into<String>) -> Self {
        match err.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => Error::Conflict(message.into()),
            _ => Error::Database(err),
        }
    }
}
