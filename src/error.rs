//! Error types for the marsdb data-access layer.

use rusqlite::ErrorCode;

/// Result type alias for marsdb operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the gateway.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The database could not be opened, configured or closed.
    #[error("Connection error: {0}")]
    Connection(#[source] rusqlite::Error),

    /// A foreign key, NOT NULL, CHECK or UNIQUE constraint rejected the statement.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// An update matched no row.
    #[error("{entity} #{id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// Any other driver error.
    #[error("Query error: {0}")]
    Query(#[source] rusqlite::Error),

    /// Schema already exists.
    #[error("Schema already exists. Run `marsdb drop` first")]
    AlreadyInitialized,

    /// Schema has not been created yet.
    #[error("Schema not created. Run `marsdb init` first")]
    NotInitialized,

    /// Seeding needs every table empty so the fixed ids line up.
    #[error("Table {0} already has rows. Run `marsdb reset` instead")]
    NotEmpty(&'static str),

    /// Login or password did not match.
    #[error("Invalid login or password")]
    InvalidCredentials,

    /// Invalid status label.
    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    /// Table name outside the schema.
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// Password hashing or hash parsing failed.
    #[error("Password hash error: {0}")]
    PasswordHash(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => Error::ConstraintViolation(err.to_string()),
            Some(ErrorCode::CannotOpen) | Some(ErrorCode::NotADatabase) => Error::Connection(err),
            _ => Error::Query(err),
        }
    }
}

impl Error {
    /// Whether the error came from a database constraint.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Error::ConstraintViolation(_))
    }
}
