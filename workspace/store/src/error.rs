use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use tracing::error;

/// Error types for the store.
///
/// Every variant except `Database`, `Credential` and `Storage` is an expected,
/// recoverable outcome the caller turns into a user-facing message.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Registration attempted with a username that already exists
    #[error("Username '{0}' is already taken")]
    DuplicateUsername(String),

    /// Unknown username or wrong password
    #[error("Invalid username or password")]
    AuthFailure,

    /// A user, item or review does not exist (or not under the requested kind)
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    /// The caller is not allowed to perform the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Review content is empty
    #[error("Review content must not be empty")]
    InvalidContent,

    /// A required field is missing or violates a length rule
    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// Hashing failed or the hashing task could not be joined
    #[error("Credential error: {0}")]
    Credential(String),

    /// Reading or writing artwork on disk failed
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        StoreError::NotFound { entity, id }
    }

    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        StoreError::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Maps a failed user insert, turning a unique-index violation raised by a
    /// concurrent registration into `DuplicateUsername`.
    pub(crate) fn from_user_insert(err: DbErr, username: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                error!(%detail, "Unique constraint hit while registering '{}'", username);
                StoreError::DuplicateUsername(username.to_string())
            }
            _ => StoreError::Database(err),
        }
    }
}

/// Type alias for Result with StoreError
pub type Result<T> = std::result::Result<T, StoreError>;
