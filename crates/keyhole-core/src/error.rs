use thiserror::Error;

/// Errors raised while constructing core types.
pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid short id: {0}")]
    InvalidShortId(String),
    #[error("invalid secret: {0}")]
    InvalidSecret(String),
}

/// Errors surfaced by a [`Repository`](crate::Repository) backend.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("id already exists: {0}")]
    Conflict(String),
    #[error("no record for id: {0}")]
    NotFound(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("storage operation failed: {0}")]
    Operation(String),
}

/// Errors returned by a [`Shortener`](crate::Shortener).
///
/// The service never recovers from these locally. Callers map them to
/// their own transport-level responses.
#[derive(Debug, Clone, Error)]
pub enum MappingError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("url is too large: {len} bytes exceeds the limit of {max}")]
    TooLarge { len: usize, max: usize },
    #[error("no mapping found")]
    NotFound,
    #[error("credentials do not match")]
    Unauthorized,
    #[error("storage error: {0}")]
    Store(
        #[from]
        #[source]
        StorageError,
    ),
}
