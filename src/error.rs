use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

// Implement conversion from config::ConfigError
impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}

/// Failures of the data access layer.
///
/// `ReleaseError` is never returned from a repository operation. It only
/// reaches the log and the provider's release hook.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Release error: {0}")]
    ReleaseError(String),
}

impl DatabaseError {
    /// Wraps a driver error raised while establishing a session.
    pub fn connection(err: sqlx::Error) -> Self {
        DatabaseError::ConnectionError(err.to_string())
    }

    /// Wraps a driver error raised while closing a session.
    pub fn release(err: sqlx::Error) -> Self {
        DatabaseError::ReleaseError(err.to_string())
    }
}

// Statements run on an established session, so a bare driver error is a store error.
impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        DatabaseError::StoreError(err.to_string())
    }
}

pub type DbResult<T> = std::result::Result<T, DatabaseError>;
