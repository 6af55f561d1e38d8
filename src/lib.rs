pub mod config;
pub mod db;
pub mod error;

pub use error::{AppError, DatabaseError, DbResult};
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::{DatabaseConfig, Settings};

pub use db::{
    ConnectionProvider, PgConnectionProvider, ReleaseHook, User, UserId, UserRepository,
    UserStatements, NO_GENERATED_ID,
};
