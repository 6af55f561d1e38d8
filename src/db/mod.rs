//! Data access layer for the `users` table.
//!
//! Every repository operation opens its own connection through a
//! [`ConnectionProvider`], runs one parameterized statement and releases the
//! connection before returning. There is no pool and no cross-operation
//! transaction; each statement runs in autocommit.

pub mod connection;
pub mod models;
pub mod operations;

pub use connection::{ConnectionProvider, PgConnectionProvider, ReleaseHook};
pub use models::{User, UserId, NO_GENERATED_ID};
pub use operations::{UserRepository, UserStatements};
