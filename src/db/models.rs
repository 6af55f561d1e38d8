use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Primary key of the `users` table, assigned by the store on insert.
pub type UserId = i32;

/// Returned by `create_user` when the store reports no generated identifier.
pub const NO_GENERATED_ID: UserId = -1;

/// Snapshot of one `users` row.
///
/// Field order matches the column read order (`id`, `name`, `email`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "User{{id={}, name='{}', email='{}'}}",
            self.id, self.name, self.email
        )
    }
}
