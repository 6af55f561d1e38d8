use crate::config::DatabaseConfig;
use crate::db::connection::{ConnectionProvider, PgConnectionProvider};
use crate::db::models::{User, UserId, NO_GENERATED_ID};
use crate::error::DbResult;
use async_trait::async_trait;
use sqlx::PgConnection;
use std::future::Future;
use tracing::{debug, error, warn};

const INSERT_USER_SQL: &str = "INSERT INTO users (name, email) VALUES ($1, $2) RETURNING id";
const SELECT_USER_SQL: &str = "SELECT id, name, email FROM users WHERE id = $1";
const SELECT_USERS_SQL: &str = "SELECT id, name, email FROM users";
const UPDATE_USER_SQL: &str = "UPDATE users SET name = $1, email = $2 WHERE id = $3";
const DELETE_USER_SQL: &str = "DELETE FROM users WHERE id = $1";

/// The statement set run against one open handle.
///
/// All values travel as bound parameters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStatements: Send {
    async fn insert_user(&mut self, name: &str, email: &str) -> DbResult<Option<UserId>>;
    async fn select_user(&mut self, id: UserId) -> DbResult<Option<User>>;
    async fn select_users(&mut self) -> DbResult<Vec<User>>;
    async fn update_user(&mut self, id: UserId, name: &str, email: &str) -> DbResult<u64>;
    async fn delete_user(&mut self, id: UserId) -> DbResult<u64>;
}

#[async_trait]
impl UserStatements for PgConnection {
    async fn insert_user(&mut self, name: &str, email: &str) -> DbResult<Option<UserId>> {
        let id = sqlx::query_scalar::<_, UserId>(INSERT_USER_SQL)
            .bind(name)
            .bind(email)
            .fetch_optional(&mut *self)
            .await?;

        Ok(id)
    }

    async fn select_user(&mut self, id: UserId) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(SELECT_USER_SQL)
            .bind(id)
            .fetch_optional(&mut *self)
            .await?;

        Ok(user)
    }

    async fn select_users(&mut self) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(SELECT_USERS_SQL)
            .fetch_all(&mut *self)
            .await?;

        Ok(users)
    }

    async fn update_user(&mut self, id: UserId, name: &str, email: &str) -> DbResult<u64> {
        let result = sqlx::query(UPDATE_USER_SQL)
            .bind(name)
            .bind(email)
            .bind(id)
            .execute(&mut *self)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_user(&mut self, id: UserId) -> DbResult<u64> {
        let result = sqlx::query(DELETE_USER_SQL)
            .bind(id)
            .execute(&mut *self)
            .await?;

        Ok(result.rows_affected())
    }
}

/// CRUD operations over the `users` table.
///
/// Each call acquires one handle from the provider and releases it before
/// returning, whether the statement succeeded, found nothing, or failed.
/// The repository keeps no state between calls.
pub struct UserRepository<P = PgConnectionProvider> {
    provider: P,
}

impl UserRepository<PgConnectionProvider> {
    pub fn from_config(config: DatabaseConfig) -> Self {
        Self::new(PgConnectionProvider::new(config))
    }
}

impl<P: ConnectionProvider> UserRepository<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Inserts a user and returns the id the store generated for it, or
    /// [`NO_GENERATED_ID`] when the store reports none.
    pub async fn create_user(&self, name: &str, email: &str) -> DbResult<UserId> {
        let id = self
            .with_handle("create_user", |mut conn| async move {
                let result = conn.insert_user(name, email).await;
                (conn, result)
            })
            .await?;

        match id {
            Some(id) => {
                debug!("Created user {}", id);
                Ok(id)
            }
            None => {
                warn!("Insert into users reported no generated id");
                Ok(NO_GENERATED_ID)
            }
        }
    }

    /// Returns `Ok(None)` when no row has this id.
    pub async fn get_user_by_id(&self, id: UserId) -> DbResult<Option<User>> {
        let user = self
            .with_handle("get_user_by_id", |mut conn| async move {
                let result = conn.select_user(id).await;
                (conn, result)
            })
            .await?;

        debug!("Looked up user {}: found={}", id, user.is_some());
        Ok(user)
    }

    /// Rows come back in whatever order the store returns them.
    pub async fn get_all_users(&self) -> DbResult<Vec<User>> {
        let users = self
            .with_handle("get_all_users", |mut conn| async move {
                let result = conn.select_users().await;
                (conn, result)
            })
            .await?;

        debug!("Loaded {} users", users.len());
        Ok(users)
    }

    /// Replaces both `name` and `email`. An unknown id matches zero rows and
    /// is not an error.
    pub async fn update_user(&self, id: UserId, name: &str, email: &str) -> DbResult<()> {
        let affected = self
            .with_handle("update_user", |mut conn| async move {
                let result = conn.update_user(id, name, email).await;
                (conn, result)
            })
            .await?;

        debug!("Updated user {}: rows_affected={}", id, affected);
        Ok(())
    }

    /// An unknown id matches zero rows and is not an error.
    pub async fn delete_user(&self, id: UserId) -> DbResult<()> {
        let affected = self
            .with_handle("delete_user", |mut conn| async move {
                let result = conn.delete_user(id).await;
                (conn, result)
            })
            .await?;

        debug!("Deleted user {}: rows_affected={}", id, affected);
        Ok(())
    }

    /// Lends a freshly acquired handle to `statement` and releases it once
    /// the statement hands it back. No early return sits between the two.
    async fn with_handle<T, F, Fut>(&self, operation: &'static str, statement: F) -> DbResult<T>
    where
        F: FnOnce(P::Handle) -> Fut,
        Fut: Future<Output = (P::Handle, DbResult<T>)>,
    {
        let handle = self.provider.acquire().await?;
        let (handle, result) = statement(handle).await;
        self.provider.release(handle).await;

        if let Err(e) = &result {
            error!("{} failed: {}", operation, e);
        }
        result
    }
}
