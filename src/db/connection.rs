use crate::config::DatabaseConfig;
use crate::db::operations::UserStatements;
use crate::error::{DatabaseError, DbResult};
use async_trait::async_trait;
use sqlx::{Connection, PgConnection};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Callback invoked with every error swallowed by `release`.
pub type ReleaseHook = Arc<dyn Fn(&DatabaseError) + Send + Sync>;

/// Source of per-operation database handles.
///
/// A handle is owned by exactly one operation between `acquire` and
/// `release`. `release` consumes the handle, so it cannot be released twice.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    type Handle: UserStatements + Send;

    /// Opens a new session. Fails with `DatabaseError::ConnectionError`.
    async fn acquire(&self) -> DbResult<Self::Handle>;

    /// Closes a session. Never fails; close errors are logged and reported
    /// to the release hook, if any.
    async fn release(&self, handle: Self::Handle);
}

/// Opens a fresh `PgConnection` for every `acquire`.
pub struct PgConnectionProvider {
    config: DatabaseConfig,
    release_hook: Option<ReleaseHook>,
}

impl PgConnectionProvider {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            release_hook: None,
        }
    }

    pub fn with_release_hook(mut self, hook: ReleaseHook) -> Self {
        self.release_hook = Some(hook);
        self
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    fn report_release_failure(&self, err: DatabaseError) {
        warn!("Error closing connection: {}", err);
        if let Some(hook) = &self.release_hook {
            hook(&err);
        }
    }
}

impl fmt::Debug for PgConnectionProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgConnectionProvider")
            .field("config", &self.config)
            .field("release_hook", &self.release_hook.is_some())
            .finish()
    }
}

#[async_trait]
impl ConnectionProvider for PgConnectionProvider {
    type Handle = PgConnection;

    async fn acquire(&self) -> DbResult<PgConnection> {
        let options = self.config.connect_options();
        match PgConnection::connect_with(&options).await {
            Ok(conn) => {
                debug!(
                    "Opened connection to {}:{}/{}",
                    self.config.host, self.config.port, self.config.name
                );
                Ok(conn)
            }
            Err(e) => {
                error!(
                    "Failed to connect to {}:{}/{}: {}",
                    self.config.host, self.config.port, self.config.name, e
                );
                Err(DatabaseError::connection(e))
            }
        }
    }

    async fn release(&self, handle: PgConnection) {
        match handle.close().await {
            Ok(()) => debug!("Closed connection"),
            Err(e) => self.report_release_failure(DatabaseError::release(e)),
        }
    }
}
