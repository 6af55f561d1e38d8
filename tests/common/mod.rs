//! In-memory stand-in for the PostgreSQL provider.
//!
//! Counts every acquire and release and can be told to fail at connect,
//! statement, or close time.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use user_repository::{ConnectionProvider, DatabaseError, DbResult, User, UserId, UserStatements};

#[derive(Default)]
struct Table {
    last_id: UserId,
    rows: Vec<User>,
}

#[derive(Default)]
struct Faults {
    refuse_connections: AtomicBool,
    fail_statements: AtomicBool,
    fail_close: AtomicBool,
    withhold_generated_ids: AtomicBool,
}

#[derive(Default)]
pub struct CountingProvider {
    table: Arc<Mutex<Table>>,
    faults: Arc<Faults>,
    acquired: AtomicUsize,
    released: AtomicUsize,
    release_failures: AtomicUsize,
}

impl CountingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn release_failures(&self) -> usize {
        self.release_failures.load(Ordering::SeqCst)
    }

    pub fn refuse_connections(&self, on: bool) {
        self.faults.refuse_connections.store(on, Ordering::SeqCst);
    }

    pub fn fail_statements(&self, on: bool) {
        self.faults.fail_statements.store(on, Ordering::SeqCst);
    }

    pub fn fail_close(&self, on: bool) {
        self.faults.fail_close.store(on, Ordering::SeqCst);
    }

    pub fn withhold_generated_ids(&self, on: bool) {
        self.faults.withhold_generated_ids.store(on, Ordering::SeqCst);
    }

    /// Number of rows currently stored.
    pub fn row_count(&self) -> usize {
        self.table.lock().unwrap().rows.len()
    }
}

pub struct FakeHandle {
    table: Arc<Mutex<Table>>,
    faults: Arc<Faults>,
}

impl FakeHandle {
    fn check(&self) -> DbResult<()> {
        if self.faults.fail_statements.load(Ordering::SeqCst) {
            return Err(DatabaseError::StoreError(
                "syntax error at or near \"users\"".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStatements for FakeHandle {
    async fn insert_user(&mut self, name: &str, email: &str) -> DbResult<Option<UserId>> {
        self.check()?;
        let mut table = self.table.lock().unwrap();
        table.last_id += 1;
        let id = table.last_id;
        table.rows.push(User::new(id, name, email));

        if self.faults.withhold_generated_ids.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(Some(id))
    }

    async fn select_user(&mut self, id: UserId) -> DbResult<Option<User>> {
        self.check()?;
        let table = self.table.lock().unwrap();
        Ok(table.rows.iter().find(|user| user.id == id).cloned())
    }

    async fn select_users(&mut self) -> DbResult<Vec<User>> {
        self.check()?;
        Ok(self.table.lock().unwrap().rows.clone())
    }

    async fn update_user(&mut self, id: UserId, name: &str, email: &str) -> DbResult<u64> {
        self.check()?;
        let mut table = self.table.lock().unwrap();
        let mut affected = 0;
        for user in table.rows.iter_mut().filter(|user| user.id == id) {
            user.name = name.to_string();
            user.email = email.to_string();
            affected += 1;
        }
        Ok(affected)
    }

    async fn delete_user(&mut self, id: UserId) -> DbResult<u64> {
        self.check()?;
        let mut table = self.table.lock().unwrap();
        let before = table.rows.len();
        table.rows.retain(|user| user.id != id);
        Ok((before - table.rows.len()) as u64)
    }
}

#[async_trait]
impl ConnectionProvider for CountingProvider {
    type Handle = FakeHandle;

    async fn acquire(&self) -> DbResult<FakeHandle> {
        if self.faults.refuse_connections.load(Ordering::SeqCst) {
            return Err(DatabaseError::ConnectionError(
                "password authentication failed for user \"postgres\"".to_string(),
            ));
        }
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(FakeHandle {
            table: self.table.clone(),
            faults: self.faults.clone(),
        })
    }

    async fn release(&self, _handle: FakeHandle) {
        self.released.fetch_add(1, Ordering::SeqCst);
        if self.faults.fail_close.load(Ordering::SeqCst) {
            self.release_failures.fetch_add(1, Ordering::SeqCst);
            tracing::warn!("Error closing connection: connection reset by peer");
        }
    }
}
