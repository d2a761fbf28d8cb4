//! Persistence gateway.
//!
//! A `Store` is the process-wide storage engine, built once at startup and
//! shared through `AppState`. Every request opens its own `Session`, a unit of
//! work: reads see the session's own writes, `commit` publishes them, and a
//! session dropped without committing discards everything it wrote.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::models::{Page, Task, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Which tasks a filtered select or count covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskScope {
    All,
    OwnedBy(Uuid),
}

impl TaskScope {
    pub fn includes(&self, task: &Task) -> bool {
        match self {
            TaskScope::All => true,
            TaskScope::OwnedBy(owner_id) => task.owner_id == *owner_id,
        }
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn Session>, AppError>;
}

/// Request-scoped unit of work. Selects are ordered by `created_at, id`.
///
/// Inserts and updates return the row as stored. Writing an email that another
/// user already holds fails with `AppError::Conflict`; deleting a user deletes
/// the tasks it owns.
#[async_trait]
pub trait Session: Send {
    async fn get_user(&mut self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>, AppError>;
    async fn select_users(&mut self, page: Page) -> Result<Vec<User>, AppError>;
    async fn count_users(&mut self) -> Result<i64, AppError>;
    async fn insert_user(&mut self, user: &User) -> Result<User, AppError>;
    async fn update_user(&mut self, user: &User) -> Result<User, AppError>;
    async fn delete_user(&mut self, id: Uuid) -> Result<(), AppError>;

    async fn get_task(&mut self, id: Uuid) -> Result<Option<Task>, AppError>;
    async fn select_tasks(&mut self, scope: TaskScope, page: Page) -> Result<Vec<Task>, AppError>;
    async fn count_tasks(&mut self, scope: TaskScope) -> Result<i64, AppError>;
    async fn insert_task(&mut self, task: &Task) -> Result<Task, AppError>;
    async fn update_task(&mut self, task: &Task) -> Result<Task, AppError>;
    async fn delete_task(&mut self, id: Uuid) -> Result<(), AppError>;

    async fn commit(&mut self) -> Result<(), AppError>;
}

/// Builds the store named by `DATABASE_URL`, applying migrations for Postgres.
pub async fn connect(config: &Config) -> Result<Arc<dyn Store>, AppError> {
    if config.uses_memory_store() {
        log::warn!("using the in-memory store; data is lost on shutdown");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = PgStore::connect(&config.database_url, config.database_max_connections).await?;
    store.migrate().await?;
    Ok(Arc::new(store))
}
