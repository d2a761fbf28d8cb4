use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{Session, Store, TaskScope};
use crate::error::AppError;
use crate::models::{Page, Task, User};

#[derive(Debug, Clone, Default)]
struct Tables {
    // kept in insertion order, which is also `created_at, id` order
    users: Vec<User>,
    tasks: Vec<Task>,
}

/// In-process store with the same uniqueness and cascade rules as the
/// Postgres schema. Sessions are serialized: one holds the tables until it is
/// dropped.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn Session>, AppError> {
        let committed = Arc::clone(&self.tables).lock_owned().await;
        let working = committed.clone();
        Ok(Box::new(MemorySession { committed, working }))
    }
}

pub struct MemorySession {
    committed: OwnedMutexGuard<Tables>,
    working: Tables,
}

fn page_of<T: Clone>(rows: impl Iterator<Item = T>, page: Page) -> Vec<T> {
    rows.skip(page.skip() as usize)
        .take(page.limit() as usize)
        .collect()
}

impl MemorySession {
    fn ensure_email_free(&self, email: &str, owner: Uuid) -> Result<(), AppError> {
        if self
            .working
            .users
            .iter()
            .any(|u| u.email == email && u.id != owner)
        {
            return Err(AppError::email_taken());
        }
        Ok(())
    }
}

#[async_trait]
impl Session for MemorySession {
    async fn get_user(&mut self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.working.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.working.users.iter().find(|u| u.email == email).cloned())
    }

    async fn select_users(&mut self, page: Page) -> Result<Vec<User>, AppError> {
        Ok(page_of(self.working.users.iter().cloned(), page))
    }

    async fn count_users(&mut self) -> Result<i64, AppError> {
        Ok(self.working.users.len() as i64)
    }

    async fn insert_user(&mut self, user: &User) -> Result<User, AppError> {
        self.ensure_email_free(&user.email, user.id)?;
        if self.working.users.iter().any(|u| u.id == user.id) {
            return Err(AppError::Conflict("User already exists".into()));
        }
        self.working.users.push(user.clone());
        Ok(user.clone())
    }

    async fn update_user(&mut self, user: &User) -> Result<User, AppError> {
        self.ensure_email_free(&user.email, user.id)?;
        let stored = self
            .working
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| AppError::NotFound("Record not found".into()))?;
        *stored = User {
            created_at: stored.created_at,
            ..user.clone()
        };
        Ok(stored.clone())
    }

    async fn delete_user(&mut self, id: Uuid) -> Result<(), AppError> {
        self.working.users.retain(|u| u.id != id);
        self.working.tasks.retain(|t| t.owner_id != id);
        Ok(())
    }

    async fn get_task(&mut self, id: Uuid) -> Result<Option<Task>, AppError> {
        Ok(self.working.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn select_tasks(&mut self, scope: TaskScope, page: Page) -> Result<Vec<Task>, AppError> {
        let rows = self
            .working
            .tasks
            .iter()
            .filter(|t| scope.includes(t))
            .cloned();
        Ok(page_of(rows, page))
    }

    async fn count_tasks(&mut self, scope: TaskScope) -> Result<i64, AppError> {
        Ok(self
            .working
            .tasks
            .iter()
            .filter(|t| scope.includes(t))
            .count() as i64)
    }

    async fn insert_task(&mut self, task: &Task) -> Result<Task, AppError> {
        if !self.working.users.iter().any(|u| u.id == task.owner_id) {
            return Err(AppError::DatabaseError(format!(
                "task owner {} does not exist",
                task.owner_id
            )));
        }
        self.working.tasks.push(task.clone());
        Ok(task.clone())
    }

    async fn update_task(&mut self, task: &Task) -> Result<Task, AppError> {
        let stored = self
            .working
            .tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or_else(|| AppError::NotFound("Record not found".into()))?;
        stored.title = task.title.clone();
        stored.description = task.description.clone();
        stored.status = task.status;
        Ok(stored.clone())
    }

    async fn delete_task(&mut self, id: Uuid) -> Result<(), AppError> {
        self.working.tasks.retain(|t| t.id != id);
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), AppError> {
        *self.committed = self.working.clone();
        Ok(())
    }
}
