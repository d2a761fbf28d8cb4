use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use super::{Session, Store, TaskScope};
use crate::error::AppError;
use crate::models::{Page, Task, User};

const USER_COLUMNS: &str =
    "id, email, hashed_password, is_active, is_superuser, full_name, created_at";
const TASK_COLUMNS: &str = "id, title, description, status, owner_id, created_at";

/// Postgres-backed store. Schema and constraints live in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        log::info!("database migrations applied");
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> Result<Box<dyn Session>, AppError> {
        Ok(Box::new(PgSession {
            pool: self.pool.clone(),
            tx: None,
        }))
    }
}

/// Opens its transaction on first use; dropping an uncommitted transaction
/// rolls it back.
pub struct PgSession {
    pool: PgPool,
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgSession {
    async fn tx(&mut self) -> Result<&mut Transaction<'static, Postgres>, AppError> {
        let tx = match self.tx.take() {
            Some(tx) => tx,
            None => self.pool.begin().await?,
        };
        Ok(self.tx.insert(tx))
    }
}

#[async_trait]
impl Session for PgSession {
    async fn get_user(&mut self, id: Uuid) -> Result<Option<User>, AppError> {
        let tx = self.tx().await?;
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?)
    }

    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>, AppError> {
        let tx = self.tx().await?;
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&mut **tx)
            .await?)
    }

    async fn select_users(&mut self, page: Page) -> Result<Vec<User>, AppError> {
        let tx = self.tx().await?;
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id OFFSET $1 LIMIT $2"
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(page.skip())
            .bind(page.limit())
            .fetch_all(&mut **tx)
            .await?)
    }

    async fn count_users(&mut self) -> Result<i64, AppError> {
        let tx = self.tx().await?;
        let (count,) = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM users")
            .fetch_one(&mut **tx)
            .await?;
        Ok(count)
    }

    async fn insert_user(&mut self, user: &User) -> Result<User, AppError> {
        let tx = self.tx().await?;
        let sql = format!(
            "INSERT INTO users (id, email, hashed_password, is_active, is_superuser, full_name, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {USER_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.email)
            .bind(&user.hashed_password)
            .bind(user.is_active)
            .bind(user.is_superuser)
            .bind(&user.full_name)
            .bind(user.created_at)
            .fetch_one(&mut **tx)
            .await?)
    }

    async fn update_user(&mut self, user: &User) -> Result<User, AppError> {
        let tx = self.tx().await?;
        let sql = format!(
            "UPDATE users
             SET email = $2, hashed_password = $3, is_active = $4, is_superuser = $5, full_name = $6
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.email)
            .bind(&user.hashed_password)
            .bind(user.is_active)
            .bind(user.is_superuser)
            .bind(&user.full_name)
            .fetch_one(&mut **tx)
            .await?)
    }

    async fn delete_user(&mut self, id: Uuid) -> Result<(), AppError> {
        let tx = self.tx().await?;
        // tasks go with it through ON DELETE CASCADE
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    async fn get_task(&mut self, id: Uuid) -> Result<Option<Task>, AppError> {
        let tx = self.tx().await?;
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");
        Ok(sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?)
    }

    async fn select_tasks(&mut self, scope: TaskScope, page: Page) -> Result<Vec<Task>, AppError> {
        let tx = self.tx().await?;
        let tasks = match scope {
            TaskScope::All => {
                let sql = format!(
                    "SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at, id OFFSET $1 LIMIT $2"
                );
                sqlx::query_as::<_, Task>(&sql)
                    .bind(page.skip())
                    .bind(page.limit())
                    .fetch_all(&mut **tx)
                    .await?
            }
            TaskScope::OwnedBy(owner_id) => {
                let sql = format!(
                    "SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = $1
                     ORDER BY created_at, id OFFSET $2 LIMIT $3"
                );
                sqlx::query_as::<_, Task>(&sql)
                    .bind(owner_id)
                    .bind(page.skip())
                    .bind(page.limit())
                    .fetch_all(&mut **tx)
                    .await?
            }
        };
        Ok(tasks)
    }

    async fn count_tasks(&mut self, scope: TaskScope) -> Result<i64, AppError> {
        let tx = self.tx().await?;
        let (count,) = match scope {
            TaskScope::All => {
                sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM tasks")
                    .fetch_one(&mut **tx)
                    .await?
            }
            TaskScope::OwnedBy(owner_id) => {
                sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM tasks WHERE owner_id = $1")
                    .bind(owner_id)
                    .fetch_one(&mut **tx)
                    .await?
            }
        };
        Ok(count)
    }

    async fn insert_task(&mut self, task: &Task) -> Result<Task, AppError> {
        let tx = self.tx().await?;
        let sql = format!(
            "INSERT INTO tasks (id, title, description, status, owner_id, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {TASK_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Task>(&sql)
            .bind(task.id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.status)
            .bind(task.owner_id)
            .bind(task.created_at)
            .fetch_one(&mut **tx)
            .await?)
    }

    async fn update_task(&mut self, task: &Task) -> Result<Task, AppError> {
        let tx = self.tx().await?;
        let sql = format!(
            "UPDATE tasks SET title = $2, description = $3, status = $4
             WHERE id = $1
             RETURNING {TASK_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Task>(&sql)
            .bind(task.id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.status)
            .fetch_one(&mut **tx)
            .await?)
    }

    async fn delete_task(&mut self, id: Uuid) -> Result<(), AppError> {
        let tx = self.tx().await?;
        sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), AppError> {
        if let Some(tx) = self.tx.take() {
            tx.commit().await?;
        }
        Ok(())
    }
}
