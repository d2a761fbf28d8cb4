use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{check_nullable_length, double_option};

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started yet.
    #[default]
    Pending,
    /// Currently being worked on.
    InProgress,
    /// Finished.
    Completed,
    /// Put on hold.
    Suspended,
}

/// Input for creating a task. Any `owner_id` sent by the client is ignored;
/// the owner is always the caller.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TaskCreate {
    /// Must be between 1 and 255 characters.
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    /// Maximum length of 255 characters if provided.
    #[validate(length(max = 255))]
    pub description: Option<String>,

    /// Defaults to `pending`.
    #[serde(default)]
    pub status: TaskStatus,
}

/// Partial update for a task. Absent fields are left untouched and
/// `description: null` clears the description.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_task_update"))]
pub struct TaskUpdate {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    pub status: Option<TaskStatus>,
}

fn validate_task_update(input: &TaskUpdate) -> Result<(), ValidationError> {
    check_nullable_length(&input.description, 255, "description_length")
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    /// Identifier of the user who owns the task.
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TasksPublic {
    pub data: Vec<Task>,
    pub count: i64,
}

impl Task {
    /// Creates a new `Task` owned by `owner_id` with a fresh id.
    pub fn new(input: TaskCreate, owner_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            status: input.status,
            owner_id,
            created_at: Utc::now(),
        }
    }

    /// Applies the fields present in `patch`.
    pub fn apply(&mut self, patch: TaskUpdate) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}
