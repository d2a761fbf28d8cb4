pub mod pagination;
pub mod task;
pub mod user;

use serde::{Deserialize, Deserializer, Serialize};
use validator::ValidationError;

pub use pagination::{Page, PageQuery, MAX_LIMIT};
pub use task::{Task, TaskCreate, TaskStatus, TaskUpdate, TasksPublic};
pub use user::{
    UpdatePassword, User, UserCreate, UserPublic, UserRegister, UserUpdate, UserUpdateMe,
    UsersPublic,
};

/// Plain acknowledgement body returned by deletions and password changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Deserializes a nullable patch field so that an explicit `null` (clear) can be
/// told apart from an absent key (leave untouched). Use together with
/// `#[serde(default)]`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub(crate) fn check_nullable_length(
    value: &Option<Option<String>>,
    max: usize,
    code: &'static str,
) -> Result<(), ValidationError> {
    match value {
        Some(Some(text)) if text.chars().count() > max => Err(ValidationError::new(code)),
        _ => Ok(()),
    }
}
