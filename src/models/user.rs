use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{check_nullable_length, double_option};

/// An account as stored. Never serialized directly: `hashed_password` must not
/// leave the service, use `UserPublic` for responses.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: Uuid,
    /// Always lowercase.
    pub email: String,
    pub hashed_password: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, hashed_password: String, input: &UserCreate) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            hashed_password,
            is_active: input.is_active,
            is_superuser: input.is_superuser,
            full_name: input.full_name.clone(),
            created_at: Utc::now(),
        }
    }
}

/// Externally visible view of a `User`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPublic {
    pub id: Uuid,
    pub email: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub full_name: Option<String>,
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            full_name: user.full_name,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UsersPublic {
    pub data: Vec<UserPublic>,
    pub count: i64,
}

fn default_true() -> bool {
    true
}

/// Admin-side account creation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserCreate {
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 8, max = 40))]
    pub password: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[validate(length(max = 255))]
    pub full_name: Option<String>,
}

/// Public self-signup. Cannot grant itself any role.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserRegister {
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 8, max = 40))]
    pub password: String,
    #[validate(length(max = 255))]
    pub full_name: Option<String>,
}

impl From<UserRegister> for UserCreate {
    fn from(input: UserRegister) -> Self {
        Self {
            email: input.email,
            password: input.password,
            is_active: true,
            is_superuser: false,
            full_name: input.full_name,
        }
    }
}

/// Partial update applied by a superuser. Absent fields are left untouched;
/// `full_name: null` clears the name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_user_update"))]
pub struct UserUpdate {
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 40))]
    pub password: Option<String>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub full_name: Option<Option<String>>,
}

fn validate_user_update(input: &UserUpdate) -> Result<(), ValidationError> {
    check_nullable_length(&input.full_name, 255, "full_name_length")
}

/// Partial update a user applies to their own record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_user_update_me"))]
pub struct UserUpdateMe {
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub full_name: Option<Option<String>>,
}

fn validate_user_update_me(input: &UserUpdateMe) -> Result<(), ValidationError> {
    check_nullable_length(&input.full_name, 255, "full_name_length")
}

impl From<UserUpdateMe> for UserUpdate {
    fn from(input: UserUpdateMe) -> Self {
        Self {
            email: input.email,
            full_name: input.full_name,
            ..Self::default()
        }
    }
}

/// Only `new_password` is shape-checked; `current_password` is checked
/// against the stored hash.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdatePassword {
    pub current_password: String,
    #[validate(length(min = 8, max = 40))]
    pub new_password: String,
}
