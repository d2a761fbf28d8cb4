use uuid::Uuid;

use crate::error::AppError;
use crate::models::User;

/// Authority a user holds. Stored as the `is_superuser` flag, but call sites
/// match on the role so more can be added without reshaping them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Member,
    Admin,
}

impl User {
    pub fn role(&self) -> Role {
        if self.is_superuser {
            Role::Admin
        } else {
            Role::Member
        }
    }
}

/// Allows `actor` to act on a record owned by `owner_id` if it is theirs or
/// they are an admin. Shared by the user and task services.
pub fn ensure_owner_or_superuser(actor: &User, owner_id: Uuid) -> Result<(), AppError> {
    match actor.role() {
        Role::Admin => Ok(()),
        Role::Member if actor.id == owner_id => Ok(()),
        Role::Member => {
            log::warn!(
                "user {} denied access to a record owned by {}",
                actor.id,
                owner_id
            );
            Err(AppError::Forbidden("Not enough permissions".into()))
        }
    }
}
