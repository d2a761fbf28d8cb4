use uuid::Uuid;

use super::authority::Role;
use super::token::TokenService;
use crate::error::AppError;
use crate::models::User;
use crate::store::Store;

fn credentials_error() -> AppError {
    AppError::Unauthorized("Could not validate credentials".into())
}

/// Turns a bearer token into the `User` it names.
///
/// A bad signature, an expired token, a subject that is not a user id and a
/// subject whose user no longer exists all produce the same `Unauthorized`.
pub async fn resolve(store: &dyn Store, tokens: &TokenService, token: &str) -> Result<User, AppError> {
    let subject = tokens.decode(token).map_err(|_| credentials_error())?;
    let user_id = Uuid::parse_str(&subject).map_err(|_| credentials_error())?;

    let mut session = store.begin().await?;
    session.get_user(user_id).await?.ok_or_else(|| {
        log::debug!("token subject {} has no matching user", user_id);
        credentials_error()
    })
}

pub fn require_superuser(user: User) -> Result<User, AppError> {
    match user.role() {
        Role::Admin => Ok(user),
        Role::Member => Err(AppError::Forbidden(
            "The user doesn't have enough privileges".into(),
        )),
    }
}

pub fn require_active(user: User) -> Result<User, AppError> {
    if user.is_active {
        Ok(user)
    } else {
        Err(AppError::BadRequest("Inactive user".into()))
    }
}
