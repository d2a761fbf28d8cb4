use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::identity::require_superuser;
use crate::error::AppError;
use crate::models::User;

/// The authenticated caller, as resolved by `AuthMiddleware`.
///
/// If no user is found in the extensions (the middleware did not run for this
/// route), extraction fails with `AppError::Unauthorized`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(current_user(req).map(CurrentUser).map_err(Into::into))
    }
}

/// The authenticated caller, additionally required to be a superuser.
#[derive(Debug, Clone)]
pub struct SuperUser(pub User);

impl FromRequest for SuperUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = current_user(req).and_then(require_superuser);
        ready(result.map(SuperUser).map_err(Into::into))
    }
}

fn current_user(req: &HttpRequest) -> Result<User, AppError> {
    req.extensions()
        .get::<User>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".into()))
}
