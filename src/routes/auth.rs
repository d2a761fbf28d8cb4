use crate::{
    auth::{require_active, AccessToken, LoginForm},
    error::AppError,
    services::UserDirectory,
    state::AppState,
};
use actix_web::{post, web, HttpResponse, Responder};

/// Exchange credentials for an access token
///
/// Accepts an OAuth2 password-flow form (`username` holds the email). Unknown
/// emails and wrong passwords fail identically with 401.
#[post("/login/access-token")]
pub async fn login_access_token(
    state: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> Result<impl Responder, AppError> {
    let form = form.into_inner();

    let mut session = state.store.begin().await?;
    let user = UserDirectory::new(session.as_mut(), &state.hasher)
        .authenticate(&form.username, &form.password)
        .await?
        .ok_or_else(|| {
            log::warn!("rejected login attempt");
            AppError::Unauthorized("Incorrect username or password".into())
        })?;
    drop(session);

    let user = require_active(user)?;
    let token = state.tokens.issue(&user.id.to_string(), state.tokens.ttl())?;

    Ok(HttpResponse::Ok().json(AccessToken::bearer(token)))
}
