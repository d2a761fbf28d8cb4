use crate::{
    auth::{ensure_owner_or_superuser, CurrentUser, SuperUser},
    error::AppError,
    models::{
        Page, PageQuery, UpdatePassword, UserCreate, UserPublic, UserRegister, UserUpdate,
        UserUpdateMe,
    },
    services::UserDirectory,
    state::AppState,
};
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

/// Lists users, oldest first. Superuser only.
///
/// ## Responses:
/// - `200 OK`: `{data: [UserPublic], count}` where `count` is the total number of users.
/// - `400 Bad Request`: negative `skip` or non-positive `limit`.
/// - `403 Forbidden`: caller is not a superuser.
#[get("")]
pub async fn read_users(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
    _admin: SuperUser,
) -> Result<impl Responder, AppError> {
    let page = Page::try_from(query.into_inner())?;
    let mut session = state.store.begin().await?;
    let users = UserDirectory::new(session.as_mut(), &state.hasher)
        .list(page)
        .await?;
    Ok(HttpResponse::Ok().json(users))
}

/// Creates an account with any role. Superuser only.
///
/// ## Responses:
/// - `201 Created`: the new `UserPublic`.
/// - `409 Conflict`: the email is already registered.
/// - `422 Unprocessable Entity`: the body failed validation.
#[post("")]
pub async fn create_user(
    state: web::Data<AppState>,
    body: web::Json<UserCreate>,
    _admin: SuperUser,
) -> Result<impl Responder, AppError> {
    body.validate()?;
    let mut session = state.store.begin().await?;
    let user = UserDirectory::new(session.as_mut(), &state.hasher)
        .create(body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(UserPublic::from(user)))
}

/// Public self-signup.
///
/// ## Responses:
/// - `201 Created`: the new `UserPublic`.
/// - `400 Bad Request`: the email is already registered.
/// - `422 Unprocessable Entity`: the body failed validation.
#[post("/signup")]
pub async fn register_user(
    state: web::Data<AppState>,
    body: web::Json<UserRegister>,
) -> Result<impl Responder, AppError> {
    body.validate()?;
    let mut session = state.store.begin().await?;
    let user = UserDirectory::new(session.as_mut(), &state.hasher)
        .register(body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(UserPublic::from(user)))
}

#[get("/me")]
pub async fn read_user_me(current: CurrentUser) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(UserPublic::from(current.0)))
}

#[patch("/me")]
pub async fn update_user_me(
    state: web::Data<AppState>,
    body: web::Json<UserUpdateMe>,
    current: CurrentUser,
) -> Result<impl Responder, AppError> {
    body.validate()?;
    let mut session = state.store.begin().await?;
    let user = UserDirectory::new(session.as_mut(), &state.hasher)
        .update_self(&current.0, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(UserPublic::from(user)))
}

#[patch("/me/password")]
pub async fn update_password_me(
    state: web::Data<AppState>,
    body: web::Json<UpdatePassword>,
    current: CurrentUser,
) -> Result<impl Responder, AppError> {
    body.validate()?;
    let mut session = state.store.begin().await?;
    let message = UserDirectory::new(session.as_mut(), &state.hasher)
        .change_own_password(&current.0, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(message))
}

/// Deletes the caller's account and tasks. Superusers get `403`.
#[delete("/me")]
pub async fn delete_user_me(
    state: web::Data<AppState>,
    current: CurrentUser,
) -> Result<impl Responder, AppError> {
    let mut session = state.store.begin().await?;
    let message = UserDirectory::new(session.as_mut(), &state.hasher)
        .delete_self(&current.0)
        .await?;
    Ok(HttpResponse::Ok().json(message))
}

/// Reads one account. Members may only read their own.
#[get("/{id}")]
pub async fn read_user_by_id(
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
    current: CurrentUser,
) -> Result<impl Responder, AppError> {
    let user_id = user_id.into_inner();
    ensure_owner_or_superuser(&current.0, user_id)?;

    let mut session = state.store.begin().await?;
    let user = UserDirectory::new(session.as_mut(), &state.hasher)
        .get_by_id(user_id)
        .await?;
    Ok(HttpResponse::Ok().json(UserPublic::from(user)))
}

#[patch("/{id}")]
pub async fn update_user(
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
    body: web::Json<UserUpdate>,
    _admin: SuperUser,
) -> Result<impl Responder, AppError> {
    body.validate()?;
    let mut session = state.store.begin().await?;
    let user = UserDirectory::new(session.as_mut(), &state.hasher)
        .update_by_id(user_id.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(UserPublic::from(user)))
}

/// Deletes any account, superusers included, along with its tasks.
#[delete("/{id}")]
pub async fn delete_user(
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
    _admin: SuperUser,
) -> Result<impl Responder, AppError> {
    let mut session = state.store.begin().await?;
    let message = UserDirectory::new(session.as_mut(), &state.hasher)
        .delete_by_id(user_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(message))
}
