use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{Message, Page, PageQuery, TaskCreate, TaskUpdate},
    services::TaskRegistry,
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

/// Retrieves a page of tasks visible to the authenticated user.
///
/// Members see the tasks they own; superusers see every task. Tasks are
/// returned oldest first.
///
/// ## Query Parameters:
/// - `skip` (optional, default 0): number of tasks to skip.
/// - `limit` (optional, default 100): page size, capped at 100.
///
/// ## Responses:
/// - `200 OK`: `{data: [Task], count}` where `count` is the size of the caller's scope.
/// - `400 Bad Request`: negative `skip` or non-positive `limit`.
/// - `401 Unauthorized`: missing or invalid token.
#[get("")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
    current: CurrentUser,
) -> Result<impl Responder, AppError> {
    let page = Page::try_from(query.into_inner())?;
    let mut session = state.store.begin().await?;
    let tasks = TaskRegistry::new(session.as_mut())
        .list(&current.0, page)
        .await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task owned by the authenticated user.
///
/// ## Request Body:
/// - `title`: 1 to 255 characters (required).
/// - `description` (optional): up to 255 characters.
/// - `status` (optional): `pending` (default), `in_progress`, `completed` or `suspended`.
///
/// Any owner sent in the body is ignored.
///
/// ## Responses:
/// - `201 Created`: the new `Task`.
/// - `401 Unauthorized`: missing or invalid token.
/// - `422 Unprocessable Entity`: the body failed validation.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    task_data: web::Json<TaskCreate>,
    current: CurrentUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let mut session = state.store.begin().await?;
    let task = TaskRegistry::new(session.as_mut())
        .create(task_data.into_inner(), &current.0)
        .await?;
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves a specific task by its ID.
///
/// ## Responses:
/// - `200 OK`: the `Task`.
/// - `403 Forbidden`: the task belongs to someone else and the caller is not a superuser.
/// - `404 Not Found`: no task with this id.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
    current: CurrentUser,
) -> Result<impl Responder, AppError> {
    let mut session = state.store.begin().await?;
    let task = TaskRegistry::new(session.as_mut())
        .get_by_id(task_id.into_inner(), &current.0)
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Updates the fields present in the body; `description: null` clears it.
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `403 Forbidden` / `404 Not Found`: as for `get_task`.
/// - `422 Unprocessable Entity`: the body failed validation.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskUpdate>,
    current: CurrentUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let mut session = state.store.begin().await?;
    let task = TaskRegistry::new(session.as_mut())
        .update(task_id.into_inner(), task_data.into_inner(), &current.0)
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task by its ID.
///
/// ## Responses:
/// - `200 OK`: `{"message": "Task deleted successfully"}`.
/// - `403 Forbidden` / `404 Not Found`: as for `get_task`.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
    current: CurrentUser,
) -> Result<impl Responder, AppError> {
    let mut session = state.store.begin().await?;
    TaskRegistry::new(session.as_mut())
        .delete(task_id.into_inner(), &current.0)
        .await?;
    Ok(HttpResponse::Ok().json(Message::new("Task deleted successfully")))
}
