pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;

use crate::auth::AuthMiddleware;

pub const API_PREFIX: &str = "/api/v1";

/// Routes under `API_PREFIX`. Static user paths are registered before `/{id}`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::login_access_token)
        .service(
            web::scope("/users")
                .service(users::read_users)
                .service(users::create_user)
                .service(users::register_user)
                .service(users::read_user_me)
                .service(users::update_user_me)
                .service(users::update_password_me)
                .service(users::delete_user_me)
                .service(users::read_user_by_id)
                .service(users::update_user)
                .service(users::delete_user),
        )
        .service(
            web::scope("/tasks")
                .service(tasks::get_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        );
}

/// The whole application: `/health` plus the token-protected API.
pub fn configure_app(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health).service(
        web::scope(API_PREFIX)
            .wrap(AuthMiddleware)
            .configure(config),
    );
}
