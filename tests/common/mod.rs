#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test, web};
use chrono::Duration;
use jsonwebtoken::Algorithm;
use serde_json::Value;
use std::sync::Arc;
use taskhub::auth::{PasswordHasher, TokenService};
use taskhub::models::{User, UserCreate};
use taskhub::services::UserDirectory;
use taskhub::store::MemoryStore;
use taskhub::AppState;

pub const PASSWORD: &str = "Password123!";

/// Fresh state over an empty in-memory store. bcrypt runs at its minimum cost.
pub fn app_state() -> web::Data<AppState> {
    web::Data::new(AppState::new(
        Arc::new(MemoryStore::new()),
        TokenService::new("integration-test-secret", Algorithm::HS256, Duration::minutes(30)),
        PasswordHasher::new(4),
    ))
}

pub async fn seed_user(state: &AppState, email: &str, is_superuser: bool) -> User {
    let mut session = state.store.begin().await.expect("Failed to open session");
    UserDirectory::new(session.as_mut(), &state.hasher)
        .create(UserCreate {
            email: email.to_string(),
            password: PASSWORD.to_string(),
            is_active: true,
            is_superuser,
            full_name: None,
        })
        .await
        .expect("Failed to seed user")
}

/// `Authorization` header value for `user`.
pub fn bearer(state: &AppState, user: &User) -> String {
    let token = state
        .tokens
        .issue(&user.id.to_string(), state.tokens.ttl())
        .expect("Failed to issue token");
    format!("Bearer {}", token)
}

/// Sends `req` and returns the status plus the JSON body (`Null` when empty).
pub async fn send<S, B>(app: &S, req: actix_http::Request) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}
