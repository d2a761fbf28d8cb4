//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every service operation signals failure through one of its variants; the
//! transport layer is the only place where a variant becomes an HTTP status code.
//!
//! `AppError` implements `actix_web::error::ResponseError` to convert
//! application errors into HTTP responses with JSON bodies of the form
//! `{"error": "<message>"}`. `From` implementations for `sqlx::Error`,
//! `validator::ValidationErrors`, `bcrypt::BcryptError` and `TokenError`
//! allow easy conversion using the `?` operator.

use actix_web::{error::ResponseError, http::header, HttpResponse};
use serde_json::json;
use validator::ValidationErrors;

use crate::auth::token::TokenError;

/// Message for a duplicate email, whichever layer detects it.
pub const EMAIL_TAKEN: &str = "Email already registered.";

/// Unique index on `users.email` (see `migrations/`).
const USERS_EMAIL_KEY: &str = "users_email_key";

/// Represents all possible errors that can occur within the application.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing, invalid or expired credentials (HTTP 401).
    /// The response carries a `WWW-Authenticate: Bearer` challenge.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// Authenticated, but the caller lacks the role or ownership required (HTTP 403).
    #[error("Forbidden: {0}")]
    Forbidden(String),
    /// Malformed caller input such as pagination bounds or a reused password (HTTP 400).
    #[error("Bad Request: {0}")]
    BadRequest(String),
    /// The requested entity does not exist (HTTP 404).
    #[error("Not Found: {0}")]
    NotFound(String),
    /// A uniqueness invariant would be violated (HTTP 409).
    #[error("Conflict: {0}")]
    Conflict(String),
    /// An unexpected server-side error (HTTP 500).
    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
    /// An error originating from the storage layer (HTTP 500).
    #[error("Database Error: {0}")]
    DatabaseError(String),
    /// Request body failed shape validation (HTTP 422 Unprocessable Entity).
    #[error("Validation Error: {0}")]
    ValidationError(String),
}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unauthorized(msg) => HttpResponse::Unauthorized()
                .insert_header((header::WWW_AUTHENTICATE, "Bearer"))
                .json(json!({ "error": msg })),
            AppError::Forbidden(msg) => HttpResponse::Forbidden().json(json!({ "error": msg })),
            AppError::BadRequest(msg) => HttpResponse::BadRequest().json(json!({ "error": msg })),
            AppError::NotFound(msg) => HttpResponse::NotFound().json(json!({ "error": msg })),
            AppError::Conflict(msg) => HttpResponse::Conflict().json(json!({ "error": msg })),
            AppError::InternalServerError(msg) => {
                HttpResponse::InternalServerError().json(json!({ "error": msg }))
            }
            // Storage details stay in the logs.
            AppError::DatabaseError(msg) => {
                log::error!("database error: {}", msg);
                HttpResponse::InternalServerError().json(json!({ "error": "Database error" }))
            }
            AppError::ValidationError(msg) => {
                HttpResponse::UnprocessableEntity().json(json!({ "error": msg }))
            }
        }
    }
}

impl AppError {
    pub fn email_taken() -> Self {
        AppError::Conflict(EMAIL_TAKEN.into())
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` maps to `NotFound` and a unique-constraint violation maps to
/// `Conflict`, which backs up the service-level email check when two writers race.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        if let Some(db_error) = error.as_database_error() {
            if db_error.is_unique_violation() {
                return match db_error.constraint() {
                    Some(USERS_EMAIL_KEY) => AppError::email_taken(),
                    _ => AppError::Conflict("Record already exists".into()),
                };
            }
        }
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(error: sqlx::migrate::MigrateError) -> AppError {
        AppError::DatabaseError(error.to_string())
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Hashing failures are server-side problems, never the caller's.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(format!("Failed to hash password: {}", error))
    }
}

/// The blocking pool dropped a job (shutdown or a panic inside it).
impl From<actix_web::error::BlockingError> for AppError {
    fn from(error: actix_web::error::BlockingError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

impl From<TokenError> for AppError {
    fn from(error: TokenError) -> AppError {
        match error {
            TokenError::Invalid => AppError::Unauthorized("Could not validate credentials".into()),
            TokenError::Issue(msg) => {
                AppError::InternalServerError(format!("Failed to generate token: {}", msg))
            }
        }
    }
}
