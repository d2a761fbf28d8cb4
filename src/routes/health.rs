use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

use crate::state::AppState;

/// Health check endpoint
///
/// Reports whether a storage session can be opened, plus the current timestamp.
#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> impl Responder {
    match state.store.begin().await {
        Ok(_) => HttpResponse::Ok().json(json!({
            "status": "ok",
            "database": "ok",
            "timestamp": Utc::now()
        })),
        Err(e) => {
            log::error!("health check could not reach storage: {}", e);
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "degraded",
                "database": "unreachable",
                "timestamp": Utc::now()
            }))
        }
    }
}
