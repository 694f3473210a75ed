use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Verdant API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Marketplace backend for plant sellers, buyers and delivery agents",
        "status": "operational",
        "endpoints": {
            "health": "/health",
            "auth": "/auth",
            "api": "/api",
            "admin": "/admin"
        }
    }))
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
