mod admin;
mod auth;
mod health;
mod student;

use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::middleware::auth::require_admin;
use crate::response::json_error;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let admin = admin::router().route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/api", get(api_root))
        .route("/api/", get(api_root))
        .nest("/api/auth", auth::router())
        .nest("/api/student", student::router())
        .nest("/api/admin", admin)
        .nest("/health", health::router())
        .fallback(fallback_handler)
        .with_state(state)
}

async fn api_root() -> impl IntoResponse {
    Json(json!({ "message": "5 Kutu Yöntemi API" }))
}

async fn fallback_handler() -> Response {
    json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "Endpoint bulunamadı").into_response()
}
