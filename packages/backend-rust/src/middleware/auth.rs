use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::Utc;

use crate::response::{json_error, AppError};
use crate::state::AppState;

pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Guards the admin routes with the token issued by `/api/auth/admin/login`.
pub async fn require_admin(State(state): State<AppState>, req: Request<Body>, next: Next) -> Response {
    let Some(token) = extract_bearer_token(req.headers()) else {
        return json_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Yönetici girişi gerekli")
            .into_response();
    };

    if let Err(err) = state.admin_auth().verify_token(token, Utc::now()) {
        tracing::debug!(error = %err, "admin token rejected");
        return AppError::from(err).into_response();
    }

    next.run(req).await
}
