use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::response::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct StudentLoginRequest {
    code: String,
}

#[derive(Debug, Deserialize)]
struct AdminLoginRequest {
    password: String,
}

#[derive(Serialize)]
struct StudentLoginResponse {
    success: bool,
    student: StudentSummary,
}

#[derive(Serialize)]
struct StudentSummary {
    code: String,
    name: String,
    class_name: String,
}

#[derive(Serialize)]
struct AdminLoginResponse {
    success: bool,
    message: &'static str,
    token: String,
    expires_at: DateTime<Utc>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/student/login", post(student_login))
        .route("/admin/login", post(admin_login))
}

async fn student_login(
    State(state): State<AppState>,
    Json(payload): Json<StudentLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let student = state
        .repo()
        .find_student_by_code(&payload.code)
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "student lookup failed");
            AppError::internal(err.to_string())
        })?
        .ok_or_else(|| AppError::not_found("Öğrenci bulunamadı"))?;

    tracing::info!(student_code = %student.code, "student logged in");

    Ok(Json(StudentLoginResponse {
        success: true,
        student: StudentSummary {
            code: student.code,
            name: student.name,
            class_name: student.class_name,
        },
    }))
}

async fn admin_login(
    State(state): State<AppState>,
    Json(payload): Json<AdminLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let issued = state.admin_auth().login(&payload.password).map_err(|err| {
        tracing::warn!("admin login rejected");
        AppError::from(err)
    })?;

    Ok(Json(AdminLoginResponse {
        success: true,
        message: "Admin girişi başarılı",
        token: issued.token,
        expires_at: issued.expires_at,
    }))
}
