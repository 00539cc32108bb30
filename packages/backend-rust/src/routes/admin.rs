use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::response::AppError;
use crate::services::import::{self, ImportSummary};
use crate::state::AppState;

const UPLOAD_FIELD: &str = "file";

#[derive(Serialize)]
struct UploadResponse {
    message: String,
    added_count: u64,
    skipped_count: u64,
}

impl UploadResponse {
    fn new(summary: ImportSummary, noun: &str) -> Self {
        Self {
            message: format!("{} {noun} başarıyla eklendi", summary.added_count),
            added_count: summary.added_count,
            skipped_count: summary.skipped_count,
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/students", get(list_students))
        .route("/words", get(list_words))
        .route("/students/upload", post(upload_students))
        .route("/words/upload", post(upload_words))
}

async fn upload_students(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let bytes = read_csv_upload(multipart).await?;
    let students = import::parse_students(&bytes)?;
    let summary = import::import_students(state.repo().as_ref(), &students).await?;
    Ok(Json(UploadResponse::new(summary, "öğrenci")))
}

async fn upload_words(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let bytes = read_csv_upload(multipart).await?;
    let words = import::parse_words(&bytes)?;
    let summary = import::import_words(state.repo().as_ref(), &words).await?;
    Ok(Json(UploadResponse::new(summary, "kelime")))
}

async fn list_students(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let students = state.repo().list_students().await.map_err(|err| {
        tracing::error!(error = %err, "listing students failed");
        AppError::internal(err.to_string())
    })?;
    Ok(Json(students))
}

async fn list_words(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let words = state.repo().list_words().await.map_err(|err| {
        tracing::error!(error = %err, "listing words failed");
        AppError::internal(err.to_string())
    })?;
    Ok(Json(words))
}

/// Returns the contents of the `file` field after checking its name.
async fn read_csv_upload(mut multipart: Multipart) -> Result<Vec<u8>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(err.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        import::ensure_csv_filename(field.file_name())?;
        let bytes = field
            .bytes()
            .await
            .map_err(|err| AppError::bad_request(err.body_text()))?;
        return Ok(bytes.to_vec());
    }

    Err(AppError::bad_request("'file' alanı eksik"))
}
