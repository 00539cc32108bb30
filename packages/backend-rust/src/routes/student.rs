use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use leitner_algo::BoxNumber;
use serde::{Deserialize, Serialize};

use crate::response::AppError;
use crate::state::AppState;

const DONE_FOR_TODAY: &str = "Bugünlük çalışma tamamlandı!";

#[derive(Debug, Deserialize)]
struct StudyRequest {
    student_code: String,
    word_id: String,
    answer: String,
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

#[derive(Serialize)]
struct StudyResponse {
    is_correct: bool,
    correct_answer: String,
    new_box: BoxNumber,
    message: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/study", post(study))
        .route("/:code/next-word", get(next_word))
        .route("/:code/stats", get(stats))
}

async fn next_word(State(state): State<AppState>, Path(code): Path<String>) -> Result<Response, AppError> {
    let choice = state.word_selector().select_next(&code).await?;

    Ok(match choice {
        Some(choice) => Json(choice).into_response(),
        None => Json(MessageResponse {
            message: DONE_FOR_TODAY,
        })
        .into_response(),
    })
}

async fn study(
    State(state): State<AppState>,
    Json(payload): Json<StudyRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = state
        .progress_updater()
        .record_answer(&payload.student_code, &payload.word_id, &payload.answer)
        .await?;

    let message = if result.is_correct {
        format!("Kelime {}. kutuya geçti!", result.new_box)
    } else {
        "Kelime 1. kutuya döndü.".to_string()
    };

    Ok(Json(StudyResponse {
        is_correct: result.is_correct,
        correct_answer: result.correct_answer,
        new_box: result.new_box,
        message,
    }))
}

async fn stats(State(state): State<AppState>, Path(code): Path<String>) -> Result<impl IntoResponse, AppError> {
    let stats = state.stats_aggregator().compute_stats(&code).await?;
    Ok(Json(stats))
}
