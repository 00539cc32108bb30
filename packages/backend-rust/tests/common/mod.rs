#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use chrono::NaiveDate;
use http_body_util::BodyExt;
use leitner_algo::BoxNumber;
use uuid::Uuid;

use leitner_backend::clock::Clock;
use leitner_backend::config::{AdminConfig, Config};
use leitner_backend::db::memory::MemoryRepository;
use leitner_backend::db::{NewStudent, NewWord, ProgressRecord, Repository, Word};
use leitner_backend::state::AppState;

pub const ADMIN_PASSWORD: &str = "test-admin";

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

pub fn yesterday() -> NaiveDate {
    today().pred_opt().unwrap()
}

pub fn test_config() -> Config {
    Config {
        admin: AdminConfig {
            password: ADMIN_PASSWORD.to_string(),
            token_secret: Some("integration-secret".to_string()),
            password_defaulted: false,
            ..AdminConfig::default()
        },
        clock: Clock::Fixed(today()),
        ..Config::default()
    }
}

pub struct TestApp {
    pub repo: Arc<MemoryRepository>,
    pub router: Router,
}

pub fn create_test_app() -> TestApp {
    let config = test_config();
    let repo = Arc::new(MemoryRepository::new());
    let state = AppState::new(&config, repo.clone());
    let router = leitner_backend::create_app(state, &config.cors_origins);
    TestApp { repo, router }
}

pub async fn add_student(repo: &dyn Repository, code: &str, class_name: &str) {
    let inserted = repo
        .insert_student(&NewStudent {
            code: code.to_string(),
            name: format!("Student {code}"),
            class_name: class_name.to_string(),
        })
        .await
        .unwrap();
    assert!(inserted);
}

pub async fn add_word(repo: &dyn Repository, class_name: &str, english: &str, turkish: &str) -> Word {
    repo.insert_word(&NewWord {
        class_name: class_name.to_string(),
        english: english.to_string(),
        turkish: turkish.to_string(),
    })
    .await
    .unwrap();

    repo.find_words_by_class(class_name)
        .await
        .unwrap()
        .into_iter()
        .find(|w| w.english == english)
        .unwrap()
}

pub async fn set_progress(repo: &dyn Repository, student_code: &str, word_id: &str, box_number: u8, last: NaiveDate) {
    let existing = repo.find_progress(student_code, word_id).await.unwrap();
    let record = ProgressRecord {
        id: Uuid::new_v4().to_string(),
        student_code: student_code.to_string(),
        word_id: word_id.to_string(),
        box_number: BoxNumber::new(box_number).unwrap(),
        last_studied_date: last,
        correct_count: 0,
        wrong_count: 0,
        version: existing.as_ref().map_or(1, |r| r.version + 1),
    };
    repo.upsert_progress(&record, existing.map(|r| r.version))
        .await
        .unwrap();
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn upload_csv(uri: &str, token: &str, file_name: &str, content: &str) -> Request<Body> {
    let boundary = "five-box-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {content}\r\n\
         --{boundary}--\r\n"
    );

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
