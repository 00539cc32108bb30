use std::path::Path;

use chrono::NaiveDate;
use futures::future::BoxFuture;
use futures::FutureExt;
use leitner_algo::BoxNumber;
use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{PgPool, SqlitePool};
use uuid::Uuid;

use crate::db::config::DbConfig;
use crate::db::schema::{schema_statements, POSTGRES_SCHEMA_SQL, SQLITE_SCHEMA_SQL};
use crate::db::{
    DbInitError, NewStudent, NewWord, ProgressRecord, RepoResult, Repository, Student,
    UpsertOutcome, Word,
};

const SELECT_STUDENT_BY_CODE: &str =
    r#"SELECT "id", "code", "name", "className" FROM "students" WHERE "code" = $1 LIMIT 1"#;
const SELECT_STUDENTS: &str =
    r#"SELECT "id", "code", "name", "className" FROM "students" ORDER BY "seq""#;
const INSERT_STUDENT: &str = r#"
    INSERT INTO "students" ("id", "code", "name", "className")
    VALUES ($1, $2, $3, $4)
    ON CONFLICT ("code") DO NOTHING
"#;

const SELECT_WORDS_BY_CLASS: &str = r#"
    SELECT "id", "className", "english", "turkish" FROM "words"
    WHERE "className" = $1
    ORDER BY "seq"
"#;
const SELECT_WORD: &str =
    r#"SELECT "id", "className", "english", "turkish" FROM "words" WHERE "id" = $1 LIMIT 1"#;
const SELECT_WORDS: &str =
    r#"SELECT "id", "className", "english", "turkish" FROM "words" ORDER BY "seq""#;
const COUNT_WORDS_BY_CLASS: &str = r#"SELECT COUNT(*) FROM "words" WHERE "className" = $1"#;
const INSERT_WORD: &str = r#"
    INSERT INTO "words" ("id", "className", "english", "turkish")
    VALUES ($1, $2, $3, $4)
    ON CONFLICT ("className", "english") DO NOTHING
"#;

const PROGRESS_COLUMNS: &str = r#""id", "studentCode", "wordId", "boxNumber", "lastStudiedDate",
    "correctCount", "wrongCount", "version""#;
const INSERT_PROGRESS: &str = r#"
    INSERT INTO "student_progress" (
        "id", "studentCode", "wordId", "boxNumber", "lastStudiedDate",
        "correctCount", "wrongCount", "version"
    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
    ON CONFLICT ("studentCode", "wordId") DO NOTHING
"#;
const UPDATE_PROGRESS: &str = r#"
    UPDATE "student_progress" SET
        "boxNumber" = $1,
        "lastStudiedDate" = $2,
        "correctCount" = $3,
        "wrongCount" = $4,
        "version" = $5
    WHERE "studentCode" = $6 AND "wordId" = $7 AND "version" = $8
"#;

#[derive(Debug, sqlx::FromRow)]
#[sqlx(rename_all = "camelCase")]
struct StudentRow {
    id: String,
    code: String,
    name: String,
    class_name: String,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Self {
            id: row.id,
            code: row.code,
            name: row.name,
            class_name: row.class_name,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
#[sqlx(rename_all = "camelCase")]
struct WordRow {
    id: String,
    class_name: String,
    english: String,
    turkish: String,
}

impl From<WordRow> for Word {
    fn from(row: WordRow) -> Self {
        Self {
            id: row.id,
            class_name: row.class_name,
            english: row.english,
            turkish: row.turkish,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
#[sqlx(rename_all = "camelCase")]
struct ProgressRow {
    id: String,
    student_code: String,
    word_id: String,
    box_number: i32,
    last_studied_date: NaiveDate,
    correct_count: i32,
    wrong_count: i32,
    version: i64,
}

impl From<ProgressRow> for ProgressRecord {
    fn from(row: ProgressRow) -> Self {
        let box_number = BoxNumber::from_stored(i64::from(row.box_number));
        if i64::from(box_number.get()) != i64::from(row.box_number) {
            tracing::warn!(
                word_id = %row.word_id,
                stored = row.box_number,
                clamped = box_number.get(),
                "out-of-range box number in student_progress"
            );
        }

        Self {
            id: row.id,
            student_code: row.student_code,
            word_id: row.word_id,
            box_number,
            last_studied_date: row.last_studied_date,
            correct_count: u32::try_from(row.correct_count).unwrap_or(0),
            wrong_count: u32::try_from(row.wrong_count).unwrap_or(0),
            version: row.version,
        }
    }
}

fn counter(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[derive(Clone)]
enum SqlPool {
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

/// Repository over Postgres (server) or SQLite (desktop). Both dialects
/// share the SQL above; only pool setup and schema files differ.
#[derive(Clone)]
pub struct SqlRepository {
    pool: SqlPool,
}

impl SqlRepository {
    pub async fn connect_postgres(url: &str, config: &DbConfig) -> Result<Self, DbInitError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(url)
            .await?;

        for stmt in schema_statements(POSTGRES_SCHEMA_SQL) {
            sqlx::query(&stmt).execute(&pool).await?;
        }

        Ok(Self {
            pool: SqlPool::Postgres(pool),
        })
    }

    pub async fn connect_sqlite(path: &Path, config: &DbConfig) -> Result<Self, DbInitError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DbInitError::Io(e.to_string()))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(config.sqlite_busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await?;

        for stmt in schema_statements(SQLITE_SCHEMA_SQL) {
            sqlx::query(&stmt).execute(&pool).await?;
        }

        Ok(Self {
            pool: SqlPool::Sqlite(pool),
        })
    }

    pub async fn close(&self) {
        match &self.pool {
            SqlPool::Postgres(pool) => pool.close().await,
            SqlPool::Sqlite(pool) => pool.close().await,
        }
    }
}

impl Repository for SqlRepository {
    fn find_student_by_code<'a>(&'a self, code: &'a str) -> BoxFuture<'a, RepoResult<Option<Student>>> {
        async move {
            let row = match &self.pool {
                SqlPool::Postgres(pool) => {
                    sqlx::query_as::<_, StudentRow>(SELECT_STUDENT_BY_CODE)
                        .bind(code)
                        .fetch_optional(pool)
                        .await?
                }
                SqlPool::Sqlite(pool) => {
                    sqlx::query_as::<_, StudentRow>(SELECT_STUDENT_BY_CODE)
                        .bind(code)
                        .fetch_optional(pool)
                        .await?
                }
            };
            Ok(row.map(Student::from))
        }
        .boxed()
    }

    fn find_words_by_class<'a>(&'a self, class_name: &'a str) -> BoxFuture<'a, RepoResult<Vec<Word>>> {
        async move {
            let rows = match &self.pool {
                SqlPool::Postgres(pool) => {
                    sqlx::query_as::<_, WordRow>(SELECT_WORDS_BY_CLASS)
                        .bind(class_name)
                        .fetch_all(pool)
                        .await?
                }
                SqlPool::Sqlite(pool) => {
                    sqlx::query_as::<_, WordRow>(SELECT_WORDS_BY_CLASS)
                        .bind(class_name)
                        .fetch_all(pool)
                        .await?
                }
            };
            Ok(rows.into_iter().map(Word::from).collect())
        }
        .boxed()
    }

    fn find_word<'a>(&'a self, word_id: &'a str) -> BoxFuture<'a, RepoResult<Option<Word>>> {
        async move {
            let row = match &self.pool {
                SqlPool::Postgres(pool) => {
                    sqlx::query_as::<_, WordRow>(SELECT_WORD)
                        .bind(word_id)
                        .fetch_optional(pool)
                        .await?
                }
                SqlPool::Sqlite(pool) => {
                    sqlx::query_as::<_, WordRow>(SELECT_WORD)
                        .bind(word_id)
                        .fetch_optional(pool)
                        .await?
                }
            };
            Ok(row.map(Word::from))
        }
        .boxed()
    }

    fn count_words_by_class<'a>(&'a self, class_name: &'a str) -> BoxFuture<'a, RepoResult<i64>> {
        async move {
            let count = match &self.pool {
                SqlPool::Postgres(pool) => {
                    sqlx::query_scalar::<_, i64>(COUNT_WORDS_BY_CLASS)
                        .bind(class_name)
                        .fetch_one(pool)
                        .await?
                }
                SqlPool::Sqlite(pool) => {
                    sqlx::query_scalar::<_, i64>(COUNT_WORDS_BY_CLASS)
                        .bind(class_name)
                        .fetch_one(pool)
                        .await?
                }
            };
            Ok(count)
        }
        .boxed()
    }

    fn find_progress_by_student<'a>(
        &'a self,
        student_code: &'a str,
    ) -> BoxFuture<'a, RepoResult<Vec<ProgressRecord>>> {
        async move {
            let sql = format!(
                r#"SELECT {PROGRESS_COLUMNS} FROM "student_progress" WHERE "studentCode" = $1"#
            );
            let rows = match &self.pool {
                SqlPool::Postgres(pool) => {
                    sqlx::query_as::<_, ProgressRow>(&sql)
                        .bind(student_code)
                        .fetch_all(pool)
                        .await?
                }
                SqlPool::Sqlite(pool) => {
                    sqlx::query_as::<_, ProgressRow>(&sql)
                        .bind(student_code)
                        .fetch_all(pool)
                        .await?
                }
            };
            Ok(rows.into_iter().map(ProgressRecord::from).collect())
        }
        .boxed()
    }

    fn find_progress<'a>(
        &'a self,
        student_code: &'a str,
        word_id: &'a str,
    ) -> BoxFuture<'a, RepoResult<Option<ProgressRecord>>> {
        async move {
            let sql = format!(
                r#"SELECT {PROGRESS_COLUMNS} FROM "student_progress"
                WHERE "studentCode" = $1 AND "wordId" = $2 LIMIT 1"#
            );
            let row = match &self.pool {
                SqlPool::Postgres(pool) => {
                    sqlx::query_as::<_, ProgressRow>(&sql)
                        .bind(student_code)
                        .bind(word_id)
                        .fetch_optional(pool)
                        .await?
                }
                SqlPool::Sqlite(pool) => {
                    sqlx::query_as::<_, ProgressRow>(&sql)
                        .bind(student_code)
                        .bind(word_id)
                        .fetch_optional(pool)
                        .await?
                }
            };
            Ok(row.map(ProgressRecord::from))
        }
        .boxed()
    }

    fn upsert_progress<'a>(
        &'a self,
        record: &'a ProgressRecord,
        expected_version: Option<i64>,
    ) -> BoxFuture<'a, RepoResult<UpsertOutcome>> {
        async move {
            let box_number = i32::from(record.box_number.get());
            let correct = counter(record.correct_count);
            let wrong = counter(record.wrong_count);

            let affected = match (expected_version, &self.pool) {
                (None, SqlPool::Postgres(pool)) => sqlx::query(INSERT_PROGRESS)
                    .bind(&record.id)
                    .bind(&record.student_code)
                    .bind(&record.word_id)
                    .bind(box_number)
                    .bind(record.last_studied_date)
                    .bind(correct)
                    .bind(wrong)
                    .bind(record.version)
                    .execute(pool)
                    .await?
                    .rows_affected(),
                (None, SqlPool::Sqlite(pool)) => sqlx::query(INSERT_PROGRESS)
                    .bind(&record.id)
                    .bind(&record.student_code)
                    .bind(&record.word_id)
                    .bind(box_number)
                    .bind(record.last_studied_date)
                    .bind(correct)
                    .bind(wrong)
                    .bind(record.version)
                    .execute(pool)
                    .await?
                    .rows_affected(),
                (Some(expected), SqlPool::Postgres(pool)) => sqlx::query(UPDATE_PROGRESS)
                    .bind(box_number)
                    .bind(record.last_studied_date)
                    .bind(correct)
                    .bind(wrong)
                    .bind(record.version)
                    .bind(&record.student_code)
                    .bind(&record.word_id)
                    .bind(expected)
                    .execute(pool)
                    .await?
                    .rows_affected(),
                (Some(expected), SqlPool::Sqlite(pool)) => sqlx::query(UPDATE_PROGRESS)
                    .bind(box_number)
                    .bind(record.last_studied_date)
                    .bind(correct)
                    .bind(wrong)
                    .bind(record.version)
                    .bind(&record.student_code)
                    .bind(&record.word_id)
                    .bind(expected)
                    .execute(pool)
                    .await?
                    .rows_affected(),
            };

            Ok(if affected == 1 {
                UpsertOutcome::Written
            } else {
                UpsertOutcome::Conflict
            })
        }
        .boxed()
    }

    fn insert_student<'a>(&'a self, student: &'a NewStudent) -> BoxFuture<'a, RepoResult<bool>> {
        async move {
            let id = Uuid::new_v4().to_string();
            let affected = match &self.pool {
                SqlPool::Postgres(pool) => sqlx::query(INSERT_STUDENT)
                    .bind(&id)
                    .bind(&student.code)
                    .bind(&student.name)
                    .bind(&student.class_name)
                    .execute(pool)
                    .await?
                    .rows_affected(),
                SqlPool::Sqlite(pool) => sqlx::query(INSERT_STUDENT)
                    .bind(&id)
                    .bind(&student.code)
                    .bind(&student.name)
                    .bind(&student.class_name)
                    .execute(pool)
                    .await?
                    .rows_affected(),
            };
            Ok(affected == 1)
        }
        .boxed()
    }

    fn insert_word<'a>(&'a self, word: &'a NewWord) -> BoxFuture<'a, RepoResult<bool>> {
        async move {
            let id = Uuid::new_v4().to_string();
            let affected = match &self.pool {
                SqlPool::Postgres(pool) => sqlx::query(INSERT_WORD)
                    .bind(&id)
                    .bind(&word.class_name)
                    .bind(&word.english)
                    .bind(&word.turkish)
                    .execute(pool)
                    .await?
                    .rows_affected(),
                SqlPool::Sqlite(pool) => sqlx::query(INSERT_WORD)
                    .bind(&id)
                    .bind(&word.class_name)
                    .bind(&word.english)
                    .bind(&word.turkish)
                    .execute(pool)
                    .await?
                    .rows_affected(),
            };
            Ok(affected == 1)
        }
        .boxed()
    }

    fn list_students(&self) -> BoxFuture<'_, RepoResult<Vec<Student>>> {
        async move {
            let rows = match &self.pool {
                SqlPool::Postgres(pool) => {
                    sqlx::query_as::<_, StudentRow>(SELECT_STUDENTS).fetch_all(pool).await?
                }
                SqlPool::Sqlite(pool) => {
                    sqlx::query_as::<_, StudentRow>(SELECT_STUDENTS).fetch_all(pool).await?
                }
            };
            Ok(rows.into_iter().map(Student::from).collect())
        }
        .boxed()
    }

    fn list_words(&self) -> BoxFuture<'_, RepoResult<Vec<Word>>> {
        async move {
            let rows = match &self.pool {
                SqlPool::Postgres(pool) => {
                    sqlx::query_as::<_, WordRow>(SELECT_WORDS).fetch_all(pool).await?
                }
                SqlPool::Sqlite(pool) => {
                    sqlx::query_as::<_, WordRow>(SELECT_WORDS).fetch_all(pool).await?
                }
            };
            Ok(rows.into_iter().map(Word::from).collect())
        }
        .boxed()
    }

    fn ping(&self) -> BoxFuture<'_, RepoResult<()>> {
        async move {
            match &self.pool {
                SqlPool::Postgres(pool) => {
                    sqlx::query("SELECT 1").execute(pool).await?;
                }
                SqlPool::Sqlite(pool) => {
                    sqlx::query("SELECT 1").execute(pool).await?;
                }
            }
            Ok(())
        }
        .boxed()
    }

    fn backend_name(&self) -> &'static str {
        match &self.pool {
            SqlPool::Postgres(_) => "postgres",
            SqlPool::Sqlite(_) => "sqlite",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(box_number: i32) -> ProgressRow {
        ProgressRow {
            id: "p1".to_string(),
            student_code: "S1".to_string(),
            word_id: "w1".to_string(),
            box_number,
            last_studied_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            correct_count: 3,
            wrong_count: -1,
            version: 4,
        }
    }

    #[test]
    fn test_progress_row_clamps_box_number() {
        assert_eq!(ProgressRecord::from(row(0)).box_number, BoxNumber::FIRST);
        assert_eq!(ProgressRecord::from(row(-2)).box_number, BoxNumber::FIRST);
        assert_eq!(ProgressRecord::from(row(9)).box_number, BoxNumber::MASTERED);

        let record = ProgressRecord::from(row(3));
        assert_eq!(record.box_number.get(), 3);
        assert_eq!(record.correct_count, 3);
        assert_eq!(record.wrong_count, 0);
        assert_eq!(record.version, 4);
    }
}
