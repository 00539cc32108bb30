use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{NewStudent, NewWord, RepoError, Repository};

const UTF8_BOM: &str = "\u{feff}";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Sadece CSV dosyaları kabul edilir")]
    NotCsv,
    #[error("Dosya UTF-8 olarak okunamadı")]
    Encoding,
    #[error("Satır {row}: {message}")]
    Row { row: u64, message: String },
    #[error("Satır {row}: '{field}' alanı boş")]
    EmptyField { row: u64, field: &'static str },
    #[error(transparent)]
    Repository(#[from] RepoError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub added_count: u64,
    pub skipped_count: u64,
}

#[derive(Debug, Deserialize)]
struct StudentCsvRow {
    code: String,
    name: String,
    class: String,
}

#[derive(Debug, Deserialize)]
struct WordCsvRow {
    class: String,
    english: String,
    turkish: String,
}

pub fn ensure_csv_filename(file_name: Option<&str>) -> Result<(), ImportError> {
    match file_name {
        Some(name) if name.to_ascii_lowercase().ends_with(".csv") => Ok(()),
        _ => Err(ImportError::NotCsv),
    }
}

/// Rows of a `code,name,class` file. Extra columns are ignored.
pub fn parse_students(bytes: &[u8]) -> Result<Vec<NewStudent>, ImportError> {
    read_rows::<StudentCsvRow>(bytes)?
        .into_iter()
        .map(|(row, record)| {
            require(row, "code", &record.code)?;
            require(row, "class", &record.class)?;
            Ok(NewStudent {
                code: record.code,
                name: record.name,
                class_name: record.class,
            })
        })
        .collect()
}

/// Rows of a `class,english,turkish` file; `turkish` may hold several
/// `;`-separated answers.
pub fn parse_words(bytes: &[u8]) -> Result<Vec<NewWord>, ImportError> {
    read_rows::<WordCsvRow>(bytes)?
        .into_iter()
        .map(|(row, record)| {
            require(row, "class", &record.class)?;
            require(row, "english", &record.english)?;
            require(row, "turkish", &record.turkish)?;
            Ok(NewWord {
                class_name: record.class,
                english: record.english,
                turkish: record.turkish,
            })
        })
        .collect()
}

pub async fn import_students(
    repo: &dyn Repository,
    students: &[NewStudent],
) -> Result<ImportSummary, ImportError> {
    let mut summary = ImportSummary {
        added_count: 0,
        skipped_count: 0,
    };
    for student in students {
        if repo.insert_student(student).await? {
            summary.added_count += 1;
        } else {
            summary.skipped_count += 1;
        }
    }
    tracing::info!(added = summary.added_count, skipped = summary.skipped_count, "students imported");
    Ok(summary)
}

pub async fn import_words(repo: &dyn Repository, words: &[NewWord]) -> Result<ImportSummary, ImportError> {
    let mut summary = ImportSummary {
        added_count: 0,
        skipped_count: 0,
    };
    for word in words {
        if repo.insert_word(word).await? {
            summary.added_count += 1;
        } else {
            summary.skipped_count += 1;
        }
    }
    tracing::info!(added = summary.added_count, skipped = summary.skipped_count, "words imported");
    Ok(summary)
}

fn read_rows<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<Vec<(u64, T)>, ImportError> {
    let text = std::str::from_utf8(bytes).map_err(|_| ImportError::Encoding)?;
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for (idx, result) in reader.deserialize::<T>().enumerate() {
        // header is line 1
        let row = idx as u64 + 2;
        let record = result.map_err(|err| ImportError::Row {
            row,
            message: err.to_string(),
        })?;
        rows.push((row, record));
    }
    Ok(rows)
}

fn require(row: u64, field: &'static str, value: &str) -> Result<(), ImportError> {
    if value.is_empty() {
        return Err(ImportError::EmptyField { row, field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryRepository;

    #[test]
    fn test_csv_filename() {
        assert!(ensure_csv_filename(Some("students.csv")).is_ok());
        assert!(ensure_csv_filename(Some("WORDS.CSV")).is_ok());
        assert!(matches!(ensure_csv_filename(Some("words.xlsx")), Err(ImportError::NotCsv)));
        assert!(matches!(ensure_csv_filename(None), Err(ImportError::NotCsv)));
    }

    #[test]
    fn test_parse_students_with_bom_and_padding() {
        let csv = "\u{feff}code,name,class\n S1 , Ayşe Yılmaz ,5A\nS2,Mehmet,5B\n";
        let students = parse_students(csv.as_bytes()).unwrap();
        assert_eq!(students.len(), 2);
        assert_eq!(students[0].code, "S1");
        assert_eq!(students[0].name, "Ayşe Yılmaz");
        assert_eq!(students[1].class_name, "5B");
    }

    #[test]
    fn test_parse_words_keeps_answer_alternatives() {
        let csv = "class,english,turkish\n5A,hello,\"merhaba;selam\"\n";
        let words = parse_words(csv.as_bytes()).unwrap();
        assert_eq!(words[0].turkish, "merhaba;selam");
    }

    #[test]
    fn test_missing_column_reports_row() {
        let csv = "class,english\n5A,hello\n";
        match parse_words(csv.as_bytes()) {
            Err(ImportError::Row { row, .. }) => assert_eq!(row, 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_empty_required_field() {
        let csv = "code,name,class\nS1,Ali,5A\n,Veli,5A\n";
        match parse_students(csv.as_bytes()) {
            Err(ImportError::EmptyField { row, field }) => {
                assert_eq!(row, 3);
                assert_eq!(field, "code");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_rejects_non_utf8() {
        let bytes = [0x63, 0x6f, 0x64, 0x65, 0xff, 0xfe];
        assert!(matches!(parse_students(&bytes), Err(ImportError::Encoding)));
    }

    #[tokio::test]
    async fn test_import_skips_existing() {
        let repo = MemoryRepository::new();
        let csv = "code,name,class\nS1,Ali,5A\nS1,Ali again,5A\nS2,Veli,5A\n";
        let students = parse_students(csv.as_bytes()).unwrap();
        let summary = import_students(&repo, &students).await.unwrap();
        assert_eq!(summary, ImportSummary { added_count: 2, skipped_count: 1 });

        let again = import_students(&repo, &students).await.unwrap();
        assert_eq!(again.added_count, 0);
    }
}
