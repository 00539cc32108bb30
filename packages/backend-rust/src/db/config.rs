use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbMode {
    ServerPostgres { url: String },
    DesktopSqlite { path: PathBuf },
    Memory,
}

impl DbMode {
    /// `memory` selects the in-process store, `sqlite:<path>` a SQLite file,
    /// anything else is handed to Postgres. Without a URL the SQLite file in
    /// the local data directory is used.
    pub fn from_url(url: Option<&str>) -> Self {
        let Some(url) = url.map(str::trim).filter(|value| !value.is_empty()) else {
            return DbMode::DesktopSqlite {
                path: default_sqlite_path(),
            };
        };

        if url.eq_ignore_ascii_case("memory") {
            return DbMode::Memory;
        }

        if let Some(rest) = url.strip_prefix("sqlite://").or_else(|| url.strip_prefix("sqlite:")) {
            let rest = rest.split('?').next().unwrap_or_default();
            return DbMode::DesktopSqlite {
                path: resolve_path(rest),
            };
        }

        DbMode::ServerPostgres {
            url: url.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub mode: DbMode,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub sqlite_busy_timeout: Duration,
}

impl DbConfig {
    pub fn from_env() -> Self {
        let url = std::env::var("DATABASE_URL").ok();
        Self {
            mode: DbMode::from_url(url.as_deref()),
            max_connections: env_u32("DB_MAX_CONNECTIONS", 10),
            acquire_timeout: Duration::from_millis(env_u64("DB_ACQUIRE_TIMEOUT_MS", 5000)),
            sqlite_busy_timeout: Duration::from_millis(env_u64("SQLITE_BUSY_TIMEOUT_MS", 30000)),
        }
    }

    pub fn with_mode(mode: DbMode) -> Self {
        Self {
            mode,
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
            sqlite_busy_timeout: Duration::from_secs(30),
        }
    }
}

pub fn default_sqlite_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("five-box")
        .join("data.db")
}

fn resolve_path(value: &str) -> PathBuf {
    let raw = Path::new(value);
    if raw.is_absolute() {
        return raw.to_path_buf();
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(raw)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_mode() {
        assert_eq!(DbMode::from_url(Some("memory")), DbMode::Memory);
        assert_eq!(DbMode::from_url(Some(" MEMORY ")), DbMode::Memory);
    }

    #[test]
    fn test_sqlite_mode_strips_prefix_and_query() {
        let mode = DbMode::from_url(Some("sqlite:///tmp/five-box.db?mode=rwc"));
        assert_eq!(
            mode,
            DbMode::DesktopSqlite {
                path: PathBuf::from("/tmp/five-box.db")
            }
        );
    }

    #[test]
    fn test_postgres_mode() {
        let url = "postgres://user:pw@localhost/five_box";
        assert_eq!(
            DbMode::from_url(Some(url)),
            DbMode::ServerPostgres { url: url.to_string() }
        );
    }

    #[test]
    fn test_missing_url_falls_back_to_local_sqlite() {
        assert_eq!(
            DbMode::from_url(None),
            DbMode::DesktopSqlite {
                path: default_sqlite_path()
            }
        );
        assert!(matches!(DbMode::from_url(Some("  ")), DbMode::DesktopSqlite { .. }));
    }
}
