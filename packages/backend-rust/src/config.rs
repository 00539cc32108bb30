use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::clock::Clock;
use crate::db::config::{DbConfig, DbMode};

const DEFAULT_PORT: u16 = 8001;
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
const DEFAULT_TOKEN_TTL_MINUTES: u64 = 60;
const DEFAULT_MAX_WRITE_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log: LogConfig,
    pub db: DbConfig,
    pub admin: AdminConfig,
    pub cors_origins: CorsOrigins,
    pub study: StudyConfig,
    pub clock: Clock,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: String,
    /// Daily rolling log files are written here when set
    pub file_dir: Option<PathBuf>,
}

#[derive(Clone)]
pub struct AdminConfig {
    pub password: String,
    /// `None` means a random per-process secret; tokens die with the process
    pub token_secret: Option<String>,
    pub token_ttl: Duration,
    pub password_defaulted: bool,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("password", &"<redacted>")
            .field("token_secret", &self.token_secret.as_ref().map(|_| "<redacted>"))
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            password: DEFAULT_ADMIN_PASSWORD.to_string(),
            token_secret: None,
            token_ttl: Duration::from_secs(DEFAULT_TOKEN_TTL_MINUTES * 60),
            password_defaulted: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

impl CorsOrigins {
    pub fn parse(raw: &str) -> Self {
        let origins: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
            CorsOrigins::Any
        } else {
            CorsOrigins::List(origins)
        }
    }
}

#[derive(Debug, Clone)]
pub struct StudyConfig {
    /// Attempts at the progress compare-and-swap before giving up
    pub max_write_attempts: u32,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            max_write_attempts: DEFAULT_MAX_WRITE_ATTEMPTS,
        }
    }
}

/// In-memory repository, default admin settings, local calendar.
impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: DEFAULT_PORT,
            log: LogConfig {
                level: "info".to_string(),
                file_dir: None,
            },
            db: DbConfig::with_mode(DbMode::Memory),
            admin: AdminConfig::default(),
            cors_origins: CorsOrigins::Any,
            study: StudyConfig::default(),
            clock: Clock::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log = LogConfig {
            level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            file_dir: env_bool("ENABLE_FILE_LOGS").unwrap_or(false).then(|| {
                PathBuf::from(std::env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string()))
            }),
        };

        let admin_password = non_empty_env("ADMIN_PASSWORD");
        let admin = AdminConfig {
            password_defaulted: admin_password.is_none(),
            password: admin_password.unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string()),
            token_secret: non_empty_env("ADMIN_TOKEN_SECRET"),
            token_ttl: token_ttl(std::env::var("ADMIN_TOKEN_TTL_MINUTES").ok().as_deref()),
        };

        let study = StudyConfig {
            max_write_attempts: std::env::var("STUDY_MAX_WRITE_ATTEMPTS")
                .ok()
                .and_then(|value| value.parse::<u32>().ok())
                .filter(|attempts| *attempts > 0)
                .unwrap_or(DEFAULT_MAX_WRITE_ATTEMPTS),
        };

        let clock = std::env::var("TZ_MODE")
            .ok()
            .as_deref()
            .and_then(Clock::parse)
            .unwrap_or_default();

        Self {
            host,
            port,
            log,
            db: DbConfig::from_env(),
            admin,
            cors_origins: CorsOrigins::parse(
                &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string()),
            ),
            study,
            clock,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Admin token lifetime from a minute count; unparsable, zero or overflowing
/// values fall back to the default.
fn token_ttl(minutes: Option<&str>) -> Duration {
    let seconds = minutes
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|minutes| *minutes > 0)
        .and_then(|minutes| minutes.checked_mul(60))
        .unwrap_or(DEFAULT_TOKEN_TTL_MINUTES * 60);
    Duration::from_secs(seconds)
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    let value = std::env::var(key).ok()?;
    let normalized = value.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return None;
    }
    match normalized.as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_wildcard() {
        assert_eq!(CorsOrigins::parse("*"), CorsOrigins::Any);
        assert_eq!(CorsOrigins::parse(""), CorsOrigins::Any);
        assert_eq!(CorsOrigins::parse("http://a.test, *"), CorsOrigins::Any);
    }

    #[test]
    fn test_cors_list() {
        assert_eq!(
            CorsOrigins::parse("http://a.test, http://b.test ,"),
            CorsOrigins::List(vec!["http://a.test".to_string(), "http://b.test".to_string()])
        );
    }

    #[test]
    fn test_token_ttl_parsing() {
        let default = Duration::from_secs(DEFAULT_TOKEN_TTL_MINUTES * 60);
        assert_eq!(token_ttl(Some("15")), Duration::from_secs(900));
        assert_eq!(token_ttl(None), default);
        assert_eq!(token_ttl(Some("0")), default);
        assert_eq!(token_ttl(Some("soon")), default);
        assert_eq!(token_ttl(Some(&u64::MAX.to_string())), default);
        assert_eq!(token_ttl(Some(&(u64::MAX / 60 + 1).to_string())), default);
    }

    #[test]
    fn test_admin_config_debug_hides_secrets() {
        let admin = AdminConfig {
            password: "hunter2".to_string(),
            token_secret: Some("s3cret".to_string()),
            ..AdminConfig::default()
        };
        let printed = format!("{admin:?}");
        assert!(!printed.contains("hunter2"));
        assert!(!printed.contains("s3cret"));
    }
}
