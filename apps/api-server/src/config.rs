//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use social_infra::database::DatabaseConfig;

/// Default image size limit: 10 MiB.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub media: MediaConfig,
    /// Apply pending migrations before serving.
    pub auto_migrate: bool,
}

/// Where uploads are written and how they are addressed.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    pub root: PathBuf,
    /// URL prefix, always ending in `/`.
    pub url_prefix: String,
    pub max_upload_bytes: usize,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("media"),
            url_prefix: "/media/".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let database = var("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .map(|url| {
                let mut config = DatabaseConfig::new(url);
                if let Some(max) = parse(var("DB_MAX_CONNECTIONS")) {
                    config.max_connections = max;
                }
                if let Some(min) = parse(var("DB_MIN_CONNECTIONS")) {
                    config.min_connections = min;
                }
                config.sqlx_logging = flag(var("DB_LOG_STATEMENTS"));
                config
            });

        let defaults = MediaConfig::default();
        let media = MediaConfig {
            root: var("MEDIA_ROOT").map(PathBuf::from).unwrap_or(defaults.root),
            url_prefix: var("MEDIA_URL")
                .map(|url| normalize_prefix(&url))
                .unwrap_or(defaults.url_prefix),
            max_upload_bytes: parse(var("MAX_UPLOAD_BYTES")).unwrap_or(defaults.max_upload_bytes),
        };

        Self {
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse(var("PORT")).unwrap_or(8000),
            database,
            media,
            auto_migrate: flag(var("AUTO_MIGRATE")),
        }
    }
}

fn parse<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|s| s.trim().parse().ok())
}

fn flag(value: Option<String>) -> bool {
    value
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

/// `media`, `/media` and `/media/` all become `/media/`.
/// Absolute URLs keep their scheme and host.
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.contains("://") {
        return format!("{trimmed}/");
    }
    let trimmed = trimmed.trim_start_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}
