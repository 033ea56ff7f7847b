use std::env;
use std::path::{Path, PathBuf};

use dotenvy::dotenv;
use storage::repository::DEFAULT_NAMESPACE;

use crate::error::AppError;

pub const DEFAULT_DB_URL: &str = "sqlite://brevet.sqlite3";

/// Runtime settings, read from the environment (and `.env`) then overridden by CLI flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_url: String,
    pub namespace: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let db_url = env::var("BREVET_DB_URL").unwrap_or_else(|_| DEFAULT_DB_URL.to_string());
        let namespace =
            env::var("BREVET_NAMESPACE").unwrap_or_else(|_| DEFAULT_NAMESPACE.to_string());
        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            db_url: normalize_sqlite_url(&db_url),
            namespace,
            rust_log,
        }
    }

    #[must_use]
    pub fn with_overrides(mut self, db_url: Option<String>, namespace: Option<String>) -> Self {
        if let Some(db_url) = db_url {
            self.db_url = normalize_sqlite_url(&db_url);
        }
        if let Some(namespace) = namespace {
            self.namespace = namespace;
        }
        self
    }
}

/// Turns `sqlite:relative.db` or a bare path into an absolute `sqlite://` URL.
pub fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_string();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Creates the database file (and its parent directories) so the first connect succeeds.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), AppError> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| AppError::InvalidDbUrl(db_url.to_string()))?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(AppError::InvalidDbUrl(db_url.to_string()));
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
        tracing::info!(path = %path.display(), "created database file");
    }

    Ok(())
}
