use std::path::PathBuf;

use crate::orders::manager::DEFAULT_EVENT_CHANNEL_CAPACITY;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | WORK_DIR | ./work_dir | Working directory (database, logs) |
/// | HTTP_PORT | 3000 | HTTP port |
/// | ENVIRONMENT | development | development, staging or production |
/// | LOG_LEVEL | info | Default log level (`RUST_LOG` overrides) |
/// | LOG_JSON | false in development | JSON log output |
/// | CATALOG_PATH | $WORK_DIR/catalog.json | Catalog document |
/// | DATABASE_FILE | floor.redb | redb file name inside WORK_DIR |
/// | EVENT_CHANNEL_CAPACITY | 1024 | Lifecycle event buffer |
///
/// ```ignore
/// WORK_DIR=/data/floor HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for the database and logs
    pub work_dir: String,
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    /// Catalog JSON document; unset means `<work_dir>/catalog.json`
    pub catalog_path: Option<String>,
    pub database_file: String,
    pub event_channel_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Missing variables fall back to defaults
    pub fn from_env() -> Self {
        let environment =
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let default_json = environment == "production";
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./work_dir".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default_json),
            catalog_path: std::env::var("CATALOG_PATH").ok().filter(|p| !p.is_empty()),
            database_file: std::env::var("DATABASE_FILE").unwrap_or_else(|_| "floor.redb".into()),
            event_channel_capacity: std::env::var("EVENT_CHANNEL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_EVENT_CHANNEL_CAPACITY),
            environment,
        }
    }

    /// Override the working directory and port
    ///
    /// Used by tests
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config.catalog_path = None;
        config
    }

    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join(&self.database_file)
    }

    pub fn catalog_path(&self) -> PathBuf {
        match &self.catalog_path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(&self.work_dir).join("catalog.json"),
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
