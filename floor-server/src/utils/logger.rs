//! Logging Infrastructure
//!
//! Structured logging for development (pretty console) and production (JSON).
//! With a log directory configured, events are also written to daily files:
//! - `app/app.YYYY-MM-DD` application logs, deleted after 14 days
//! - `audit/audit.YYYY-MM-DD` order lifecycle audit trail, never deleted

use std::fs;
use std::path::{Path, PathBuf};
use tracing::Metadata;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::Layered;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, prelude::*};

/// Target used by [`audit_log!`](crate::audit_log)
pub const AUDIT_TARGET: &str = "audit";

/// Days application logs are kept
pub const APP_LOG_RETENTION_DAYS: i64 = 14;

type BaseSubscriber = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<BaseSubscriber> + Send + Sync>;

/// Clean up old application log files (older than 14 days)
///
/// Audit logs are left alone.
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<usize> {
    let cutoff = chrono::Local::now().date_naive() - chrono::Duration::days(APP_LOG_RETENTION_DAYS);
    let app_log_dir = log_dir.join("app");
    if !app_log_dir.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(app_log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        // tracing-appender names daily files `app.YYYY-MM-DD`
        let Some(date_part) = name.strip_prefix("app.") else {
            continue;
        };
        if let Ok(date) = chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            && date < cutoff
        {
            fs::remove_file(&path)?;
            removed += 1;
            tracing::info!(file = %name, "Deleted old log file");
        }
    }

    Ok(removed)
}

fn is_audit(meta: &Metadata<'_>) -> bool {
    meta.target() == AUDIT_TARGET
}

fn is_not_audit(meta: &Metadata<'_>) -> bool {
    meta.target() != AUDIT_TARGET
}

fn console_layer(level: &str, json_format: bool) -> BoxedLayer {
    let layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true);
    if json_format {
        layer
            .json()
            .with_current_span(true)
            .with_thread_ids(true)
            .with_filter(EnvFilter::new(level))
            .boxed()
    } else {
        layer.with_filter(EnvFilter::new(level)).boxed()
    }
}

fn file_layer(
    dir: PathBuf,
    prefix: &str,
    json_format: bool,
    filter: fn(&Metadata<'_>) -> bool,
) -> BoxedLayer {
    let appender = RollingFileAppender::new(Rotation::DAILY, dir, prefix);
    let layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(appender));
    let filter = tracing_subscriber::filter::filter_fn(filter);
    if json_format {
        layer.json().with_current_span(true).with_filter(filter).boxed()
    } else {
        layer.with_filter(filter).boxed()
    }
}

/// Initialize the logging system with daily rotating logs
///
/// # Arguments
/// * `level` - Log level (e.g., "info", "debug", "warn"); `RUST_LOG` wins when set
/// * `json_format` - Whether to use JSON format (true for production)
/// * `log_dir` - Optional directory for file logging
///
/// Must be called inside a tokio runtime when `log_dir` is set (spawns the
/// cleanup task).
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let mut layers = vec![console_layer(level, json_format)];

    if let Some(dir) = log_dir {
        let log_dir = Path::new(dir);
        let app_log_dir = log_dir.join("app");
        let audit_log_dir = log_dir.join("audit");
        fs::create_dir_all(&app_log_dir)?;
        fs::create_dir_all(&audit_log_dir)?;

        layers.push(file_layer(app_log_dir, "app", json_format, is_not_audit));
        layers.push(file_layer(audit_log_dir, "audit", json_format, is_audit));

        tokio::spawn(periodic_cleanup(log_dir.to_path_buf()));
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()?;

    Ok(())
}

/// Initialize the logging system (console only)
pub fn init_logger(level: &str, json_format: bool) -> anyhow::Result<()> {
    init_logger_with_file(level, json_format, None)
}

/// Periodic cleanup task - runs every hour
async fn periodic_cleanup(log_dir: PathBuf) {
    use tokio::time::{Duration, sleep};

    loop {
        sleep(Duration::from_secs(3600)).await;

        if let Err(e) = cleanup_old_logs(&log_dir) {
            tracing::error!(error = %e, "Failed to cleanup old logs");
        }
    }
}

/// Audit log helper - records order lifecycle operations
///
/// ```ignore
/// audit_log!("qc-lead", "kickback", "AG001");
/// audit_log!("system", "progress", "AG001", "CNC -> Finish");
/// ```
#[macro_export]
macro_rules! audit_log {
    ($actor:expr, $action:expr, $order_id:expr) => {
        tracing::info!(
            target: "audit",
            actor = $actor,
            action = $action,
            order_id = $order_id,
            "AUDIT"
        );
    };
    ($actor:expr, $action:expr, $order_id:expr, $details:expr) => {
        tracing::info!(
            target: "audit",
            actor = $actor,
            action = $action,
            order_id = $order_id,
            details = $details,
            "AUDIT"
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_removes_only_expired_app_logs() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("app");
        let audit = dir.path().join("audit");
        fs::create_dir_all(&app).unwrap();
        fs::create_dir_all(&audit).unwrap();

        let today = chrono::Local::now().date_naive();
        let old = today - chrono::Duration::days(30);
        let old_name = format!("app.{}", old.format("%Y-%m-%d"));
        let new_name = format!("app.{}", today.format("%Y-%m-%d"));
        let audit_name = format!("audit.{}", old.format("%Y-%m-%d"));

        fs::write(app.join(&old_name), "old").unwrap();
        fs::write(app.join(&new_name), "new").unwrap();
        fs::write(audit.join(&audit_name), "audit").unwrap();

        let removed = cleanup_old_logs(dir.path()).unwrap();
        assert_eq!(removed, 1);
        assert!(!app.join(old_name).exists());
        assert!(app.join(new_name).exists());
        assert!(audit.join(audit_name).exists());
    }

    #[test]
    fn test_cleanup_without_app_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(cleanup_old_logs(dir.path()).unwrap(), 0);
    }
}
