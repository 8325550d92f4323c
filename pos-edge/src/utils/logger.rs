//! Logging Infrastructure
//!
//! Structured logging for the till:
//! - Console: pretty in development, JSON when `json_format` is set
//! - Daily rotating application logs under `logs/app` (deleted after 14 days)
//! - Permanent audit logs under `logs/audit` (events with `target: "audit"`)

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Local, NaiveDate, TimeZone};
use tokio_util::sync::CancellationToken;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

/// App log files older than this are removed
pub const APP_LOG_RETENTION_DAYS: i64 = 14;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn app_log_date(file_name: &str) -> Option<NaiveDate> {
    let date = file_name.strip_prefix("app.")?;
    let date = date.strip_suffix(".log").unwrap_or(date);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Remove application log files older than 14 days. Returns how many were deleted.
///
/// Audit logs are never touched.
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<usize> {
    let cutoff = Local::now() - chrono::Duration::days(APP_LOG_RETENTION_DAYS);

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
        // tracing-appender names daily files app.YYYY-MM-DD
        if let Some(date) = app_log_date(name)
            && let Some(midnight) = date.and_hms_opt(0, 0, 0)
            && let Some(local) = Local.from_local_datetime(&midnight).single()
            && local < cutoff
        {
            fs::remove_file(&path)?;
            tracing::info!(file = %name, "Deleted old log file");
            removed += 1;
        }
    }
    Ok(removed)
}

/// Hourly cleanup until `shutdown` fires
pub async fn periodic_cleanup(log_dir: PathBuf, shutdown: CancellationToken) {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(CLEANUP_INTERVAL) => {}
            _ = shutdown.cancelled() => break,
        }
        if let Err(e) = cleanup_old_logs(&log_dir) {
            tracing::error!(error = %e, "Failed to cleanup old logs");
        }
    }
}

fn console_layer(level: &str, json_format: bool) -> BoxedLayer {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(filter)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .with_filter(filter)
            .boxed()
    }
}

fn file_layers(level: &str, json_format: bool, log_dir: &Path) -> anyhow::Result<Vec<BoxedLayer>> {
    let app_log_dir = log_dir.join("app");
    let audit_log_dir = log_dir.join("audit");
    fs::create_dir_all(&app_log_dir)?;
    fs::create_dir_all(&audit_log_dir)?;

    let app_log = RollingFileAppender::new(Rotation::DAILY, app_log_dir, "app");
    let audit_log = RollingFileAppender::new(Rotation::DAILY, audit_log_dir, "audit");

    let is_audit = |meta: &tracing::Metadata<'_>| meta.target() == "audit";

    let layers = if json_format {
        vec![
            fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::sync::Mutex::new(app_log))
                .with_filter(EnvFilter::new(level))
                .with_filter(filter_fn(move |meta| !is_audit(meta)))
                .boxed(),
            fmt::layer()
                .json()
                .with_target(true)
                .with_writer(std::sync::Mutex::new(audit_log))
                .with_filter(filter_fn(is_audit))
                .boxed(),
        ]
    } else {
        vec![
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(app_log))
                .with_filter(EnvFilter::new(level))
                .with_filter(filter_fn(move |meta| !is_audit(meta)))
                .boxed(),
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(audit_log))
                .with_filter(filter_fn(is_audit))
                .boxed(),
        ]
    };
    Ok(layers)
}

/// Initialize the logging system with daily rotating logs
///
/// # Arguments
/// * `level` - Log level (e.g., "info", "debug", "warn")
/// * `json_format` - JSON console output (production)
/// * `log_dir` - Optional directory for file logging (e.g., `./work_dir/logs`)
///
/// Old app logs are pruned once here; register [`periodic_cleanup`] as a
/// background task to keep pruning.
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let mut layers = vec![console_layer(level, json_format)];
    if let Some(dir) = log_dir {
        fs::create_dir_all(dir)?;
        layers.extend(file_layers(level, json_format, dir)?);
    }

    tracing_subscriber::registry().with(layers).try_init()?;

    if let Some(dir) = log_dir
        && let Err(e) = cleanup_old_logs(dir)
    {
        tracing::warn!(error = %e, "Initial log cleanup failed");
    }
    Ok(())
}

/// Console only
pub fn init_logger(level: &str, json_format: bool) -> anyhow::Result<()> {
    init_logger_with_file(level, json_format, None)
}

/// Audit log helper - records business operations
///
/// Audit logs are permanently stored in `logs/audit/audit.YYYY-MM-DD` and are
/// never pruned.
///
/// # Examples
/// ```ignore
/// audit_log!("delete", "product:42");
/// audit_log!("import", "backup", "12 products, 40 invoices");
/// ```
#[macro_export]
macro_rules! audit_log {
    ($action:expr, $resource:expr) => {
        tracing::info!(
            target: "audit",
            action = $action,
            resource = %$resource,
            timestamp = chrono::Local::now().to_rfc3339(),
            "AUDIT"
        );
    };
    ($action:expr, $resource:expr, $details:expr) => {
        tracing::info!(
            target: "audit",
            action = $action,
            resource = %$resource,
            details = %$details,
            timestamp = chrono::Local::now().to_rfc3339(),
            "AUDIT"
        );
    };
}
