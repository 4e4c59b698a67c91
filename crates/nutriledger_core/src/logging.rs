//! Rolling file logging for the ledger core.
//!
//! # Responsibility
//! - Start the `flexi_logger` file backend once per process.
//! - Capture panics as sanitized, metadata-only log events.
//!
//! # Invariants
//! - Re-initializing with the same level and directory is a no-op.
//! - Re-initializing with a different level or directory is rejected.
//! - Initialization never panics.
//! - Log lines carry ids and counts only, never food names or other user text.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "nutriledger";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;
const MAX_PANIC_PAYLOAD_CHARS: usize = 120;

static ACTIVE_LOGGER: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

/// Normalized logging request.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LogTarget {
    level: &'static str,
    dir: PathBuf,
}

impl LogTarget {
    fn parse(level: &str, log_dir: &str) -> Result<Self, String> {
        let level = match level.trim().to_ascii_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" | "warning" => "warn",
            "error" => "error",
            other => {
                return Err(format!(
                    "unsupported log level `{other}`; expected trace|debug|info|warn|error"
                ))
            }
        };

        let trimmed = log_dir.trim();
        if trimmed.is_empty() {
            return Err("log_dir cannot be empty".to_string());
        }
        let dir = Path::new(trimmed);
        if !dir.is_absolute() {
            return Err(format!("log_dir must be an absolute path, got `{trimmed}`"));
        }

        Ok(Self {
            level,
            dir: dir.to_path_buf(),
        })
    }

    fn conflict_with(&self, active: &LogTarget) -> Option<String> {
        if active.dir != self.dir {
            return Some(format!(
                "logging already initialized at `{}`; refusing to switch to `{}`",
                active.dir.display(),
                self.dir.display()
            ));
        }
        if active.level != self.level {
            return Some(format!(
                "logging already initialized with level `{}`; refusing to switch to `{}`",
                active.level, self.level
            ));
        }
        None
    }
}

struct ActiveLogger {
    target: LogTarget,
    _handle: LoggerHandle,
}

/// Initializes core logging with `level` writing into `log_dir`.
///
/// # Errors
/// - Unsupported `level`, or a blank/relative `log_dir`.
/// - A different level or directory than the one already active.
/// - Directory creation or logger backend failure.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    let requested = LogTarget::parse(level, log_dir)?;

    let active = ACTIVE_LOGGER.get_or_try_init(|| start_logger(requested.clone()))?;
    match requested.conflict_with(&active.target) {
        Some(message) => Err(message),
        None => Ok(()),
    }
}

/// Returns `(level, log_dir)` of the active logger, if any.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    ACTIVE_LOGGER
        .get()
        .map(|active| (active.target.level, active.target.dir.clone()))
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_logger(target: LogTarget) -> Result<ActiveLogger, String> {
    std::fs::create_dir_all(&target.dir).map_err(|err| {
        format!(
            "failed to create log directory `{}`: {err}",
            target.dir.display()
        )
    })?;

    let handle = Logger::try_with_str(target.level)
        .map_err(|err| format!("invalid log level `{}`: {err}", target.level))?
        .log_to_file(
            FileSpec::default()
                .directory(target.dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    install_panic_hook();
    info!(
        "event=core_init module=core status=ok level={} version={} platform={}",
        target.level,
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    );

    Ok(ActiveLogger {
        target,
        _handle: handle,
    })
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }

    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location,
            sanitize_message(&payload, MAX_PANIC_PAYLOAD_CHARS)
        );
        previous(panic_info);
    }));
}

/// Flattens newlines and caps length before text reaches a log line.
fn sanitize_message(value: &str, max_chars: usize) -> String {
    let flattened = value.replace(['\n', '\r'], " ");
    let mut capped: String = flattened.chars().take(max_chars).collect();
    if flattened.chars().count() > max_chars {
        capped.push_str("...");
    }
    capped
}
