//! Process logging bootstrap.
//!
//! # Responsibility
//! - Start rolling file logs once per process.
//! - Turn panics into sanitized `event=panic_captured` records.
//!
//! # Invariants
//! - A second start with the same settings is a no-op.
//! - A second start with different settings is refused; the first wins.
//! - Nothing in this module panics.

use crate::config::ClientConfig;
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const LOG_FILE_BASENAME: &str = "todotrack";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_ROTATED_FILES: usize = 5;
const PANIC_PAYLOAD_LIMIT: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

/// Severity threshold accepted by [`init_logging`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!(
                "unsupported log level `{other}`; expected trace|debug|info|warn|error"
            )),
        }
    }
}

/// Validated logger settings.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LogTarget {
    level: LogLevel,
    dir: PathBuf,
}

impl LogTarget {
    fn parse(level: &str, log_dir: &str) -> Result<Self, String> {
        let level = level.parse()?;
        let trimmed = log_dir.trim();
        if trimmed.is_empty() {
            return Err("log_dir cannot be empty".to_string());
        }
        let dir = PathBuf::from(trimmed);
        if !dir.is_absolute() {
            return Err(format!("log_dir must be an absolute path, got `{trimmed}`"));
        }
        Ok(Self { level, dir })
    }
}

struct ActiveLogger {
    target: LogTarget,
    _handle: LoggerHandle,
}

/// Starts file logging at `level` under the absolute directory `log_dir`.
///
/// # Errors
/// - `level` is not one of `trace|debug|info|warn|error`.
/// - `log_dir` is blank, relative, or cannot be created.
/// - Logging already runs with other settings.
/// - The flexi_logger backend fails to start.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    let wanted = LogTarget::parse(level, log_dir)?;
    let active = match ACTIVE.get() {
        Some(active) => active,
        None => ACTIVE.get_or_try_init(|| start(&wanted))?,
    };
    refuse_switch(&active.target, &wanted)
}

/// [`init_logging`] with the level and directory of `config`.
pub fn init_logging_from(config: &ClientConfig) -> Result<(), String> {
    init_logging(&config.log_level, &config.log_dir.to_string_lossy())
}

/// Active `(level, log_dir)`, or `None` before initialization.
pub fn logging_status() -> Option<(LogLevel, PathBuf)> {
    ACTIVE
        .get()
        .map(|active| (active.target.level, active.target.dir.clone()))
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        LogLevel::Debug.as_str()
    } else {
        LogLevel::Info.as_str()
    }
}

fn start(target: &LogTarget) -> Result<ActiveLogger, String> {
    std::fs::create_dir_all(&target.dir).map_err(|err| {
        format!(
            "failed to create log directory `{}`: {err}",
            target.dir.display()
        )
    })?;

    let handle = Logger::try_with_str(target.level.as_str())
        .map_err(|err| format!("invalid log level `{}`: {err}", target.level))?
        .log_to_file(file_spec(&target.dir))
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_ROTATED_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    if PANIC_HOOK.set(()).is_ok() {
        install_panic_hook();
    }

    info!(
        "event=logging_start module=core status=ok os={} version={} level={} log_dir={}",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION"),
        target.level,
        target.dir.display()
    );

    Ok(ActiveLogger {
        target: target.clone(),
        _handle: handle,
    })
}

fn file_spec(dir: &Path) -> FileSpec {
    FileSpec::default()
        .directory(dir)
        .basename(LOG_FILE_BASENAME)
}

fn refuse_switch(active: &LogTarget, wanted: &LogTarget) -> Result<(), String> {
    if active.dir != wanted.dir {
        return Err(format!(
            "logging already writes to `{}`; refusing to switch to `{}`",
            active.dir.display(),
            wanted.dir.display()
        ));
    }
    if active.level != wanted.level {
        return Err(format!(
            "logging already runs at `{}`; refusing to switch to `{}`",
            active.level, wanted.level
        ));
    }
    Ok(())
}

fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));
        error!(
            "event=panic_captured module=core status=error location={location} payload={}",
            one_line(&payload_text(panic_info.payload()), PANIC_PAYLOAD_LIMIT)
        );
        previous(panic_info);
    }));
}

fn payload_text(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        return (*text).to_string();
    }
    payload
        .downcast_ref::<String>()
        .cloned()
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

/// Flattens line breaks and caps length so text cannot forge log records.
fn one_line(value: &str, limit: usize) -> String {
    let flat = value.replace(['\n', '\r'], " ");
    if flat.chars().count() <= limit {
        return flat;
    }
    let mut cut: String = flat.chars().take(limit).collect();
    cut.push_str("...");
    cut
}
