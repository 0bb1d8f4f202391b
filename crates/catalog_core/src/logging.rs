//! Rolling file logging for catalog processes.
//!
//! Catalog code logs through the `log` facade with `event=... module=...
//! status=...` lines; this module installs the file backend behind it.
//!
//! # Invariants
//! - The backend is installed at most once per process.
//! - Repeating init with the active level and directory is a no-op.
//! - Init never panics; every failure is a `LoggingError`.

use flexi_logger::{
    Cleanup, Criterion, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Once;

const LOG_FILE_BASENAME: &str = "catalog";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: Once = Once::new();

struct ActiveLogger {
    level: &'static str,
    dir: PathBuf,
    _handle: LoggerHandle,
}

/// Logging setup errors.
#[derive(Debug)]
pub enum LoggingError {
    InvalidLevel(String),
    EmptyDir,
    RelativeDir(PathBuf),
    /// The backend is already running with other settings.
    AlreadyInitialized {
        level: &'static str,
        dir: PathBuf,
    },
    CreateDir {
        path: PathBuf,
        source: io::Error,
    },
    Backend(FlexiLoggerError),
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLevel(raw) => write!(
                f,
                "unsupported log level `{raw}`; expected trace|debug|info|warn|error"
            ),
            Self::EmptyDir => write!(f, "log directory cannot be empty"),
            Self::RelativeDir(path) => write!(
                f,
                "log directory must be an absolute path, got `{}`",
                path.display()
            ),
            Self::AlreadyInitialized { level, dir } => write!(
                f,
                "logging already active at `{}` with level `{level}`",
                dir.display()
            ),
            Self::CreateDir { path, source } => write!(
                f,
                "cannot create log directory `{}`: {source}",
                path.display()
            ),
            Self::Backend(err) => write!(f, "log backend failed to start: {err}"),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FlexiLoggerError> for LoggingError {
    fn from(value: FlexiLoggerError) -> Self {
        Self::Backend(value)
    }
}

/// Default level: `debug` in debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// Parses a level name, case-insensitively; `warning` is accepted for `warn`.
pub fn parse_log_level(raw: &str) -> Result<&'static str, LoggingError> {
    let level = raw.trim().to_ascii_lowercase();
    ["trace", "debug", "info", "warn", "error"]
        .into_iter()
        .find(|known| *known == level || (level == "warning" && *known == "warn"))
        .ok_or(LoggingError::InvalidLevel(level))
}

/// Checks that `dir` can name a log directory.
pub fn check_log_dir(dir: &Path) -> Result<(), LoggingError> {
    if dir.as_os_str().is_empty() {
        return Err(LoggingError::EmptyDir);
    }
    if !dir.is_absolute() {
        return Err(LoggingError::RelativeDir(dir.to_path_buf()));
    }
    Ok(())
}

/// Starts rolling file logs under `log_dir`.
///
/// # Errors
/// - `InvalidLevel`, `EmptyDir`, `RelativeDir` for unusable arguments.
/// - `AlreadyInitialized` when logging runs with another level or directory.
/// - `CreateDir` and `Backend` when the backend cannot start.
pub fn init_logging(level: &str, log_dir: &Path) -> Result<(), LoggingError> {
    let level = parse_log_level(level)?;
    check_log_dir(log_dir)?;

    let active = ACTIVE.get_or_try_init(|| start_backend(level, log_dir))?;
    if active.level != level || active.dir != log_dir {
        return Err(LoggingError::AlreadyInitialized {
            level: active.level,
            dir: active.dir.clone(),
        });
    }
    Ok(())
}

fn start_backend(level: &'static str, dir: &Path) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let handle = Logger::try_with_str(level)?
        .log_to_file(
            FileSpec::default()
                .directory(dir)
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
        .start()?;

    PANIC_HOOK.call_once(install_panic_hook);

    info!(
        "event=logging_init module=core status=ok level={level} log_dir={} version={} schema_version={}",
        dir.display(),
        crate::core_version(),
        crate::db::migrations::latest_version()
    );

    Ok(ActiveLogger {
        level,
        dir: dir.to_path_buf(),
        _handle: handle,
    })
}

fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(
            "event=panic module=core status=error location={location} payload={}",
            one_line(&payload, MAX_PANIC_PAYLOAD_CHARS)
        );
        previous(info);
    }));
}

// Panic payloads may quote record fields.
fn one_line(value: &str, max_chars: usize) -> String {
    let mut line: String = value
        .chars()
        .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
        .take(max_chars)
        .collect();
    if value.chars().count() > max_chars {
        line.push_str("...");
    }
    line
}
