//! Process configuration read from environment variables.
//!
//! # Responsibility
//! - Resolve database location and logging settings.
//! - Open the configured database and start logging on request.
//!
//! # Invariants
//! - Blank variables are treated as unset.
//! - A configured log directory is absolute.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::logging::{check_log_dir, default_log_level, init_logging, parse_log_level, LoggingError};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "CATALOG_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "CATALOG_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "CATALOG_LOG_DIR";

/// Database path value selecting an in-memory database.
pub const IN_MEMORY_DB: &str = ":memory:";

/// Runtime settings of a catalog process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// SQLite file; `None` opens an in-memory database.
    pub db_path: Option<PathBuf>,
    pub log_level: &'static str,
    /// Rolling log directory; `None` leaves logging disabled.
    pub log_dir: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

/// Configuration loading and startup errors.
#[derive(Debug)]
pub enum ConfigError {
    /// A variable holds an unusable value.
    InvalidValue {
        var: &'static str,
        message: String,
    },
    Db(DbError),
    Logging(LoggingError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { var, message } => write!(f, "invalid {var}: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Logging(err) => write!(f, "logging init failed: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Logging(err) => Some(err),
            Self::InvalidValue { .. } => None,
        }
    }
}

impl From<DbError> for ConfigError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<LoggingError> for ConfigError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl CatalogConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = read(DB_PATH_VAR)
            .filter(|value| value != IN_MEMORY_DB)
            .map(PathBuf::from);

        let log_level = match read(LOG_LEVEL_VAR) {
            Some(raw) => parse_log_level(&raw).map_err(|err| invalid(LOG_LEVEL_VAR, &err))?,
            None => default_log_level(),
        };

        let log_dir = read(LOG_DIR_VAR).map(PathBuf::from);
        if let Some(dir) = &log_dir {
            check_log_dir(dir).map_err(|err| invalid(LOG_DIR_VAR, &err))?;
        }

        Ok(Self {
            db_path,
            log_level,
            log_dir,
        })
    }

    /// Opens the configured database with migrations applied.
    pub fn open_connection(&self) -> Result<Connection, ConfigError> {
        let conn = match &self.db_path {
            Some(path) => open_db(path)?,
            None => open_db_in_memory()?,
        };
        Ok(conn)
    }

    /// Starts file logging when a log directory is configured.
    ///
    /// Returns whether logging is active afterwards.
    pub fn init_logging(&self) -> Result<bool, ConfigError> {
        let Some(dir) = &self.log_dir else {
            return Ok(false);
        };
        init_logging(self.log_level, dir)?;
        Ok(true)
    }
}

fn invalid(var: &'static str, err: &LoggingError) -> ConfigError {
    ConfigError::InvalidValue {
        var,
        message: err.to_string(),
    }
}
