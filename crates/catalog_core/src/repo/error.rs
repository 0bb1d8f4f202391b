//! Repository error taxonomy and SQLite constraint mapping.
//!
//! # Responsibility
//! - Turn raw SQLite constraint failures into semantic catalog errors.
//! - Keep one error type for every repository so services compose them.
//!
//! # Invariants
//! - A failed write leaves no partial rows behind; callers may retry freely.
//! - `UniquenessViolation` messages are user-facing and stable.

use crate::db::DbError;
use crate::model::entity::EntityKind;
use crate::model::validation::ValidationError;
use rusqlite::ffi;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from catalog repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// Field-level validation failed before any SQL ran.
    Validation(ValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target record does not exist.
    NotFound { entity: EntityKind, id: Uuid },
    /// Write would duplicate a unique value.
    UniquenessViolation {
        entity: EntityKind,
        field: &'static str,
        message: String,
    },
    /// Delete refused because other records still reference the target.
    ReferentialIntegrityViolation {
        entity: EntityKind,
        id: Uuid,
        dependent: EntityKind,
        dependents: u64,
    },
    /// Reference field points at a record that does not exist.
    UnknownReference {
        field: &'static str,
        entity: EntityKind,
        id: Uuid,
    },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted into a valid record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::UniquenessViolation { message, .. } => f.write_str(message),
            Self::ReferentialIntegrityViolation {
                entity,
                id,
                dependent,
                dependents,
            } => write!(
                f,
                "cannot delete {entity} {id}: still referenced by {dependents} {dependent} record(s)"
            ),
            Self::UnknownReference { field, entity, id } => {
                write!(f, "{field}: {entity} {id} does not exist")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "catalog repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "catalog repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "catalog repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted catalog data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl RepoError {
    /// Short machine-readable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Db(_) => "db",
            Self::NotFound { .. } => "not_found",
            Self::UniquenessViolation { .. } => "unique",
            Self::ReferentialIntegrityViolation { .. } => "restrict",
            Self::UnknownReference { .. } => "unknown_reference",
            Self::UninitializedConnection { .. } => "uninitialized",
            Self::MissingRequiredTable(_) | Self::MissingRequiredColumn { .. } => "schema",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

const FOREIGN_KEY_FAILED_MESSAGE: &str = "FOREIGN KEY constraint failed";

/// Returns `table.column` named by a UNIQUE or PRIMARY KEY failure.
pub(crate) fn unique_violation_target(err: &rusqlite::Error) -> Option<&str> {
    match err {
        rusqlite::Error::SqliteFailure(failure, Some(message))
            if failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                || failure.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
        {
            message
                .strip_prefix("UNIQUE constraint failed: ")
                .map(|target| target.split(',').next().unwrap_or(target).trim())
        }
        _ => None,
    }
}

/// Whether `err` is a foreign-key failure.
///
/// Immediate `ON DELETE RESTRICT` actions report `SQLITE_CONSTRAINT_TRIGGER`
/// with the generic foreign-key message instead of the FOREIGNKEY code.
pub(crate) fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, message) => {
            failure.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY
                || (failure.extended_code == ffi::SQLITE_CONSTRAINT_TRIGGER
                    && message.as_deref() == Some(FOREIGN_KEY_FAILED_MESSAGE))
        }
        _ => false,
    }
}

/// Builds the default uniqueness error for a primary-key collision.
pub(crate) fn duplicate_id(entity: EntityKind) -> RepoError {
    RepoError::UniquenessViolation {
        entity,
        field: "id",
        message: format!("{} with this Id already exists", entity.verbose_name()),
    }
}
