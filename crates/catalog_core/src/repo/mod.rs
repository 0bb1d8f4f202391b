//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define one data-access contract per catalog record.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Write paths call the record's `validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Constraint failures surface as semantic `RepoError` variants.

pub mod author_repo;
pub mod book_instance_repo;
pub mod book_repo;
pub mod error;
pub mod genre_repo;

use crate::db::migrations::{latest_version, schema_version};
use crate::model::entity::EntityKind;
use error::{is_foreign_key_violation, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::Connection;
use uuid::Uuid;

/// Pagination options shared by every list query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    /// Maximum rows to return; `None` returns every row.
    pub limit: Option<u32>,
    /// Number of rows to skip.
    pub offset: u32,
}

impl Page {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self {
            limit: Some(limit),
            offset,
        }
    }

    pub(crate) fn push_sql(&self, sql: &mut String, bind_values: &mut Vec<Value>) {
        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if self.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(self.offset)));
            }
        } else if self.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(self.offset)));
        }
    }
}

/// Verifies the connection is migrated and carries the expected columns.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    tables: &[(&'static str, &[&'static str])],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in tables {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        let present = table_columns(conn, table)?;
        if let Some(column) = columns
            .iter()
            .copied()
            .find(|column| !present.iter().any(|name| name.as_str() == *column))
        {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get::<_, String>(1)?);
    }
    Ok(columns)
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn parse_optional_uuid(
    value: Option<String>,
    column: &str,
) -> RepoResult<Option<Uuid>> {
    value.map(|text| parse_uuid(&text, column)).transpose()
}

pub(crate) fn record_exists(conn: &Connection, table: &str, id: Uuid) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1);"),
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn count_where(
    conn: &Connection,
    table: &str,
    column: &str,
    id: Uuid,
) -> RepoResult<u64> {
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {table} WHERE {column} = ?1;"),
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(u64::try_from(count).unwrap_or(0))
}

/// Rows that keep a referenced record from being deleted.
pub(crate) struct Dependents {
    pub entity: EntityKind,
    pub table: &'static str,
    pub column: &'static str,
}

/// Deletes one record unless `dependents` still reference it.
pub(crate) fn delete_restricted(
    conn: &Connection,
    entity: EntityKind,
    table: &str,
    id: Uuid,
    dependents: &Dependents,
) -> RepoResult<()> {
    let restricted = |count: u64| RepoError::ReferentialIntegrityViolation {
        entity,
        id,
        dependent: dependents.entity,
        dependents: count,
    };

    let count = count_where(conn, dependents.table, dependents.column, id)?;
    if count > 0 {
        return Err(restricted(count));
    }

    let changed = match conn.execute(
        &format!("DELETE FROM {table} WHERE id = ?1;"),
        [id.to_string()],
    ) {
        Ok(changed) => changed,
        // A reference may land between the count and the delete.
        Err(err) if is_foreign_key_violation(&err) => {
            let count = count_where(conn, dependents.table, dependents.column, id)?;
            return Err(restricted(count));
        }
        Err(err) => return Err(err.into()),
    };

    if changed == 0 {
        return Err(RepoError::NotFound { entity, id });
    }
    Ok(())
}
