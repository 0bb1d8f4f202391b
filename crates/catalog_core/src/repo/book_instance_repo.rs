//! Book instance repository contract and SQLite implementation.
//!
//! # Invariants
//! - Listing order is `due_back` ascending, undated copies last, then `id`.
//! - `book`, when set, must reference an existing book.
//! - Status writes are unconditional; there are no transition rules.

use super::book_repo::BOOK_COLUMNS;
use super::error::{duplicate_id, unique_violation_target, RepoError, RepoResult};
use super::{ensure_connection_ready, parse_optional_uuid, parse_uuid, record_exists, Page};
use crate::model::book::BookId;
use crate::model::book_instance::{BookInstance, BookInstanceId};
use crate::model::choices::LoanStatus;
use crate::model::entity::EntityKind;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const BOOK_INSTANCE_SELECT_SQL: &str = "SELECT
    id,
    book_id,
    imprint,
    due_back,
    status
FROM book_instances";

const BOOK_INSTANCE_ORDER_SQL: &str = " ORDER BY due_back IS NULL ASC, due_back ASC, id ASC";

const BOOK_INSTANCE_COLUMNS: (&str, &[&str]) = (
    "book_instances",
    &["id", "book_id", "imprint", "due_back", "status"],
);

/// Query options for listing book instances.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookInstanceListQuery {
    pub status: Option<LoanStatus>,
    /// Only copies of this book.
    pub book: Option<BookId>,
    /// `Some(true)` keeps dated copies only, `Some(false)` undated only.
    pub has_due_back: Option<bool>,
    pub page: Page,
}

/// Repository interface for book instance CRUD operations.
pub trait BookInstanceRepository {
    fn create_book_instance(&self, instance: &BookInstance) -> RepoResult<BookInstanceId>;
    fn update_book_instance(&self, instance: &BookInstance) -> RepoResult<()>;
    fn get_book_instance(&self, id: BookInstanceId) -> RepoResult<Option<BookInstance>>;
    fn list_book_instances(&self, query: &BookInstanceListQuery)
        -> RepoResult<Vec<BookInstance>>;
    fn delete_book_instance(&self, id: BookInstanceId) -> RepoResult<()>;
}

/// SQLite-backed book instance repository.
pub struct SqliteBookInstanceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookInstanceRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[BOOK_INSTANCE_COLUMNS, BOOK_COLUMNS])?;
        Ok(Self { conn })
    }

    fn ensure_book_exists(&self, book: Option<BookId>) -> RepoResult<()> {
        if let Some(id) = book {
            if !record_exists(self.conn, "books", id)? {
                return Err(RepoError::UnknownReference {
                    field: "book",
                    entity: EntityKind::Book,
                    id,
                });
            }
        }
        Ok(())
    }
}

impl BookInstanceRepository for SqliteBookInstanceRepository<'_> {
    fn create_book_instance(&self, instance: &BookInstance) -> RepoResult<BookInstanceId> {
        instance.validate()?;
        self.ensure_book_exists(instance.book)?;

        self.conn
            .execute(
                "INSERT INTO book_instances (
                    id,
                    book_id,
                    imprint,
                    due_back,
                    status
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    instance.id.to_string(),
                    instance.book.map(|id| id.to_string()),
                    instance.imprint,
                    instance.due_back,
                    instance.status.code(),
                ],
            )
            .map_err(|err| match unique_violation_target(&err) {
                Some("book_instances.id") => duplicate_id(EntityKind::BookInstance),
                _ => err.into(),
            })?;

        Ok(instance.id)
    }

    fn update_book_instance(&self, instance: &BookInstance) -> RepoResult<()> {
        instance.validate()?;
        self.ensure_book_exists(instance.book)?;

        let changed = self.conn.execute(
            "UPDATE book_instances
             SET
                book_id = ?1,
                imprint = ?2,
                due_back = ?3,
                status = ?4
             WHERE id = ?5;",
            params![
                instance.book.map(|id| id.to_string()),
                instance.imprint,
                instance.due_back,
                instance.status.code(),
                instance.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::BookInstance,
                id: instance.id,
            });
        }
        Ok(())
    }

    fn get_book_instance(&self, id: BookInstanceId) -> RepoResult<Option<BookInstance>> {
        let sql = format!("{BOOK_INSTANCE_SELECT_SQL} WHERE id = ?1;");
        self.conn
            .query_row(&sql, [id.to_string()], |row| {
                Ok(parse_book_instance_row(row))
            })
            .optional()?
            .transpose()
    }

    fn list_book_instances(
        &self,
        query: &BookInstanceListQuery,
    ) -> RepoResult<Vec<BookInstance>> {
        let mut sql = format!("{BOOK_INSTANCE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.code().to_string()));
        }
        if let Some(book) = query.book {
            sql.push_str(" AND book_id = ?");
            bind_values.push(Value::Text(book.to_string()));
        }
        match query.has_due_back {
            Some(true) => sql.push_str(" AND due_back IS NOT NULL"),
            Some(false) => sql.push_str(" AND due_back IS NULL"),
            None => {}
        }

        sql.push_str(BOOK_INSTANCE_ORDER_SQL);
        query.page.push_sql(&mut sql, &mut bind_values);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut instances = Vec::new();
        while let Some(row) = rows.next()? {
            instances.push(parse_book_instance_row(row)?);
        }
        Ok(instances)
    }

    fn delete_book_instance(&self, id: BookInstanceId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM book_instances WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::BookInstance,
                id,
            });
        }
        Ok(())
    }
}

fn parse_book_instance_row(row: &Row<'_>) -> RepoResult<BookInstance> {
    let id_text: String = row.get("id")?;
    let status_text: String = row.get("status")?;
    let status = LoanStatus::from_code(&status_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in book_instances.status"
        ))
    })?;

    let instance = BookInstance {
        id: parse_uuid(&id_text, "book_instances.id")?,
        book: parse_optional_uuid(row.get("book_id")?, "book_instances.book_id")?,
        imprint: row.get("imprint")?,
        due_back: row.get("due_back")?,
        status,
    };
    instance.validate()?;
    Ok(instance)
}
