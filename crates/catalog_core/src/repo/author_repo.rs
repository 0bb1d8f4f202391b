//! Author repository contract and SQLite implementation.
//!
//! # Invariants
//! - Listing order is `last_name, first_name, id`.
//! - Deleting an author still referenced by a book is refused and leaves
//!   both rows untouched.

use super::error::{duplicate_id, unique_violation_target, RepoError, RepoResult};
use super::{delete_restricted, ensure_connection_ready, parse_uuid, Dependents, Page};
use crate::model::author::{Author, AuthorId};
use crate::model::entity::EntityKind;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const AUTHOR_SELECT_SQL: &str = "SELECT
    id,
    first_name,
    last_name,
    date_of_birth,
    date_of_death
FROM authors";

pub(crate) const AUTHOR_COLUMNS: (&str, &[&str]) = (
    "authors",
    &["id", "first_name", "last_name", "date_of_birth", "date_of_death"],
);

/// Repository interface for author CRUD operations.
pub trait AuthorRepository {
    fn create_author(&self, author: &Author) -> RepoResult<AuthorId>;
    fn update_author(&self, author: &Author) -> RepoResult<()>;
    fn get_author(&self, id: AuthorId) -> RepoResult<Option<Author>>;
    fn list_authors(&self, page: &Page) -> RepoResult<Vec<Author>>;
    /// Deletes an author that no book references.
    fn delete_author(&self, id: AuthorId) -> RepoResult<()>;
}

/// SQLite-backed author repository.
pub struct SqliteAuthorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAuthorRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[AUTHOR_COLUMNS])?;
        Ok(Self { conn })
    }
}

impl AuthorRepository for SqliteAuthorRepository<'_> {
    fn create_author(&self, author: &Author) -> RepoResult<AuthorId> {
        author.validate()?;

        self.conn
            .execute(
                "INSERT INTO authors (
                    id,
                    first_name,
                    last_name,
                    date_of_birth,
                    date_of_death
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    author.id.to_string(),
                    author.first_name,
                    author.last_name,
                    author.date_of_birth,
                    author.date_of_death,
                ],
            )
            .map_err(|err| match unique_violation_target(&err) {
                Some("authors.id") => duplicate_id(EntityKind::Author),
                _ => err.into(),
            })?;

        Ok(author.id)
    }

    fn update_author(&self, author: &Author) -> RepoResult<()> {
        author.validate()?;

        let changed = self.conn.execute(
            "UPDATE authors
             SET
                first_name = ?1,
                last_name = ?2,
                date_of_birth = ?3,
                date_of_death = ?4
             WHERE id = ?5;",
            params![
                author.first_name,
                author.last_name,
                author.date_of_birth,
                author.date_of_death,
                author.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::Author,
                id: author.id,
            });
        }
        Ok(())
    }

    fn get_author(&self, id: AuthorId) -> RepoResult<Option<Author>> {
        let sql = format!("{AUTHOR_SELECT_SQL} WHERE id = ?1;");
        self.conn
            .query_row(&sql, [id.to_string()], |row| Ok(parse_author_row(row)))
            .optional()?
            .transpose()
    }

    fn list_authors(&self, page: &Page) -> RepoResult<Vec<Author>> {
        let mut sql = format!("{AUTHOR_SELECT_SQL} ORDER BY last_name ASC, first_name ASC, id ASC");
        let mut bind_values: Vec<Value> = Vec::new();
        page.push_sql(&mut sql, &mut bind_values);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut authors = Vec::new();
        while let Some(row) = rows.next()? {
            authors.push(parse_author_row(row)?);
        }
        Ok(authors)
    }

    fn delete_author(&self, id: AuthorId) -> RepoResult<()> {
        delete_restricted(
            self.conn,
            EntityKind::Author,
            "authors",
            id,
            &Dependents {
                entity: EntityKind::Book,
                table: "books",
                column: "author_id",
            },
        )
    }
}

fn parse_author_row(row: &Row<'_>) -> RepoResult<Author> {
    let id_text: String = row.get("id")?;
    let author = Author {
        id: parse_uuid(&id_text, "authors.id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        date_of_birth: row.get("date_of_birth")?,
        date_of_death: row.get("date_of_death")?,
    };
    author.validate()?;
    Ok(author)
}
