//! Genre repository contract and SQLite implementation.
//!
//! # Invariants
//! - `title_key` is recomputed from `title` on every write.
//! - A title colliding case-insensitively is rejected with
//!   `GENRE_EXISTS_MESSAGE`.
//! - Deleting a genre drops its `book_genres` links through the FK cascade.

use super::error::{duplicate_id, unique_violation_target, RepoError, RepoResult};
use super::{ensure_connection_ready, parse_uuid, Page};
use crate::model::entity::EntityKind;
use crate::model::genre::{genre_title_key, Genre, GenreId, GENRE_EXISTS_MESSAGE};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const GENRE_SELECT_SQL: &str = "SELECT id, title FROM genres";

pub(crate) const GENRE_COLUMNS: (&str, &[&str]) = ("genres", &["id", "title", "title_key"]);

/// Repository interface for genre CRUD operations.
pub trait GenreRepository {
    fn create_genre(&self, genre: &Genre) -> RepoResult<GenreId>;
    fn update_genre(&self, genre: &Genre) -> RepoResult<()>;
    fn get_genre(&self, id: GenreId) -> RepoResult<Option<Genre>>;
    /// Looks a genre up by title, ignoring letter case.
    fn find_genre_by_title(&self, title: &str) -> RepoResult<Option<Genre>>;
    /// Lists genres ordered by case-folded title.
    fn list_genres(&self, page: &Page) -> RepoResult<Vec<Genre>>;
    fn delete_genre(&self, id: GenreId) -> RepoResult<()>;
}

/// SQLite-backed genre repository.
pub struct SqliteGenreRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGenreRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[GENRE_COLUMNS])?;
        Ok(Self { conn })
    }
}

impl GenreRepository for SqliteGenreRepository<'_> {
    fn create_genre(&self, genre: &Genre) -> RepoResult<GenreId> {
        genre.validate()?;

        self.conn
            .execute(
                "INSERT INTO genres (id, title, title_key) VALUES (?1, ?2, ?3);",
                params![genre.id.to_string(), genre.title.trim(), genre.title_key()],
            )
            .map_err(map_genre_write_error)?;

        Ok(genre.id)
    }

    fn update_genre(&self, genre: &Genre) -> RepoResult<()> {
        genre.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE genres SET title = ?1, title_key = ?2 WHERE id = ?3;",
                params![genre.title.trim(), genre.title_key(), genre.id.to_string()],
            )
            .map_err(map_genre_write_error)?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::Genre,
                id: genre.id,
            });
        }
        Ok(())
    }

    fn get_genre(&self, id: GenreId) -> RepoResult<Option<Genre>> {
        let sql = format!("{GENRE_SELECT_SQL} WHERE id = ?1;");
        self.conn
            .query_row(&sql, [id.to_string()], |row| Ok(parse_genre_row(row)))
            .optional()?
            .transpose()
    }

    fn find_genre_by_title(&self, title: &str) -> RepoResult<Option<Genre>> {
        let sql = format!("{GENRE_SELECT_SQL} WHERE title_key = ?1;");
        self.conn
            .query_row(&sql, [genre_title_key(title)], |row| {
                Ok(parse_genre_row(row))
            })
            .optional()?
            .transpose()
    }

    fn list_genres(&self, page: &Page) -> RepoResult<Vec<Genre>> {
        let mut sql = format!("{GENRE_SELECT_SQL} ORDER BY title_key ASC, id ASC");
        let mut bind_values: Vec<Value> = Vec::new();
        page.push_sql(&mut sql, &mut bind_values);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut genres = Vec::new();
        while let Some(row) = rows.next()? {
            genres.push(parse_genre_row(row)?);
        }
        Ok(genres)
    }

    fn delete_genre(&self, id: GenreId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM genres WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::Genre,
                id,
            });
        }
        Ok(())
    }
}

pub(crate) fn parse_genre_row(row: &Row<'_>) -> RepoResult<Genre> {
    let id_text: String = row.get("id")?;
    let genre = Genre {
        id: parse_uuid(&id_text, "genres.id")?,
        title: row.get("title")?,
    };
    genre.validate()?;
    Ok(genre)
}

fn map_genre_write_error(err: rusqlite::Error) -> RepoError {
    match unique_violation_target(&err) {
        Some("genres.title_key") | Some("genres.title") => RepoError::UniquenessViolation {
            entity: EntityKind::Genre,
            field: "title",
            message: GENRE_EXISTS_MESSAGE.to_string(),
        },
        Some("genres.id") => duplicate_id(EntityKind::Genre),
        _ => err.into(),
    }
}
