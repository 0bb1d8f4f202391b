//! Book repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist books together with their genre links.
//! - Own genre-link replacement with atomic semantics.
//!
//! # Invariants
//! - A book and its genre links are written in one transaction.
//! - `author` and every `genre` id must exist before the write starts.
//! - Deleting a book still referenced by a book instance is refused.

use super::error::{duplicate_id, unique_violation_target, RepoError, RepoResult};
use super::genre_repo::{parse_genre_row, GENRE_COLUMNS};
use super::{
    delete_restricted, ensure_connection_ready, parse_optional_uuid, parse_uuid, record_exists,
    Dependents, Page,
};
use crate::model::author::AuthorId;
use crate::model::book::{Book, BookId, BOOK_ISBN_EXISTS_MESSAGE};
use crate::model::choices::Language;
use crate::model::entity::EntityKind;
use crate::model::genre::{Genre, GenreId};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;

const BOOK_SELECT_SQL: &str = "SELECT
    id,
    title,
    author_id,
    isbn,
    summary,
    language
FROM books";

pub(crate) const BOOK_COLUMNS: (&str, &[&str]) = (
    "books",
    &["id", "title", "author_id", "isbn", "summary", "language"],
);
const BOOK_GENRE_COLUMNS: (&str, &[&str]) = ("book_genres", &["book_id", "genre_id"]);

/// Query options for listing books.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookListQuery {
    /// Only books written by this author.
    pub author: Option<AuthorId>,
    /// Only books linked to this genre.
    pub genre: Option<GenreId>,
    pub language: Option<Language>,
    pub page: Page,
}

/// Repository interface for book CRUD and genre-link operations.
pub trait BookRepository {
    /// Inserts the book and its genre links.
    fn create_book(&self, book: &Book) -> RepoResult<BookId>;
    /// Replaces every book column and the full genre set.
    fn update_book(&self, book: &Book) -> RepoResult<()>;
    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>>;
    fn find_book_by_isbn(&self, isbn: &str) -> RepoResult<Option<Book>>;
    /// Lists books ordered by title, then id.
    fn list_books(&self, query: &BookListQuery) -> RepoResult<Vec<Book>>;
    /// Deletes a book that no book instance references.
    fn delete_book(&self, id: BookId) -> RepoResult<()>;
    /// Replaces all genre links of one book in a single transaction.
    fn set_book_genres(&self, id: BookId, genres: &BTreeSet<GenreId>) -> RepoResult<()>;
    /// Links one genre; linking twice is a no-op.
    fn add_book_genre(&self, id: BookId, genre: GenreId) -> RepoResult<()>;
    /// Unlinks one genre; unlinking a missing link is a no-op.
    fn remove_book_genre(&self, id: BookId, genre: GenreId) -> RepoResult<()>;
    /// Returns linked genres ordered by case-folded title.
    fn list_book_genres(&self, id: BookId) -> RepoResult<Vec<Genre>>;
}

/// SQLite-backed book repository.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[BOOK_COLUMNS, BOOK_GENRE_COLUMNS, GENRE_COLUMNS])?;
        Ok(Self { conn })
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn create_book(&self, book: &Book) -> RepoResult<BookId> {
        book.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        ensure_references_exist(&tx, book.author, &book.genre)?;
        tx.execute(
            "INSERT INTO books (
                id,
                title,
                author_id,
                isbn,
                summary,
                language
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                book.id.to_string(),
                book.title,
                book.author.map(|id| id.to_string()),
                book.isbn,
                book.summary,
                book.language.code(),
            ],
        )
        .map_err(map_book_write_error)?;
        replace_genre_links(&tx, book.id, &book.genre)?;
        tx.commit()?;

        Ok(book.id)
    }

    fn update_book(&self, book: &Book) -> RepoResult<()> {
        book.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        ensure_references_exist(&tx, book.author, &book.genre)?;
        let changed = tx
            .execute(
                "UPDATE books
                 SET
                    title = ?1,
                    author_id = ?2,
                    isbn = ?3,
                    summary = ?4,
                    language = ?5
                 WHERE id = ?6;",
                params![
                    book.title,
                    book.author.map(|id| id.to_string()),
                    book.isbn,
                    book.summary,
                    book.language.code(),
                    book.id.to_string(),
                ],
            )
            .map_err(map_book_write_error)?;
        if changed == 0 {
            return Err(book_not_found(book.id));
        }
        replace_genre_links(&tx, book.id, &book.genre)?;
        tx.commit()?;
        Ok(())
    }

    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>> {
        let sql = format!("{BOOK_SELECT_SQL} WHERE id = ?1;");
        let book = self
            .conn
            .query_row(&sql, [id.to_string()], |row| Ok(parse_book_row(row)))
            .optional()?
            .transpose()?;
        book.map(|book| with_genre_links(self.conn, book)).transpose()
    }

    fn find_book_by_isbn(&self, isbn: &str) -> RepoResult<Option<Book>> {
        let sql = format!("{BOOK_SELECT_SQL} WHERE isbn = ?1;");
        let book = self
            .conn
            .query_row(&sql, [isbn], |row| Ok(parse_book_row(row)))
            .optional()?
            .transpose()?;
        book.map(|book| with_genre_links(self.conn, book)).transpose()
    }

    fn list_books(&self, query: &BookListQuery) -> RepoResult<Vec<Book>> {
        let mut sql = format!("{BOOK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(author) = query.author {
            sql.push_str(" AND author_id = ?");
            bind_values.push(Value::Text(author.to_string()));
        }
        if let Some(genre) = query.genre {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1
                    FROM book_genres bg
                    WHERE bg.book_id = books.id
                      AND bg.genre_id = ?
                )",
            );
            bind_values.push(Value::Text(genre.to_string()));
        }
        if let Some(language) = query.language {
            sql.push_str(" AND language = ?");
            bind_values.push(Value::Text(language.code().to_string()));
        }

        sql.push_str(" ORDER BY title ASC, id ASC");
        query.page.push_sql(&mut sql, &mut bind_values);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut books = Vec::new();
        while let Some(row) = rows.next()? {
            books.push(parse_book_row(row)?);
        }
        books
            .into_iter()
            .map(|book| with_genre_links(self.conn, book))
            .collect()
    }

    fn delete_book(&self, id: BookId) -> RepoResult<()> {
        delete_restricted(
            self.conn,
            EntityKind::Book,
            "books",
            id,
            &Dependents {
                entity: EntityKind::BookInstance,
                table: "book_instances",
                column: "book_id",
            },
        )
    }

    fn set_book_genres(&self, id: BookId, genres: &BTreeSet<GenreId>) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        if !record_exists(&tx, "books", id)? {
            return Err(book_not_found(id));
        }
        ensure_references_exist(&tx, None, genres)?;
        replace_genre_links(&tx, id, genres)?;
        tx.commit()?;
        Ok(())
    }

    fn add_book_genre(&self, id: BookId, genre: GenreId) -> RepoResult<()> {
        if !record_exists(self.conn, "books", id)? {
            return Err(book_not_found(id));
        }
        ensure_references_exist(self.conn, None, &BTreeSet::from([genre]))?;
        self.conn.execute(
            "INSERT OR IGNORE INTO book_genres (book_id, genre_id) VALUES (?1, ?2);",
            params![id.to_string(), genre.to_string()],
        )?;
        Ok(())
    }

    fn remove_book_genre(&self, id: BookId, genre: GenreId) -> RepoResult<()> {
        if !record_exists(self.conn, "books", id)? {
            return Err(book_not_found(id));
        }
        self.conn.execute(
            "DELETE FROM book_genres WHERE book_id = ?1 AND genre_id = ?2;",
            params![id.to_string(), genre.to_string()],
        )?;
        Ok(())
    }

    fn list_book_genres(&self, id: BookId) -> RepoResult<Vec<Genre>> {
        if !record_exists(self.conn, "books", id)? {
            return Err(book_not_found(id));
        }
        let mut stmt = self.conn.prepare(
            "SELECT g.id, g.title
             FROM genres g
             INNER JOIN book_genres bg ON bg.genre_id = g.id
             WHERE bg.book_id = ?1
             ORDER BY g.title_key ASC, g.id ASC;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        let mut genres = Vec::new();
        while let Some(row) = rows.next()? {
            genres.push(parse_genre_row(row)?);
        }
        Ok(genres)
    }
}

fn book_not_found(id: BookId) -> RepoError {
    RepoError::NotFound {
        entity: EntityKind::Book,
        id,
    }
}

fn ensure_references_exist(
    conn: &Connection,
    author: Option<AuthorId>,
    genres: &BTreeSet<GenreId>,
) -> RepoResult<()> {
    if let Some(author) = author {
        if !record_exists(conn, "authors", author)? {
            return Err(RepoError::UnknownReference {
                field: "author",
                entity: EntityKind::Author,
                id: author,
            });
        }
    }
    for genre in genres {
        if !record_exists(conn, "genres", *genre)? {
            return Err(RepoError::UnknownReference {
                field: "genre",
                entity: EntityKind::Genre,
                id: *genre,
            });
        }
    }
    Ok(())
}

fn replace_genre_links(
    conn: &Connection,
    id: BookId,
    genres: &BTreeSet<GenreId>,
) -> RepoResult<()> {
    let book_id = id.to_string();
    conn.execute("DELETE FROM book_genres WHERE book_id = ?1;", [book_id.as_str()])?;
    for genre in genres {
        conn.execute(
            "INSERT INTO book_genres (book_id, genre_id) VALUES (?1, ?2);",
            params![book_id.as_str(), genre.to_string()],
        )?;
    }
    Ok(())
}

fn with_genre_links(conn: &Connection, mut book: Book) -> RepoResult<Book> {
    let mut stmt = conn.prepare("SELECT genre_id FROM book_genres WHERE book_id = ?1;")?;
    let mut rows = stmt.query([book.id.to_string()])?;
    while let Some(row) = rows.next()? {
        let genre_text: String = row.get("genre_id")?;
        let genre = parse_uuid(&genre_text, "book_genres.genre_id")?;
        book.genre.insert(genre);
    }
    Ok(book)
}

pub(crate) fn parse_book_row(row: &Row<'_>) -> RepoResult<Book> {
    let id_text: String = row.get("id")?;
    let language_text: String = row.get("language")?;
    let language = Language::from_code(&language_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid language `{language_text}` in books.language"
        ))
    })?;

    let book = Book {
        id: parse_uuid(&id_text, "books.id")?,
        title: row.get("title")?,
        author: parse_optional_uuid(row.get("author_id")?, "books.author_id")?,
        isbn: row.get("isbn")?,
        summary: row.get("summary")?,
        genre: BTreeSet::new(),
        language,
    };
    book.validate()?;
    Ok(book)
}

fn map_book_write_error(err: rusqlite::Error) -> RepoError {
    match unique_violation_target(&err) {
        Some("books.isbn") => RepoError::UniquenessViolation {
            entity: EntityKind::Book,
            field: "isbn",
            message: BOOK_ISBN_EXISTS_MESSAGE.to_string(),
        },
        Some("books.id") => duplicate_id(EntityKind::Book),
        _ => err.into(),
    }
}
