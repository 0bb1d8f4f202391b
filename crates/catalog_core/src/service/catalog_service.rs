//! Catalog use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD entry points for admin-console callers.
//! - Assemble detail views that span several records.
//! - Emit one structured log event per mutating use-case.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer stays storage-agnostic; SQLite only appears in `open`.

use crate::model::author::{Author, AuthorId};
use crate::model::book::{Book, BookId};
use crate::model::book_instance::{BookInstance, BookInstanceEntry, BookInstanceId};
use crate::model::choices::LoanStatus;
use crate::model::entity::EntityKind;
use crate::model::genre::{Genre, GenreId};
use crate::repo::author_repo::{AuthorRepository, SqliteAuthorRepository};
use crate::repo::book_instance_repo::{
    BookInstanceListQuery, BookInstanceRepository, SqliteBookInstanceRepository,
};
use crate::repo::book_repo::{BookListQuery, BookRepository, SqliteBookRepository};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::genre_repo::{GenreRepository, SqliteGenreRepository};
use crate::repo::Page;
use chrono::NaiveDate;
use log::{info, warn};
use rusqlite::Connection;
use std::collections::BTreeSet;
use uuid::Uuid;

/// Everything a book detail page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDetail {
    pub book: Book,
    pub author: Option<Author>,
    /// Linked genres ordered by title.
    pub genres: Vec<Genre>,
    /// Copies in default listing order.
    pub copies: Vec<BookInstance>,
}

/// Use-case service over the four catalog repositories.
pub struct CatalogService<G, A, B, I> {
    genres: G,
    authors: A,
    books: B,
    copies: I,
}

/// Catalog service backed by one SQLite connection.
pub type SqliteCatalogService<'conn> = CatalogService<
    SqliteGenreRepository<'conn>,
    SqliteAuthorRepository<'conn>,
    SqliteBookRepository<'conn>,
    SqliteBookInstanceRepository<'conn>,
>;

impl<'conn> SqliteCatalogService<'conn> {
    /// Builds every repository on one migrated connection.
    pub fn open(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self::new(
            SqliteGenreRepository::try_new(conn)?,
            SqliteAuthorRepository::try_new(conn)?,
            SqliteBookRepository::try_new(conn)?,
            SqliteBookInstanceRepository::try_new(conn)?,
        ))
    }
}

impl<G, A, B, I> CatalogService<G, A, B, I>
where
    G: GenreRepository,
    A: AuthorRepository,
    B: BookRepository,
    I: BookInstanceRepository,
{
    pub fn new(genres: G, authors: A, books: B, copies: I) -> Self {
        Self {
            genres,
            authors,
            books,
            copies,
        }
    }

    /// Creates a genre from a title.
    ///
    /// Fails with `UniquenessViolation` ("Genre already exists") when a genre
    /// with the same title in any letter case exists.
    pub fn add_genre(&self, title: impl Into<String>) -> RepoResult<Genre> {
        let genre = Genre::new(title);
        let result = self.genres.create_genre(&genre);
        log_outcome("genre_create", EntityKind::Genre, genre.id, &result);
        result.map(|_| genre)
    }

    pub fn rename_genre(&self, id: GenreId, title: impl Into<String>) -> RepoResult<Genre> {
        let genre = Genre {
            id,
            title: title.into().trim().to_string(),
        };
        let result = self.genres.update_genre(&genre);
        log_outcome("genre_update", EntityKind::Genre, id, &result);
        result.map(|()| genre)
    }

    /// Deletes a genre and its book links; linked books are kept.
    pub fn remove_genre(&self, id: GenreId) -> RepoResult<()> {
        let result = self.genres.delete_genre(id);
        log_outcome("genre_delete", EntityKind::Genre, id, &result);
        result
    }

    pub fn list_genres(&self, page: &Page) -> RepoResult<Vec<Genre>> {
        self.genres.list_genres(page)
    }

    pub fn add_author(&self, author: &Author) -> RepoResult<AuthorId> {
        let result = self.authors.create_author(author);
        log_outcome("author_create", EntityKind::Author, author.id, &result);
        result
    }

    pub fn update_author(&self, author: &Author) -> RepoResult<()> {
        let result = self.authors.update_author(author);
        log_outcome("author_update", EntityKind::Author, author.id, &result);
        result
    }

    /// Deletes an author no book references.
    pub fn remove_author(&self, id: AuthorId) -> RepoResult<()> {
        let result = self.authors.delete_author(id);
        log_outcome("author_delete", EntityKind::Author, id, &result);
        result
    }

    pub fn get_author(&self, id: AuthorId) -> RepoResult<Option<Author>> {
        self.authors.get_author(id)
    }

    pub fn list_authors(&self, page: &Page) -> RepoResult<Vec<Author>> {
        self.authors.list_authors(page)
    }

    /// Creates a book together with its genre links.
    pub fn add_book(&self, book: &Book) -> RepoResult<BookId> {
        let result = self.books.create_book(book);
        log_outcome("book_create", EntityKind::Book, book.id, &result);
        result
    }

    pub fn update_book(&self, book: &Book) -> RepoResult<()> {
        let result = self.books.update_book(book);
        log_outcome("book_update", EntityKind::Book, book.id, &result);
        result
    }

    pub fn set_book_genres(&self, id: BookId, genres: &BTreeSet<GenreId>) -> RepoResult<()> {
        let result = self.books.set_book_genres(id, genres);
        log_outcome("book_set_genres", EntityKind::Book, id, &result);
        result
    }

    /// Deletes a book no copy references.
    pub fn remove_book(&self, id: BookId) -> RepoResult<()> {
        let result = self.books.delete_book(id);
        log_outcome("book_delete", EntityKind::Book, id, &result);
        result
    }

    pub fn list_books(&self, query: &BookListQuery) -> RepoResult<Vec<Book>> {
        self.books.list_books(query)
    }

    /// Loads a book with its author, genres and copies.
    pub fn book_detail(&self, id: BookId) -> RepoResult<Option<BookDetail>> {
        let Some(book) = self.books.get_book(id)? else {
            return Ok(None);
        };
        let author = match book.author {
            Some(author_id) => self.authors.get_author(author_id)?,
            None => None,
        };
        let genres = self.books.list_book_genres(id)?;
        let copies = self.copies.list_book_instances(&BookInstanceListQuery {
            book: Some(id),
            ..BookInstanceListQuery::default()
        })?;

        Ok(Some(BookDetail {
            book,
            author,
            genres,
            copies,
        }))
    }

    /// Registers a new available copy of a book.
    pub fn add_copy(
        &self,
        book: Option<BookId>,
        imprint: impl Into<String>,
    ) -> RepoResult<BookInstance> {
        let copy = BookInstance::new(book, imprint);
        let result = self.copies.create_book_instance(&copy);
        log_outcome("copy_create", EntityKind::BookInstance, copy.id, &result);
        result.map(|_| copy)
    }

    /// Sets status and due date of a copy.
    ///
    /// Any status may follow any other; no circulation rules are applied.
    pub fn set_copy_status(
        &self,
        id: BookInstanceId,
        status: LoanStatus,
        due_back: Option<NaiveDate>,
    ) -> RepoResult<BookInstance> {
        let result = self.apply_copy_status(id, status, due_back);
        log_outcome("copy_set_status", EntityKind::BookInstance, id, &result);
        result
    }

    fn apply_copy_status(
        &self,
        id: BookInstanceId,
        status: LoanStatus,
        due_back: Option<NaiveDate>,
    ) -> RepoResult<BookInstance> {
        let mut copy = self
            .copies
            .get_book_instance(id)?
            .ok_or(RepoError::NotFound {
                entity: EntityKind::BookInstance,
                id,
            })?;
        copy.status = status;
        copy.due_back = due_back;
        self.copies.update_book_instance(&copy)?;
        Ok(copy)
    }

    pub fn remove_copy(&self, id: BookInstanceId) -> RepoResult<()> {
        let result = self.copies.delete_book_instance(id);
        log_outcome("copy_delete", EntityKind::BookInstance, id, &result);
        result
    }

    pub fn list_copies(&self, query: &BookInstanceListQuery) -> RepoResult<Vec<BookInstance>> {
        self.copies.list_book_instances(query)
    }

    /// Copies matching `query`, each paired with its referenced book.
    pub fn list_copy_entries(
        &self,
        query: &BookInstanceListQuery,
    ) -> RepoResult<Vec<BookInstanceEntry>> {
        self.copies
            .list_book_instances(query)?
            .into_iter()
            .map(|copy| self.copy_entry(copy))
            .collect()
    }

    /// Canonical label of a copy, resolving the referenced book title.
    pub fn copy_label(&self, id: BookInstanceId) -> RepoResult<Option<String>> {
        let Some(copy) = self.copies.get_book_instance(id)? else {
            return Ok(None);
        };
        Ok(Some(self.copy_entry(copy)?.to_string()))
    }

    fn copy_entry(&self, copy: BookInstance) -> RepoResult<BookInstanceEntry> {
        let book = match copy.book {
            Some(book_id) => self.books.get_book(book_id)?,
            None => None,
        };
        Ok(BookInstanceEntry::new(copy, book))
    }
}

fn log_outcome<T>(event: &str, entity: EntityKind, id: Uuid, result: &RepoResult<T>) {
    match result {
        Ok(_) => info!("event={event} module=service status=ok entity={entity} id={id}"),
        // Constraint failures are expected user errors, not faults.
        Err(err) => warn!(
            "event={event} module=service status=error entity={entity} id={id} error_code={} error={err}",
            err.code()
        ),
    }
}
