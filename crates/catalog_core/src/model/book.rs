//! Book record.
//!
//! # Invariants
//! - `isbn` is unique across all books (exact comparison).
//! - `author`, when set, must reference an existing author.
//! - `genre` is the full set of linked genres; links are replaced as a whole.
//! - A book referenced by any book instance cannot be deleted.

use super::author::AuthorId;
use super::choices::Language;
use super::genre::GenreId;
use super::route::{DetailLocator, DetailRoute};
use super::validation::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type BookId = Uuid;

pub const BOOK_TITLE_MAX_LEN: usize = 50;
pub const BOOK_ISBN_MAX_LEN: usize = 13;
pub const BOOK_SUMMARY_MAX_LEN: usize = 200;

pub const BOOK_ISBN_EXISTS_MESSAGE: &str = "Book with this ISBN already exists";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: Option<AuthorId>,
    pub isbn: String,
    pub summary: String,
    #[serde(default)]
    pub genre: BTreeSet<GenreId>,
    #[serde(default)]
    pub language: Language,
}

impl Book {
    /// Creates an unlinked book in the default language.
    pub fn new(
        title: impl Into<String>,
        isbn: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            author: None,
            isbn: isbn.into(),
            summary: summary.into(),
            genre: BTreeSet::new(),
            language: Language::default(),
        }
    }

    pub fn with_author(mut self, author: AuthorId) -> Self {
        self.author = Some(author);
        self
    }

    pub fn with_genres(mut self, genres: impl IntoIterator<Item = GenreId>) -> Self {
        self.genre = genres.into_iter().collect();
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::NilId);
        }
        require_text("title", &self.title, BOOK_TITLE_MAX_LEN)?;
        require_text("isbn", &self.isbn, BOOK_ISBN_MAX_LEN)?;
        require_text("summary", &self.summary, BOOK_SUMMARY_MAX_LEN)
    }
}

impl Display for Book {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

impl DetailLocator for Book {
    const ROUTE: DetailRoute = DetailRoute::BookDetails;

    fn locator_id(&self) -> Uuid {
        self.id
    }
}
