//! Genre record.
//!
//! # Invariants
//! - `title` is stored without surrounding whitespace.
//! - `title` is unique under case-insensitive comparison; `title_key` is the
//!   comparison form persisted next to the title.
//! - Deleting a genre only drops its book links, never the books.

use super::route::{DetailLocator, DetailRoute};
use super::validation::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type GenreId = Uuid;

pub const GENRE_TITLE_MAX_LEN: usize = 50;

/// Message carried by the case-insensitive title uniqueness error.
pub const GENRE_EXISTS_MESSAGE: &str = "Genre already exists";

/// Book genre such as "Poetry" or "Science fiction".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    pub title: String,
}

impl Genre {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: trim_title(title.into()),
        }
    }

    /// Creates a genre with a caller-provided id.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(id: GenreId, title: impl Into<String>) -> Result<Self, ValidationError> {
        if id.is_nil() {
            return Err(ValidationError::NilId);
        }
        Ok(Self {
            id,
            title: trim_title(title.into()),
        })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::NilId);
        }
        require_text("title", self.title.trim(), GENRE_TITLE_MAX_LEN)
    }

    /// Case-folded title used for uniqueness checks.
    pub fn title_key(&self) -> String {
        genre_title_key(&self.title)
    }
}

/// Comparison form of a genre title: trimmed and case-folded.
pub fn genre_title_key(title: &str) -> String {
    title.trim().to_lowercase()
}

fn trim_title(title: String) -> String {
    if title.trim().len() == title.len() {
        title
    } else {
        title.trim().to_string()
    }
}

impl Display for Genre {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

impl DetailLocator for Genre {
    const ROUTE: DetailRoute = DetailRoute::GenreDetail;

    fn locator_id(&self) -> Uuid {
        self.id
    }
}
