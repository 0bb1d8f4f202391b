//! Book instance record: one physical, borrowable copy of a book.
//!
//! # Invariants
//! - `book`, when set, must reference an existing book.
//! - `status` is a flat attribute; any value may replace any other.
//! - Default ordering is `due_back` ascending with undated copies last.

use super::book::{Book, BookId};
use super::choices::LoanStatus;
use super::validation::{require_text, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type BookInstanceId = Uuid;

pub const IMPRINT_MAX_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInstance {
    pub id: BookInstanceId,
    pub book: Option<BookId>,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    #[serde(default)]
    pub status: LoanStatus,
}

impl BookInstance {
    /// Creates an available copy with no due date.
    pub fn new(book: Option<BookId>, imprint: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            book,
            imprint: imprint.into(),
            due_back: None,
            status: LoanStatus::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::NilId);
        }
        require_text("imprint", &self.imprint, IMPRINT_MAX_LEN)
    }

    /// Canonical label: `<id> (<book title>)`.
    ///
    /// `book` must be the record referenced by `self.book`.
    pub fn label(&self, book: Option<&Book>) -> String {
        match book {
            Some(book) => format!("{} ({})", self.id, book.title),
            None => format!("{} (no book)", self.id),
        }
    }

    /// Default listing order: earliest due date first, undated last, then id.
    pub fn due_back_order(&self, other: &Self) -> Ordering {
        let by_date = match (self.due_back, other.due_back) {
            (Some(left), Some(right)) => left.cmp(&right),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_date.then_with(|| self.id.cmp(&other.id))
    }
}

/// A copy paired with the book it references.
///
/// The canonical string form of a copy names the book title, so display
/// paths go through this pairing rather than the bare record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookInstanceEntry {
    pub instance: BookInstance,
    /// Referenced book, `None` when the copy has no book.
    pub book: Option<Book>,
}

impl BookInstanceEntry {
    /// Pairs `instance` with `book`, dropping a book it does not reference.
    pub fn new(instance: BookInstance, book: Option<Book>) -> Self {
        let book = book.filter(|book| Some(book.id) == instance.book);
        Self { instance, book }
    }
}

impl Display for BookInstanceEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.instance.label(self.book.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::{BookInstance, BookInstanceEntry};
    use crate::model::book::Book;

    #[test]
    fn entry_displays_book_title() {
        let book = Book::new("Emma", "9780141439587", "Matchmaking.");
        let copy = BookInstance::new(Some(book.id), "Penguin");
        let entry = BookInstanceEntry::new(copy.clone(), Some(book));
        assert_eq!(entry.to_string(), format!("{} (Emma)", copy.id));
    }

    #[test]
    fn entry_ignores_unrelated_book() {
        let other = Book::new("Persuasion", "9780141439686", "Second chances.");
        let copy = BookInstance::new(None, "Loose copy");
        let entry = BookInstanceEntry::new(copy.clone(), Some(other));
        assert_eq!(entry.book, None);
        assert_eq!(entry.to_string(), format!("{} (no book)", copy.id));
    }
}
