//! Static field catalogue for every record type.
//!
//! The admin registration module validates its configuration against these
//! descriptors, so field names here must match the record struct fields.

use super::choices::{Language, LoanStatus};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Record types known to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Genre,
    Book,
    Author,
    BookInstance,
}

/// Storage shape of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Primary key, generated and never edited.
    Id,
    /// Bounded text.
    Text { max_len: usize },
    /// Optional calendar date.
    Date,
    /// Closed choice set stored as a code.
    Choice(ChoiceSet),
    /// Optional reference to one record of another entity.
    Reference(EntityKind),
    /// Set of references to another entity.
    ManyReference(EntityKind),
}

/// Closed choice sets used by choice fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceSet {
    Language,
    LoanStatus,
}

impl ChoiceSet {
    /// `(code, label)` pairs in declaration order.
    pub fn options(self) -> Vec<(&'static str, &'static str)> {
        match self {
            Self::Language => Language::ALL
                .into_iter()
                .map(|language| (language.code(), language.label()))
                .collect(),
            Self::LoanStatus => LoanStatus::ALL
                .into_iter()
                .map(|status| (status.code(), status.label()))
                .collect(),
        }
    }

    pub fn label_of(self, code: &str) -> Option<&'static str> {
        self.options()
            .into_iter()
            .find(|(option, _)| *option == code)
            .map(|(_, label)| label)
    }
}

/// Descriptor of one record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self { name, label, kind }
    }

    pub fn is_editable(&self) -> bool {
        !matches!(self.kind, FieldKind::Id)
    }

    /// Whether a list view may filter on this field.
    pub fn is_filterable(&self) -> bool {
        matches!(self.kind, FieldKind::Date | FieldKind::Choice(_))
    }

    /// Whether a list view may show this field as a column.
    pub fn is_listable(&self) -> bool {
        !matches!(self.kind, FieldKind::ManyReference(_))
    }
}

const GENRE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("id", "Id", FieldKind::Id),
    FieldSpec::new("title", "Title", FieldKind::Text { max_len: 50 }),
];

const AUTHOR_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("id", "Id", FieldKind::Id),
    FieldSpec::new("first_name", "First name", FieldKind::Text { max_len: 20 }),
    FieldSpec::new("last_name", "Last name", FieldKind::Text { max_len: 20 }),
    FieldSpec::new("date_of_birth", "Date of birth", FieldKind::Date),
    FieldSpec::new("date_of_death", "Date of death", FieldKind::Date),
];

const BOOK_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("id", "Id", FieldKind::Id),
    FieldSpec::new("title", "Title", FieldKind::Text { max_len: 50 }),
    FieldSpec::new("author", "Author", FieldKind::Reference(EntityKind::Author)),
    FieldSpec::new("isbn", "ISBN", FieldKind::Text { max_len: 13 }),
    FieldSpec::new("summary", "Summary", FieldKind::Text { max_len: 200 }),
    FieldSpec::new("genre", "Genre", FieldKind::ManyReference(EntityKind::Genre)),
    FieldSpec::new("language", "Language", FieldKind::Choice(ChoiceSet::Language)),
];

const BOOK_INSTANCE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("id", "Id", FieldKind::Id),
    FieldSpec::new("book", "Book", FieldKind::Reference(EntityKind::Book)),
    FieldSpec::new("imprint", "Imprint", FieldKind::Text { max_len: 200 }),
    FieldSpec::new("due_back", "Due back", FieldKind::Date),
    FieldSpec::new("status", "Status", FieldKind::Choice(ChoiceSet::LoanStatus)),
];

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Genre,
        EntityKind::Book,
        EntityKind::Author,
        EntityKind::BookInstance,
    ];

    /// Stable snake_case name used in logs and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Genre => "genre",
            Self::Book => "book",
            Self::Author => "author",
            Self::BookInstance => "book_instance",
        }
    }

    /// Human-readable singular name.
    pub fn verbose_name(self) -> &'static str {
        match self {
            Self::Genre => "Genre",
            Self::Book => "Book",
            Self::Author => "Author",
            Self::BookInstance => "Book instance",
        }
    }

    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            Self::Genre => GENRE_FIELDS,
            Self::Book => BOOK_FIELDS,
            Self::Author => AUTHOR_FIELDS,
            Self::BookInstance => BOOK_INSTANCE_FIELDS,
        }
    }

    pub fn field(self, name: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|field| field.name == name)
    }

    pub fn editable_fields(self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields().iter().filter(|field| field.is_editable())
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::{ChoiceSet, EntityKind, FieldKind};

    #[test]
    fn every_entity_has_an_id_field_first() {
        for entity in EntityKind::ALL {
            assert_eq!(entity.fields()[0].kind, FieldKind::Id, "{entity}");
        }
    }

    #[test]
    fn genre_set_is_neither_filterable_nor_listable() {
        let genre = EntityKind::Book.field("genre").unwrap();
        assert!(!genre.is_filterable());
        assert!(!genre.is_listable());
        assert!(!EntityKind::Book.field("isbn").unwrap().is_filterable());
        assert!(EntityKind::BookInstance.field("status").unwrap().is_filterable());
    }

    #[test]
    fn choice_sets_resolve_labels() {
        assert_eq!(ChoiceSet::LoanStatus.label_of("l"), Some("On loan"));
        assert_eq!(ChoiceSet::Language.options().len(), 12);
        assert_eq!(ChoiceSet::Language.label_of("xx"), None);
    }
}
