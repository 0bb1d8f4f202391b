//! List-view data for the admin console.
//!
//! # Responsibility
//! - Render configured list columns of loaded records into text cells.
//! - Apply list filters (choice and date ranges) declared for an entity.
//! - Describe the selectable options of every configured filter.
//!
//! # Invariants
//! - Records keep the order they were loaded in.
//! - Only fields registered in `list_filter` can be filtered on.
//! - Empty values render as `EMPTY_VALUE`.

use super::registry::{ModelAdmin, DISPLAY_COLUMN};
use crate::model::author::Author;
use crate::model::book::Book;
use crate::model::book_instance::BookInstanceEntry;
use crate::model::entity::{EntityKind, FieldKind};
use crate::model::genre::Genre;
use chrono::{Datelike, Duration, NaiveDate};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Cell text for empty values.
pub const EMPTY_VALUE: &str = "-";

/// Record the admin console can list.
pub trait AdminRecord {
    const ENTITY: EntityKind;

    fn record_id(&self) -> Uuid;

    /// Canonical string form shown in the `display` column.
    fn display_label(&self) -> String;

    /// Text of one field, `None` when empty or unknown.
    fn field_text(&self, field: &str) -> Option<String>;

    /// Stored code of a choice field.
    fn choice_code(&self, _field: &str) -> Option<&'static str> {
        None
    }

    /// Value of a date field.
    fn date_value(&self, _field: &str) -> Option<NaiveDate> {
        None
    }
}

/// Date-range options of a date list filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    AnyDate,
    Today,
    PastSevenDays,
    ThisMonth,
    ThisYear,
    NoDate,
    HasDate,
}

impl DateRange {
    pub const ALL: [DateRange; 7] = [
        DateRange::AnyDate,
        DateRange::Today,
        DateRange::PastSevenDays,
        DateRange::ThisMonth,
        DateRange::ThisYear,
        DateRange::NoDate,
        DateRange::HasDate,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::AnyDate => "Any date",
            Self::Today => "Today",
            Self::PastSevenDays => "Past 7 days",
            Self::ThisMonth => "This month",
            Self::ThisYear => "This year",
            Self::NoDate => "No date",
            Self::HasDate => "Has date",
        }
    }

    /// Whether `value` falls in this range relative to `today`.
    pub fn matches(self, value: Option<NaiveDate>, today: NaiveDate) -> bool {
        match (self, value) {
            (Self::AnyDate, _) => true,
            (Self::NoDate, value) => value.is_none(),
            (Self::HasDate, value) => value.is_some(),
            (_, None) => false,
            (Self::Today, Some(date)) => date == today,
            (Self::PastSevenDays, Some(date)) => {
                date >= today - Duration::days(7) && date <= today
            }
            (Self::ThisMonth, Some(date)) => {
                date.year() == today.year() && date.month() == today.month()
            }
            (Self::ThisYear, Some(date)) => date.year() == today.year(),
        }
    }
}

/// One active list filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListFilter {
    /// Keep records whose choice field stores `code`.
    Choice { field: &'static str, code: String },
    /// Keep records whose date field falls in `range`.
    Date {
        field: &'static str,
        range: DateRange,
    },
}

impl ListFilter {
    pub fn field(&self) -> &'static str {
        match self {
            Self::Choice { field, .. } | Self::Date { field, .. } => *field,
        }
    }

    fn keeps<R: AdminRecord>(&self, record: &R, today: NaiveDate) -> bool {
        match self {
            Self::Choice { field, code } => record.choice_code(field) == Some(code.as_str()),
            Self::Date { field, range } => range.matches(record.date_value(field), today),
        }
    }
}

/// Selectable option of a list filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    pub label: &'static str,
    /// Filter to apply, `None` for the "All" option.
    pub filter: Option<ListFilter>,
}

/// Sidebar description of one configured filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub field: &'static str,
    pub title: &'static str,
    pub options: Vec<FilterOption>,
}

/// Errors raised while building a change list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeListError {
    /// Admin configuration belongs to another entity than the records.
    EntityMismatch {
        admin: EntityKind,
        records: EntityKind,
    },
    /// Filter field is not registered in `list_filter`.
    FilterNotAllowed {
        entity: EntityKind,
        field: &'static str,
    },
    /// Choice filter code is not part of the field's choice set.
    InvalidChoice { field: &'static str, code: String },
}

impl Display for ChangeListError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EntityMismatch { admin, records } => write!(
                f,
                "admin configuration for {admin} cannot list {records} records"
            ),
            Self::FilterNotAllowed { entity, field } => {
                write!(f, "{entity}: `{field}` is not a registered list filter")
            }
            Self::InvalidChoice { field, code } => {
                write!(f, "{field}: `{code}` is not a valid choice")
            }
        }
    }
}

impl Error for ChangeListError {}

/// One rendered list-view row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeListRow {
    pub id: Uuid,
    pub cells: Vec<String>,
}

/// Rendered list view of one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeList {
    pub entity: EntityKind,
    pub headers: Vec<String>,
    pub rows: Vec<ChangeListRow>,
}

impl ChangeList {
    /// Builds the list view of `records` after applying `filters`.
    ///
    /// `today` anchors relative date ranges.
    pub fn build<R: AdminRecord>(
        admin: &ModelAdmin,
        records: &[R],
        filters: &[ListFilter],
        today: NaiveDate,
    ) -> Result<Self, ChangeListError> {
        if admin.entity != R::ENTITY {
            return Err(ChangeListError::EntityMismatch {
                admin: admin.entity,
                records: R::ENTITY,
            });
        }
        for filter in filters {
            check_filter(admin, filter)?;
        }

        let headers = admin
            .list_display
            .iter()
            .map(|column| column_header(admin.entity, column))
            .collect();
        let rows = records
            .iter()
            .filter(|record| filters.iter().all(|filter| filter.keeps(*record, today)))
            .map(|record| ChangeListRow {
                id: record.record_id(),
                cells: admin
                    .list_display
                    .iter()
                    .map(|column| render_cell(record, column))
                    .collect(),
            })
            .collect();

        Ok(Self {
            entity: admin.entity,
            headers,
            rows,
        })
    }
}

/// Lists the options of every configured filter, in configuration order.
pub fn filter_options(admin: &ModelAdmin) -> Vec<FilterSpec> {
    admin
        .list_filter
        .iter()
        .filter_map(|&field| {
            let spec = admin.entity.field(field)?;
            let mut options = Vec::new();
            match spec.kind {
                FieldKind::Choice(choices) => {
                    options.push(FilterOption {
                        label: "All",
                        filter: None,
                    });
                    for (code, label) in choices.options() {
                        options.push(FilterOption {
                            label,
                            filter: Some(ListFilter::Choice {
                                field,
                                code: code.to_string(),
                            }),
                        });
                    }
                }
                FieldKind::Date => {
                    for range in DateRange::ALL {
                        options.push(FilterOption {
                            label: range.label(),
                            filter: (range != DateRange::AnyDate)
                                .then_some(ListFilter::Date { field, range }),
                        });
                    }
                }
                _ => return None,
            }
            Some(FilterSpec {
                field,
                title: spec.label,
                options,
            })
        })
        .collect()
}

fn check_filter(admin: &ModelAdmin, filter: &ListFilter) -> Result<(), ChangeListError> {
    let field = filter.field();
    let not_allowed = ChangeListError::FilterNotAllowed {
        entity: admin.entity,
        field,
    };
    if !admin.list_filter.contains(&field) {
        return Err(not_allowed);
    }
    let Some(spec) = admin.entity.field(field) else {
        return Err(not_allowed);
    };
    match (filter, spec.kind) {
        (ListFilter::Choice { code, .. }, FieldKind::Choice(choices)) => {
            if choices.label_of(code).is_none() {
                return Err(ChangeListError::InvalidChoice {
                    field,
                    code: code.clone(),
                });
            }
            Ok(())
        }
        (ListFilter::Date { .. }, FieldKind::Date) => Ok(()),
        _ => Err(not_allowed),
    }
}

fn column_header(entity: EntityKind, column: &str) -> String {
    if column == DISPLAY_COLUMN {
        return entity.verbose_name().to_string();
    }
    entity
        .field(column)
        .map_or_else(|| column.to_string(), |spec| spec.label.to_string())
}

fn render_cell<R: AdminRecord>(record: &R, column: &str) -> String {
    let text = if column == DISPLAY_COLUMN {
        Some(record.display_label())
    } else {
        record.field_text(column)
    };
    text.filter(|value| !value.is_empty())
        .unwrap_or_else(|| EMPTY_VALUE.to_string())
}

fn date_text(value: Option<NaiveDate>) -> Option<String> {
    value.map(|date| date.format("%Y-%m-%d").to_string())
}

impl AdminRecord for Genre {
    const ENTITY: EntityKind = EntityKind::Genre;

    fn record_id(&self) -> Uuid {
        self.id
    }

    fn display_label(&self) -> String {
        self.to_string()
    }

    fn field_text(&self, field: &str) -> Option<String> {
        match field {
            "id" => Some(self.id.to_string()),
            "title" => Some(self.title.clone()),
            _ => None,
        }
    }
}

impl AdminRecord for Author {
    const ENTITY: EntityKind = EntityKind::Author;

    fn record_id(&self) -> Uuid {
        self.id
    }

    fn display_label(&self) -> String {
        self.to_string()
    }

    fn field_text(&self, field: &str) -> Option<String> {
        match field {
            "id" => Some(self.id.to_string()),
            "first_name" => Some(self.first_name.clone()),
            "last_name" => Some(self.last_name.clone()),
            "date_of_birth" => date_text(self.date_of_birth),
            "date_of_death" => date_text(self.date_of_death),
            _ => None,
        }
    }

    fn date_value(&self, field: &str) -> Option<NaiveDate> {
        match field {
            "date_of_birth" => self.date_of_birth,
            "date_of_death" => self.date_of_death,
            _ => None,
        }
    }
}

impl AdminRecord for Book {
    const ENTITY: EntityKind = EntityKind::Book;

    fn record_id(&self) -> Uuid {
        self.id
    }

    fn display_label(&self) -> String {
        self.to_string()
    }

    fn field_text(&self, field: &str) -> Option<String> {
        match field {
            "id" => Some(self.id.to_string()),
            "title" => Some(self.title.clone()),
            "author" => self.author.map(|id| id.to_string()),
            "isbn" => Some(self.isbn.clone()),
            "summary" => Some(self.summary.clone()),
            "language" => Some(self.language.label().to_string()),
            _ => None,
        }
    }

    fn choice_code(&self, field: &str) -> Option<&'static str> {
        (field == "language").then(|| self.language.code())
    }
}

impl AdminRecord for BookInstanceEntry {
    const ENTITY: EntityKind = EntityKind::BookInstance;

    fn record_id(&self) -> Uuid {
        self.instance.id
    }

    fn display_label(&self) -> String {
        self.to_string()
    }

    fn field_text(&self, field: &str) -> Option<String> {
        let copy = &self.instance;
        match field {
            "id" => Some(copy.id.to_string()),
            "book" => match &self.book {
                Some(book) => Some(book.title.clone()),
                None => copy.book.map(|id| id.to_string()),
            },
            "imprint" => Some(copy.imprint.clone()),
            "due_back" => date_text(copy.due_back),
            "status" => Some(copy.status.label().to_string()),
            _ => None,
        }
    }

    fn choice_code(&self, field: &str) -> Option<&'static str> {
        (field == "status").then(|| self.instance.status.code())
    }

    fn date_value(&self, field: &str) -> Option<NaiveDate> {
        (field == "due_back")
            .then_some(self.instance.due_back)
            .flatten()
    }
}
