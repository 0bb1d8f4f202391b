//! Per-entity admin registrations and the site that holds them.
//!
//! # Responsibility
//! - Declare list columns, list filters and edit-form layout per entity.
//! - Validate every declaration against the schema field catalogue.
//!
//! # Invariants
//! - An `AdminSite` is built once from an explicit list and never mutated.
//! - Each entity is registered at most once.
//! - Every referenced field exists on its entity and supports the option it
//!   is used in.

use crate::model::entity::{EntityKind, FieldSpec};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Pseudo-column rendering the record's canonical string form.
pub const DISPLAY_COLUMN: &str = "display";

/// One row of an edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormRow {
    /// Field on its own row.
    Single(&'static str),
    /// Several fields sharing one row.
    Inline(Vec<&'static str>),
}

impl FormRow {
    pub fn fields(&self) -> &[&'static str] {
        match self {
            Self::Single(field) => std::slice::from_ref(field),
            Self::Inline(fields) => fields,
        }
    }
}

/// Admin configuration of one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelAdmin {
    pub entity: EntityKind,
    /// Columns of the list view, in order.
    pub list_display: Vec<&'static str>,
    /// Fields offered as list-view filters.
    pub list_filter: Vec<&'static str>,
    /// Edit-form layout; `None` shows every editable field on its own row.
    pub fields: Option<Vec<FormRow>>,
}

impl ModelAdmin {
    /// Registration with default behavior: one `display` column, no filters.
    pub fn new(entity: EntityKind) -> Self {
        Self {
            entity,
            list_display: vec![DISPLAY_COLUMN],
            list_filter: Vec::new(),
            fields: None,
        }
    }

    pub fn list_display(mut self, columns: &[&'static str]) -> Self {
        self.list_display = columns.to_vec();
        self
    }

    pub fn list_filter(mut self, fields: &[&'static str]) -> Self {
        self.list_filter = fields.to_vec();
        self
    }

    pub fn fields(mut self, rows: Vec<FormRow>) -> Self {
        self.fields = Some(rows);
        self
    }

    /// Effective edit-form layout.
    pub fn form_layout(&self) -> Vec<FormRow> {
        match &self.fields {
            Some(rows) => rows.clone(),
            None => self
                .entity
                .editable_fields()
                .map(|field| FormRow::Single(field.name))
                .collect(),
        }
    }

    /// Validates declaration-level invariants against the field catalogue.
    pub fn validate(&self) -> Result<(), AdminConfigError> {
        let entity = self.entity;

        if self.list_display.is_empty() {
            return Err(AdminConfigError::EmptyListDisplay(entity));
        }
        let mut seen = BTreeSet::new();
        for &column in &self.list_display {
            if !seen.insert(column) {
                return Err(AdminConfigError::DuplicateField {
                    entity,
                    option: "list_display",
                    field: column,
                });
            }
            if column == DISPLAY_COLUMN {
                continue;
            }
            let spec = lookup(entity, "list_display", column)?;
            if !spec.is_listable() {
                return Err(AdminConfigError::Unsupported {
                    entity,
                    option: "list_display",
                    field: column,
                });
            }
        }

        let mut seen = BTreeSet::new();
        for &field in &self.list_filter {
            if !seen.insert(field) {
                return Err(AdminConfigError::DuplicateField {
                    entity,
                    option: "list_filter",
                    field,
                });
            }
            if !lookup(entity, "list_filter", field)?.is_filterable() {
                return Err(AdminConfigError::Unsupported {
                    entity,
                    option: "list_filter",
                    field,
                });
            }
        }

        if let Some(rows) = &self.fields {
            let mut seen = BTreeSet::new();
            for row in rows {
                if row.fields().is_empty() {
                    return Err(AdminConfigError::EmptyFormRow(entity));
                }
                for &field in row.fields() {
                    if !seen.insert(field) {
                        return Err(AdminConfigError::DuplicateField {
                            entity,
                            option: "fields",
                            field,
                        });
                    }
                    if !lookup(entity, "fields", field)?.is_editable() {
                        return Err(AdminConfigError::Unsupported {
                            entity,
                            option: "fields",
                            field,
                        });
                    }
                }
            }
        }

        Ok(())
    }
}

fn lookup(
    entity: EntityKind,
    option: &'static str,
    field: &'static str,
) -> Result<&'static FieldSpec, AdminConfigError> {
    entity.field(field).ok_or(AdminConfigError::UnknownField {
        entity,
        option,
        field,
    })
}

/// Admin configuration errors, reported when the site is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminConfigError {
    DuplicateRegistration(EntityKind),
    EmptyListDisplay(EntityKind),
    EmptyFormRow(EntityKind),
    UnknownField {
        entity: EntityKind,
        option: &'static str,
        field: &'static str,
    },
    /// Field exists but cannot be used in this option.
    Unsupported {
        entity: EntityKind,
        option: &'static str,
        field: &'static str,
    },
    DuplicateField {
        entity: EntityKind,
        option: &'static str,
        field: &'static str,
    },
}

impl Display for AdminConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateRegistration(entity) => {
                write!(f, "{entity} is already registered")
            }
            Self::EmptyListDisplay(entity) => {
                write!(f, "{entity}: list_display must name at least one column")
            }
            Self::EmptyFormRow(entity) => write!(f, "{entity}: fields contains an empty row"),
            Self::UnknownField {
                entity,
                option,
                field,
            } => write!(f, "{entity}: {option} refers to unknown field `{field}`"),
            Self::Unsupported {
                entity,
                option,
                field,
            } => write!(f, "{entity}: field `{field}` cannot be used in {option}"),
            Self::DuplicateField {
                entity,
                option,
                field,
            } => write!(f, "{entity}: {option} lists `{field}` more than once"),
        }
    }
}

impl Error for AdminConfigError {}

/// Validated, immutable set of admin registrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSite {
    registrations: BTreeMap<EntityKind, ModelAdmin>,
}

impl AdminSite {
    /// Builds a site from an explicit registration list.
    pub fn new(
        registrations: impl IntoIterator<Item = ModelAdmin>,
    ) -> Result<Self, AdminConfigError> {
        let mut by_entity = BTreeMap::new();
        for admin in registrations {
            admin.validate()?;
            let entity = admin.entity;
            if by_entity.insert(entity, admin).is_some() {
                return Err(AdminConfigError::DuplicateRegistration(entity));
            }
        }
        Ok(Self {
            registrations: by_entity,
        })
    }

    pub fn get(&self, entity: EntityKind) -> Option<&ModelAdmin> {
        self.registrations.get(&entity)
    }

    pub fn is_registered(&self, entity: EntityKind) -> bool {
        self.registrations.contains_key(&entity)
    }

    /// Edit-form layout of a registered entity.
    pub fn form_layout(&self, entity: EntityKind) -> Option<Vec<FormRow>> {
        self.get(entity).map(ModelAdmin::form_layout)
    }

    /// Registrations in stable entity order.
    pub fn registrations(&self) -> impl Iterator<Item = &ModelAdmin> {
        self.registrations.values()
    }
}

/// The catalog's admin registrations.
pub fn catalog_registrations() -> Vec<ModelAdmin> {
    vec![
        ModelAdmin::new(EntityKind::BookInstance).list_filter(&["status", "due_back"]),
        ModelAdmin::new(EntityKind::Book).list_display(&["title", "isbn", "language"]),
        ModelAdmin::new(EntityKind::Author)
            .list_display(&["first_name", "last_name", "date_of_birth", "date_of_death"])
            .fields(vec![
                FormRow::Single("first_name"),
                FormRow::Single("last_name"),
                FormRow::Inline(vec!["date_of_birth", "date_of_death"]),
            ]),
        ModelAdmin::new(EntityKind::Genre),
    ]
}
