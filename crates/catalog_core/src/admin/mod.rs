//! Admin console configuration and list views.
//!
//! # Responsibility
//! - Hold per-entity admin registrations built from an explicit list.
//! - Render filtered list views from loaded records.
//!
//! # Invariants
//! - Configuration errors surface when the site is built, never at render time.

pub mod changelist;
pub mod registry;

pub use changelist::{
    filter_options, AdminRecord, ChangeList, ChangeListError, ChangeListRow, DateRange,
    FilterOption, FilterSpec, ListFilter, EMPTY_VALUE,
};
pub use registry::{
    catalog_registrations, AdminConfigError, AdminSite, FormRow, ModelAdmin, DISPLAY_COLUMN,
};
