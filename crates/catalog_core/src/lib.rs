//! Core data layer of the library catalog.
//! This crate is the single source of truth for catalog invariants.

pub mod admin;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use admin::{catalog_registrations, AdminSite, ChangeList, ModelAdmin};
pub use config::{CatalogConfig, ConfigError};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, LoggingError};
pub use model::author::{Author, AuthorId};
pub use model::book::{Book, BookId};
pub use model::book_instance::{BookInstance, BookInstanceEntry, BookInstanceId};
pub use model::choices::{Language, LoanStatus};
pub use model::entity::EntityKind;
pub use model::genre::{Genre, GenreId};
pub use model::route::{reverse, DetailLocator, DetailRoute};
pub use model::validation::ValidationError;
pub use repo::error::{RepoError, RepoResult};
pub use repo::Page;
pub use service::catalog_service::{BookDetail, CatalogService, SqliteCatalogService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
