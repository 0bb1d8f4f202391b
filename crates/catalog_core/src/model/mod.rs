//! Catalog schema: record types, field constraints and choice sets.
//!
//! # Responsibility
//! - Define the four catalog records and their field-level validation.
//! - Give every record a canonical string form, and every browsable record a
//!   detail locator.
//!
//! # Invariants
//! - Every record is identified by a non-nil UUID.
//! - Relations are references only; no record owns another.

pub mod author;
pub mod book;
pub mod book_instance;
pub mod choices;
pub mod entity;
pub mod genre;
pub mod route;
pub mod validation;
