//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep admin-console callers decoupled from storage details.

pub mod catalog_service;
