//! Author record.
//!
//! # Invariants
//! - Names are required and at most 20 characters each.
//! - Default ordering is `last_name`, then `first_name`.
//! - An author referenced by any book cannot be deleted.

use super::route::{DetailLocator, DetailRoute};
use super::validation::{require_text, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type AuthorId = Uuid;

pub const AUTHOR_NAME_MAX_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            date_of_birth: None,
            date_of_death: None,
        }
    }

    pub fn with_id(
        id: AuthorId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        if id.is_nil() {
            return Err(ValidationError::NilId);
        }
        let mut author = Self::new(first_name, last_name);
        author.id = id;
        Ok(author)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::NilId);
        }
        require_text("first_name", &self.first_name, AUTHOR_NAME_MAX_LEN)?;
        require_text("last_name", &self.last_name, AUTHOR_NAME_MAX_LEN)
    }
}

impl Display for Author {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.last_name, self.first_name)
    }
}

impl DetailLocator for Author {
    const ROUTE: DetailRoute = DetailRoute::Author;

    fn locator_id(&self) -> Uuid {
        self.id
    }
}
