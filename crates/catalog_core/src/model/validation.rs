//! Field-level validation shared by every catalog record.
//!
//! # Responsibility
//! - Reject blank, oversized or out-of-choice values before any SQL runs.
//! - Tag every failure with the field it belongs to so forms can surface it.
//!
//! # Invariants
//! - Lengths are counted in Unicode scalar values, not bytes.
//! - Required text is checked after trimming surrounding whitespace.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Record id is the nil UUID.
    NilId,
    /// Required text field is empty or whitespace only.
    Required { field: &'static str },
    /// Text field exceeds its maximum length.
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
    /// Value is not part of the field's closed choice set.
    InvalidChoice { field: &'static str, value: String },
}

impl ValidationError {
    /// Name of the field the error belongs to, `id` for identity errors.
    pub fn field(&self) -> &'static str {
        match self {
            Self::NilId => "id",
            Self::Required { field }
            | Self::TooLong { field, .. }
            | Self::InvalidChoice { field, .. } => field,
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "id must not be the nil uuid"),
            Self::Required { field } => write!(f, "{field}: this field is required"),
            Self::TooLong { field, max, actual } => write!(
                f,
                "{field}: ensure this value has at most {max} characters (it has {actual})"
            ),
            Self::InvalidChoice { field, value } => write!(
                f,
                "{field}: select a valid choice; `{value}` is not one of the available choices"
            ),
        }
    }
}

impl Error for ValidationError {}

/// Checks a required, length-bounded text field.
pub(crate) fn require_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }
    check_max_len(field, value, max)
}

pub(crate) fn check_max_len(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong { field, max, actual });
    }
    Ok(())
}
