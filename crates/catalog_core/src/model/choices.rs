//! Closed choice sets stored as short codes.
//!
//! # Invariants
//! - The stored code of each variant never changes once released.
//! - `from_code` is the only way text becomes a choice value.

use super::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Language a book is written in.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "ja")]
    Japanese,
    #[serde(rename = "zh")]
    Chinese,
    #[serde(rename = "hi")]
    Hindi,
    #[serde(rename = "ru")]
    Russian,
    #[serde(rename = "pt")]
    Portuguese,
    #[serde(rename = "it")]
    Italian,
    #[serde(rename = "ko")]
    Korean,
    #[serde(rename = "sh")]
    Swahili,
}

impl Language {
    pub const ALL: [Language; 12] = [
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Japanese,
        Language::Chinese,
        Language::Hindi,
        Language::Russian,
        Language::Portuguese,
        Language::Italian,
        Language::Korean,
        Language::Swahili,
    ];

    /// Stored code.
    pub fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Spanish => "es",
            Self::French => "fr",
            Self::German => "de",
            Self::Japanese => "ja",
            Self::Chinese => "zh",
            Self::Hindi => "hi",
            Self::Russian => "ru",
            Self::Portuguese => "pt",
            Self::Italian => "it",
            Self::Korean => "ko",
            Self::Swahili => "sh",
        }
    }

    /// Human-readable label shown by the admin console.
    pub fn label(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Spanish => "Spanish",
            Self::French => "French",
            Self::German => "German",
            Self::Japanese => "Japanese",
            Self::Chinese => "Chinese",
            Self::Hindi => "Hindi",
            Self::Russian => "Russian",
            Self::Portuguese => "Portuguese",
            Self::Italian => "Italian",
            Self::Korean => "Korean",
            Self::Swahili => "Swahili",
        }
    }

    pub fn from_code(code: &str) -> Result<Self, ValidationError> {
        Self::ALL
            .into_iter()
            .find(|language| language.code() == code)
            .ok_or_else(|| ValidationError::InvalidChoice {
                field: "language",
                value: code.to_string(),
            })
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Circulation state of one physical copy.
///
/// Any status may be replaced by any other; no transition rules apply.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum LoanStatus {
    #[serde(rename = "l")]
    OnLoan,
    #[default]
    #[serde(rename = "a")]
    Available,
    #[serde(rename = "r")]
    Reserved,
}

impl LoanStatus {
    pub const ALL: [LoanStatus; 3] = [
        LoanStatus::OnLoan,
        LoanStatus::Available,
        LoanStatus::Reserved,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::OnLoan => "l",
            Self::Available => "a",
            Self::Reserved => "r",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::OnLoan => "On loan",
            Self::Available => "Available",
            Self::Reserved => "Reserved",
        }
    }

    pub fn from_code(code: &str) -> Result<Self, ValidationError> {
        Self::ALL
            .into_iter()
            .find(|status| status.code() == code)
            .ok_or_else(|| ValidationError::InvalidChoice {
                field: "status",
                value: code.to_string(),
            })
    }
}

impl Display for LoanStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::{Language, LoanStatus};
    use crate::model::validation::ValidationError;

    #[test]
    fn every_language_code_parses_back() {
        for language in Language::ALL {
            assert_eq!(Language::from_code(language.code()), Ok(language));
        }
    }

    #[test]
    fn unknown_codes_are_rejected_with_field_name() {
        assert_eq!(
            Language::from_code("xx"),
            Err(ValidationError::InvalidChoice {
                field: "language",
                value: "xx".to_string()
            })
        );
        let err = LoanStatus::from_code("A").unwrap_err();
        assert_eq!(err.field(), "status");
    }

    #[test]
    fn defaults_match_stored_defaults() {
        assert_eq!(Language::default().code(), "en");
        assert_eq!(LoanStatus::default().code(), "a");
    }
}
