//! Catalog participant.
//!
//! # Invariants
//! - `firstname` is never blank.
//! - `is_deactivated` is the soft-delete marker; rows are never removed.

use super::{ModelValidationError, PersonId};
use serde::{Deserialize, Serialize};

/// How the indexer derived a person's name from a filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameRule {
    /// Both name parts matched known name lists.
    AlmostCertain,
    /// Firstname matched only as a prefix.
    TruncatedFirstname,
    /// Lastname was found before the firstname.
    LastnameBackward,
    /// Entered or corrected by hand.
    ManualInput,
}

impl NameRule {
    pub fn as_db_str(self) -> &'static str {
        match self {
            Self::AlmostCertain => "almost-certain",
            Self::TruncatedFirstname => "truncated-firstname",
            Self::LastnameBackward => "lastname-backward",
            Self::ManualInput => "manual-input",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "almost-certain" => Some(Self::AlmostCertain),
            "truncated-firstname" => Some(Self::TruncatedFirstname),
            "lastname-backward" => Some(Self::LastnameBackward),
            "manual-input" => Some(Self::ManualInput),
            _ => None,
        }
    }
}

/// Full `persons` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub firstname: String,
    pub lastname: Option<String>,
    pub extraction_rule: NameRule,
    pub is_deactivated: bool,
}

impl Person {
    /// Name shown to users: `firstname`, followed by `lastname` when present.
    pub fn display_name(&self) -> String {
        display_name(&self.firstname, self.lastname.as_deref())
    }

    pub fn is_active(&self) -> bool {
        !self.is_deactivated
    }
}

/// Insert payload for one person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPerson {
    pub firstname: String,
    pub lastname: Option<String>,
    pub extraction_rule: NameRule,
    pub is_deactivated: bool,
}

impl NewPerson {
    /// Creates an active, hand-entered person.
    pub fn new(firstname: impl Into<String>, lastname: Option<&str>) -> Self {
        Self {
            firstname: firstname.into(),
            lastname: lastname.map(str::to_string),
            extraction_rule: NameRule::ManualInput,
            is_deactivated: false,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.firstname.trim().is_empty() {
            return Err(ModelValidationError::BlankFirstname);
        }
        Ok(())
    }
}

pub fn display_name(firstname: &str, lastname: Option<&str>) -> String {
    match lastname {
        Some(lastname) => format!("{firstname} {lastname}"),
        None => firstname.to_string(),
    }
}
