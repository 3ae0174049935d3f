//! Catalog domain model.
//!
//! # Responsibility
//! - Define the three persisted entities: files, persons, participation.
//! - Hold write-side validation shared by repositories.
//!
//! # Invariants
//! - Ids are assigned by storage and never reused.
//! - Persons are soft-deleted via `is_deactivated`, never removed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod file;
pub mod participation;
pub mod person;

/// Storage-assigned identifier of a cataloged file.
pub type FileId = i64;

/// Storage-assigned identifier of a person.
pub type PersonId = i64;

/// Write-side validation failure for catalog records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// `filename` is empty after trim.
    BlankFilename,
    /// `firstname` is empty after trim.
    BlankFirstname,
    /// `rating` is outside `0..=10`.
    RatingOutOfRange(i64),
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankFilename => write!(f, "filename must not be blank"),
            Self::BlankFirstname => write!(f, "firstname must not be blank"),
            Self::RatingOutOfRange(value) => {
                write!(f, "rating {value} is outside the allowed range 0..=10")
            }
        }
    }
}

impl Error for ModelValidationError {}
