//! Cataloged media file.

use super::{FileId, ModelValidationError};
use serde::{Deserialize, Serialize};

/// Lowest accepted rating.
pub const RATING_MIN: i64 = 0;
/// Highest accepted rating.
pub const RATING_MAX: i64 = 10;

/// Full `files` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: FileId,
    /// Display name; not unique across the catalog.
    pub filename: String,
    /// Location on the indexed filesystem. Informational only.
    pub fullpath: String,
    pub rating: i64,
    /// Free-text annotation. `None` until a non-empty review is written.
    pub review: Option<String>,
}

/// Insert payload for one indexed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFile {
    pub filename: String,
    pub fullpath: String,
}

impl NewFile {
    pub fn new(filename: impl Into<String>, fullpath: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            fullpath: fullpath.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.filename.trim().is_empty() {
            return Err(ModelValidationError::BlankFilename);
        }
        Ok(())
    }
}

/// Checks a rating against the column constraint before it reaches SQL.
pub fn validate_rating(rating: i64) -> Result<(), ModelValidationError> {
    if (RATING_MIN..=RATING_MAX).contains(&rating) {
        Ok(())
    } else {
        Err(ModelValidationError::RatingOutOfRange(rating))
    }
}

/// Empty reviews are stored as absent.
pub fn normalize_review(review: &str) -> Option<&str> {
    if review.is_empty() {
        None
    } else {
        Some(review)
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_review, validate_rating, NewFile};
    use crate::model::ModelValidationError;

    #[test]
    fn blank_filename_is_rejected() {
        let file = NewFile::new("   ", "/media/blank");
        assert_eq!(file.validate(), Err(ModelValidationError::BlankFilename));
    }

    #[test]
    fn rating_bounds_are_inclusive() {
        assert!(validate_rating(0).is_ok());
        assert!(validate_rating(10).is_ok());
        assert_eq!(
            validate_rating(11),
            Err(ModelValidationError::RatingOutOfRange(11))
        );
        assert!(validate_rating(-1).is_err());
    }

    #[test]
    fn empty_review_normalizes_to_none_but_whitespace_is_kept() {
        assert_eq!(normalize_review(""), None);
        assert_eq!(normalize_review(" "), Some(" "));
    }
}
