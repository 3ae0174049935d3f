//! Catalog write use-cases.
//!
//! # Invariants
//! - Review writes replace the whole text (last write wins, no history).
//! - Deactivation is idempotent and never removes the person row.
//! - Writes against an unknown id report `NotFound` instead of succeeding
//!   silently.

use crate::model::{FileId, ModelValidationError, PersonId};
use crate::repo::file_repo::{FileRepository, SqliteFileRepository};
use crate::repo::person_repo::{PersonRepository, SqlitePersonRepository};
use crate::repo::{RecordKind, RepoError, RepoResult};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for catalog writes.
#[derive(Debug)]
pub enum MutationError {
    /// Target row does not exist.
    NotFound { kind: RecordKind, id: i64 },
    /// Input violates a model constraint.
    Validation(ModelValidationError),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for MutationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MutationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound { .. } => None,
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for MutationError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { kind, id } => Self::NotFound { kind, id },
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Write-side facade over file and person repositories.
pub struct MutationService<F, P> {
    files: F,
    persons: P,
}

impl<F: FileRepository, P: PersonRepository> MutationService<F, P> {
    pub fn new(files: F, persons: P) -> Self {
        Self { files, persons }
    }

    /// Sets the soft-delete flag of one person.
    pub fn set_person_deactivation(
        &self,
        person_id: PersonId,
        deactivated: bool,
    ) -> Result<(), MutationError> {
        self.persons.set_deactivated(person_id, deactivated)?;
        Ok(())
    }

    /// Overwrites a file's review. An empty string clears it.
    pub fn replace_file_review(&self, file_id: FileId, review: &str) -> Result<(), MutationError> {
        self.files.update_review(file_id, Some(review))?;
        Ok(())
    }

    /// Sets a file's rating (`0..=10`).
    pub fn rate_file(&self, file_id: FileId, rating: i64) -> Result<(), MutationError> {
        self.files.update_rating(file_id, rating)?;
        Ok(())
    }
}

/// Mutation service wired to SQLite repositories sharing one connection.
pub type SqliteMutationService<'conn> =
    MutationService<SqliteFileRepository<'conn>, SqlitePersonRepository<'conn>>;

impl<'conn> SqliteMutationService<'conn> {
    pub fn sqlite(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self::new(
            SqliteFileRepository::try_new(conn)?,
            SqlitePersonRepository::try_new(conn)?,
        ))
    }
}
