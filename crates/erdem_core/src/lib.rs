//! Catalog of indexed media files, the people who appear in them, and
//! free-text reviews.
//!
//! Storage access lives in [`repo`], the read and write use-cases in
//! [`service`], and [`api`] is the request-facing boundary that validates raw
//! parameters before anything reaches SQLite.

pub mod api;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use api::{
    parse_flag, parse_id, Ack, ApiError, ApiResult, CatalogApi, CatalogTable, ReviewUpdate,
    TableRows, MAX_SEARCH_QUERY_BYTES,
};
pub use db::{open_db, open_db_in_memory, CatalogStore, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::file::{FileRecord, NewFile};
pub use model::participation::Participation;
pub use model::person::{NameRule, NewPerson, Person};
pub use model::{FileId, ModelValidationError, PersonId};
pub use repo::file_repo::{FileRepository, FileSummary, SqliteFileRepository};
pub use repo::participation_repo::{
    FileParticipants, Participant, ParticipationRepository, PersonFileEntry,
    SqliteParticipationRepository,
};
pub use repo::person_repo::{PersonFilter, PersonRepository, SqlitePersonRepository};
pub use repo::{RecordKind, RepoError, RepoResult};
pub use service::mutation_service::{MutationError, MutationService, SqliteMutationService};
pub use service::query_service::{FileLookup, PersonSummary, QueryService, SqliteQueryService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
