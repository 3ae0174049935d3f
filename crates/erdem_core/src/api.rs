//! Request boundary for the catalog.
//!
//! # Responsibility
//! - Accept raw request parameters exactly as a router hands them over.
//! - Reject malformed input before any statement runs.
//! - Run one unit of work per call against the shared [`CatalogStore`] and
//!   return serializable response shapes.
//!
//! # Invariants
//! - Ids are parsed into integers here; SQL never sees raw parameter text.
//! - Only allow-listed tables can be dumped.
//! - Logged events carry metadata only, never search text or review bodies.

use crate::db::CatalogStore;
use crate::model::file::FileRecord;
use crate::model::participation::Participation;
use crate::model::person::Person;
use crate::model::ModelValidationError;
use crate::repo::file_repo::FileSummary;
use crate::repo::participation_repo::{FileParticipants, PersonFileEntry};
use crate::repo::person_repo::PersonFilter;
use crate::repo::{RecordKind, RepoError, RepoResult};
use crate::service::mutation_service::{MutationError, SqliteMutationService};
use crate::service::query_service::{FileLookup, PersonSummary, SqliteQueryService};
use log::{log, Level};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

pub type ApiResult<T> = Result<T, ApiError>;

/// Longest accepted search text. SQLite refuses `LIKE` patterns over 50000
/// bytes and escaping can double the length.
pub const MAX_SEARCH_QUERY_BYTES: usize = 4096;

/// Boundary error with an HTTP-style classification.
#[derive(Debug)]
pub enum ApiError {
    /// Request parameter has the wrong shape.
    MalformedInput {
        param: &'static str,
        value: String,
        reason: &'static str,
    },
    /// Well-formed value rejected by a model constraint.
    Invalid(ModelValidationError),
    NotFound { kind: RecordKind, id: i64 },
    /// Storage could not be reached or returned an error.
    Storage(RepoError),
}

impl ApiError {
    /// Status code an HTTP layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MalformedInput { .. } | Self::Invalid(_) => 400,
            Self::NotFound { .. } => 404,
            Self::Storage(_) => 500,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::MalformedInput { .. } => "malformed_input",
            Self::Invalid(_) => "invalid_value",
            Self::NotFound { .. } => "not_found",
            Self::Storage(_) => "storage_failed",
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedInput {
                param,
                value,
                reason,
            } => write!(f, "malformed `{param}` value `{value}`: {reason}"),
            Self::Invalid(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Storage(err) => write!(f, "storage failure: {err}"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { kind, id } => Self::NotFound { kind, id },
            RepoError::Validation(err) => Self::Invalid(err),
            other => Self::Storage(other),
        }
    }
}

impl From<MutationError> for ApiError {
    fn from(value: MutationError) -> Self {
        match value {
            MutationError::NotFound { kind, id } => Self::NotFound { kind, id },
            MutationError::Validation(err) => Self::Invalid(err),
            MutationError::Repo(err) => Self::Storage(err),
        }
    }
}

/// Acknowledgement returned by writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    const OK: Self = Self { ok: true };
}

/// Request body for review replacement.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReviewUpdate {
    pub review: String,
}

/// Tables that may be dumped whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogTable {
    Files,
    Persons,
    Participation,
}

impl CatalogTable {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "files" => Some(Self::Files),
            "persons" => Some(Self::Persons),
            "participation" => Some(Self::Participation),
            _ => None,
        }
    }
}

/// Full contents of one allow-listed table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TableRows {
    Files(Vec<FileRecord>),
    Persons(Vec<Person>),
    Participation(Vec<Participation>),
}

/// Parses a route id parameter. Only plain decimal digits are accepted.
pub fn parse_id(param: &'static str, raw: &str) -> ApiResult<i64> {
    let malformed = |reason| ApiError::MalformedInput {
        param,
        value: raw.to_string(),
        reason,
    };

    if raw.is_empty() {
        return Err(malformed("expected a non-negative integer, got nothing"));
    }
    if !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(malformed("expected a non-negative integer"));
    }
    raw.parse::<i64>()
        .map_err(|_| malformed("integer is out of range"))
}

/// Parses a boolean route parameter (`0|1|true|false`).
pub fn parse_flag(param: &'static str, raw: &str) -> ApiResult<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(ApiError::MalformedInput {
            param,
            value: raw.to_string(),
            reason: "expected one of 0, 1, true, false",
        }),
    }
}

/// Catalog boundary shared by all request handlers.
#[derive(Clone)]
pub struct CatalogApi {
    store: Arc<CatalogStore>,
}

impl CatalogApi {
    pub fn new(store: Arc<CatalogStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<CatalogStore> {
        &self.store
    }

    /// Lists every file as `{id, filename}` in display order.
    pub fn list_files(&self) -> ApiResult<Vec<FileSummary>> {
        self.read("list_files", "", |service| service.list_files())
    }

    /// Lists non-deactivated persons in display-name order.
    pub fn list_active_persons(&self) -> ApiResult<Vec<PersonSummary>> {
        self.read("list_active_persons", "", |service| {
            service.list_active_persons()
        })
    }

    /// Searches files by literal filename substring.
    ///
    /// Queries longer than [`MAX_SEARCH_QUERY_BYTES`] are malformed input.
    pub fn search_files(&self, query: &str) -> ApiResult<Vec<FileSummary>> {
        let detail = format!("query_len={}", query.len());
        if query.len() > MAX_SEARCH_QUERY_BYTES {
            let rejected = Err(ApiError::MalformedInput {
                param: "query",
                value: query.to_string(),
                reason: "search text is longer than 4096 bytes",
            });
            log_outcome("search_files", "query", &detail, Instant::now(), &rejected);
            return rejected;
        }
        self.read("search_files", &detail, |service| service.search_files(query))
    }

    /// Resolves one file and its active participants.
    pub fn file_participants(&self, raw_file_id: &str) -> ApiResult<FileParticipants> {
        let file_id = parse_id("file_id", raw_file_id)?;
        let lookup = self.read("file_participants", "", |service| {
            service.resolve_file_participants(file_id)
        })?;
        match lookup {
            FileLookup::Found(file) => Ok(file),
            FileLookup::NotFound => Err(ApiError::NotFound {
                kind: RecordKind::File,
                id: file_id,
            }),
        }
    }

    /// Lists every file the person took part in.
    pub fn person_files(&self, raw_person_id: &str) -> ApiResult<Vec<PersonFileEntry>> {
        let person_id = parse_id("person_id", raw_person_id)?;
        self.read("person_files", "", |service| {
            service.resolve_person_files(person_id)
        })
    }

    /// Dumps one allow-listed table.
    pub fn fetch_table(&self, raw_table: &str) -> ApiResult<TableRows> {
        let table = CatalogTable::parse(raw_table).ok_or_else(|| ApiError::MalformedInput {
            param: "table",
            value: raw_table.to_string(),
            reason: "expected one of files, persons, participation",
        })?;
        self.read("fetch_table", "", |service| {
            Ok(match table {
                CatalogTable::Files => TableRows::Files(service.list_file_records()?),
                CatalogTable::Persons => {
                    TableRows::Persons(service.list_persons(PersonFilter::All)?)
                }
                CatalogTable::Participation => {
                    TableRows::Participation(service.list_participation()?)
                }
            })
        })
    }

    /// Sets or clears a person's deactivation flag.
    pub fn set_person_deactivation(&self, raw_person_id: &str, raw_flag: &str) -> ApiResult<Ack> {
        let person_id = parse_id("person_id", raw_person_id)?;
        let deactivated = parse_flag("is_deactivated", raw_flag)?;
        self.write("set_person_deactivation", "", |service| {
            service.set_person_deactivation(person_id, deactivated)
        })
    }

    /// Replaces a file's review with the request body text.
    pub fn replace_file_review(&self, raw_file_id: &str, update: &ReviewUpdate) -> ApiResult<Ack> {
        let file_id = parse_id("file_id", raw_file_id)?;
        let detail = format!("review_len={}", update.review.len());
        self.write("replace_file_review", &detail, |service| {
            service.replace_file_review(file_id, &update.review)
        })
    }

    /// Sets a file's rating.
    pub fn rate_file(&self, raw_file_id: &str, raw_rating: &str) -> ApiResult<Ack> {
        let file_id = parse_id("file_id", raw_file_id)?;
        let rating = parse_id("rating", raw_rating)?;
        self.write("rate_file", "", |service| service.rate_file(file_id, rating))
    }

    fn read<T>(
        &self,
        op: &'static str,
        detail: &str,
        work: impl FnOnce(&SqliteQueryService<'_>) -> RepoResult<T>,
    ) -> ApiResult<T> {
        let started_at = Instant::now();
        let result = self.store.with_connection(|conn| -> ApiResult<T> {
            let service = SqliteQueryService::sqlite(conn)?;
            work(&service).map_err(ApiError::from)
        });
        log_outcome(op, "query", detail, started_at, &result);
        result
    }

    fn write(
        &self,
        op: &'static str,
        detail: &str,
        work: impl FnOnce(&SqliteMutationService<'_>) -> Result<(), MutationError>,
    ) -> ApiResult<Ack> {
        let started_at = Instant::now();
        let result = self.store.with_connection(|conn| -> ApiResult<Ack> {
            let service = SqliteMutationService::sqlite(conn)?;
            work(&service)?;
            Ok(Ack::OK)
        });
        log_outcome(op, "mutation", detail, started_at, &result);
        result
    }
}

fn log_outcome<T>(
    op: &str,
    module: &str,
    detail: &str,
    started_at: Instant,
    result: &ApiResult<T>,
) {
    let duration_ms = started_at.elapsed().as_millis();
    let (level, line) = outcome_line(op, module, detail, duration_ms, result);
    log!(level, "{line}");
}

/// `detail` carries extra metadata fields such as input lengths, never the
/// user text itself.
fn outcome_line<T>(
    op: &str,
    module: &str,
    detail: &str,
    duration_ms: u128,
    result: &ApiResult<T>,
) -> (Level, String) {
    let head = format!("event={op} module={module}");
    let detail = if detail.is_empty() {
        String::new()
    } else {
        format!(" {detail}")
    };
    match result {
        Ok(_) => (
            Level::Info,
            format!("{head} status=ok duration_ms={duration_ms}{detail}"),
        ),
        Err(err @ ApiError::Storage(_)) => (
            Level::Error,
            format!(
                "{head} status=error duration_ms={duration_ms}{detail} error_code={} error={err}",
                err.code()
            ),
        ),
        Err(err) => (
            Level::Warn,
            format!(
                "{head} status=rejected duration_ms={duration_ms}{detail} error_code={}",
                err.code()
            ),
        ),
    }
}
