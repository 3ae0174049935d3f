//! Participation repository: the many-to-many link between files and persons.
//!
//! # Responsibility
//! - Record participation links.
//! - Resolve a file's active participants and a person's files, each with
//!   one statement.
//!
//! # Invariants
//! - A file with no links (or only deactivated participants) still resolves,
//!   with an empty participant list.
//! - Person-to-files resolution ignores activation state.
//! - Result order follows link insertion order.

use crate::model::participation::Participation;
use crate::model::{FileId, PersonId};
use crate::repo::{bool_to_int, ensure_connection_ready, int_to_bool, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use serde::Serialize;

const REQUIRED_TABLES: &[(&str, &[&str])] = &[
    ("participation", &["file_id", "person_id", "is_certain"]),
    ("files", &["id", "filename", "fullpath", "review"]),
    ("persons", &["id", "firstname", "lastname", "is_deactivated"]),
];

/// Active participant of one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    pub id: PersonId,
    pub firstname: String,
    pub lastname: Option<String>,
}

/// A file together with its active participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileParticipants {
    pub filename: String,
    pub fullpath: String,
    pub review: Option<String>,
    pub participants: Vec<Participant>,
}

/// One file a person took part in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonFileEntry {
    /// File id.
    pub id: FileId,
    pub filename: String,
    pub person_id: PersonId,
    pub firstname: String,
    pub lastname: Option<String>,
}

/// Repository interface for `participation`.
pub trait ParticipationRepository {
    /// Links a person to a file. Re-linking updates `is_certain`.
    fn add_participation(&self, link: &Participation) -> RepoResult<()>;
    /// Every link, in insertion order.
    fn list_participation(&self) -> RepoResult<Vec<Participation>>;
    /// `None` when the file does not exist.
    fn file_participants(&self, file_id: FileId) -> RepoResult<Option<FileParticipants>>;
    /// Every file the person participated in, regardless of activation.
    fn person_files(&self, person_id: PersonId) -> RepoResult<Vec<PersonFileEntry>>;
}

/// SQLite-backed participation repository.
pub struct SqliteParticipationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteParticipationRepository<'conn> {
    /// Constructs a repository from a bootstrapped connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }
}

impl ParticipationRepository for SqliteParticipationRepository<'_> {
    fn add_participation(&self, link: &Participation) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO participation (person_id, file_id, is_certain)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (person_id, file_id)
             DO UPDATE SET is_certain = excluded.is_certain;",
            params![link.person_id, link.file_id, bool_to_int(link.is_certain)],
        )?;
        Ok(())
    }

    fn list_participation(&self) -> RepoResult<Vec<Participation>> {
        let mut stmt = self.conn.prepare(
            "SELECT file_id, person_id, is_certain
             FROM participation
             ORDER BY rowid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut links = Vec::new();
        while let Some(row) = rows.next()? {
            links.push(Participation {
                file_id: row.get("file_id")?,
                person_id: row.get("person_id")?,
                is_certain: int_to_bool(row.get("is_certain")?, "participation.is_certain")?,
            });
        }
        Ok(links)
    }

    fn file_participants(&self, file_id: FileId) -> RepoResult<Option<FileParticipants>> {
        // The activation filter sits in the join condition so a file whose
        // participants are all deactivated still yields its own row.
        let mut stmt = self.conn.prepare(
            "SELECT
                f.filename AS filename,
                f.fullpath AS fullpath,
                f.review AS review,
                p.id AS person_id,
                p.firstname AS firstname,
                p.lastname AS lastname
             FROM files AS f
             LEFT JOIN participation AS pa ON pa.file_id = f.id
             LEFT JOIN persons AS p
                ON p.id = pa.person_id
               AND p.is_deactivated = 0
             WHERE f.id = ?1
             ORDER BY pa.rowid ASC;",
        )?;

        let mut rows = stmt.query([file_id])?;
        let Some(first) = rows.next()? else {
            return Ok(None);
        };

        let mut resolved = FileParticipants {
            filename: first.get("filename")?,
            fullpath: first.get("fullpath")?,
            review: first.get("review")?,
            participants: Vec::new(),
        };
        push_participant(first, &mut resolved.participants)?;
        while let Some(row) = rows.next()? {
            push_participant(row, &mut resolved.participants)?;
        }

        Ok(Some(resolved))
    }

    fn person_files(&self, person_id: PersonId) -> RepoResult<Vec<PersonFileEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                f.id AS id,
                f.filename AS filename,
                p.id AS person_id,
                p.firstname AS firstname,
                p.lastname AS lastname
             FROM participation AS pa
             INNER JOIN files AS f ON f.id = pa.file_id
             INNER JOIN persons AS p ON p.id = pa.person_id
             WHERE pa.person_id = ?1
             ORDER BY pa.rowid ASC;",
        )?;
        let rows = stmt.query_map([person_id], |row| {
            Ok(PersonFileEntry {
                id: row.get("id")?,
                filename: row.get("filename")?,
                person_id: row.get("person_id")?,
                firstname: row.get("firstname")?,
                lastname: row.get("lastname")?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

// Null person columns mean "no active participant on this row".
fn push_participant(row: &Row<'_>, participants: &mut Vec<Participant>) -> RepoResult<()> {
    let Some(id) = row.get::<_, Option<PersonId>>("person_id")? else {
        return Ok(());
    };
    let firstname = row
        .get::<_, Option<String>>("firstname")?
        .ok_or_else(|| RepoError::InvalidData(format!("person {id} has null firstname")))?;

    participants.push(Participant {
        id,
        firstname,
        lastname: row.get("lastname")?,
    });
    Ok(())
}
