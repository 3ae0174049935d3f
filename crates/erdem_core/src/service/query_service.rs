//! Catalog read use-cases.
//!
//! # Responsibility
//! - List files and active persons in display order.
//! - Search files by name and resolve both directions of participation.
//!
//! # Invariants
//! - Display order is case-insensitive and stable: equal keys keep storage order.
//! - A missing file is reported as [`FileLookup::NotFound`], never as a
//!   partially filled record.
//! - All operations are side-effect free.

use crate::model::file::FileRecord;
use crate::model::participation::Participation;
use crate::model::person::{display_name, Person};
use crate::model::{FileId, PersonId};
use crate::repo::file_repo::{FileRepository, FileSummary, SqliteFileRepository};
use crate::repo::participation_repo::{
    FileParticipants, ParticipationRepository, PersonFileEntry, SqliteParticipationRepository,
};
use crate::repo::person_repo::{PersonFilter, PersonRepository, SqlitePersonRepository};
use crate::repo::RepoResult;
use rusqlite::Connection;
use serde::Serialize;

/// `{id, firstname, lastname, is_deactivated}` projection for person lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonSummary {
    pub id: PersonId,
    pub firstname: String,
    pub lastname: Option<String>,
    pub is_deactivated: bool,
}

impl PersonSummary {
    pub fn display_name(&self) -> String {
        display_name(&self.firstname, self.lastname.as_deref())
    }
}

impl From<Person> for PersonSummary {
    fn from(person: Person) -> Self {
        Self {
            id: person.id,
            firstname: person.firstname,
            lastname: person.lastname,
            is_deactivated: person.is_deactivated,
        }
    }
}

/// Outcome of resolving one file's participants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileLookup {
    Found(FileParticipants),
    NotFound,
}

impl FileLookup {
    pub fn found(self) -> Option<FileParticipants> {
        match self {
            Self::Found(file) => Some(file),
            Self::NotFound => None,
        }
    }
}

/// Read-side facade over the three catalog repositories.
pub struct QueryService<F, P, R> {
    files: F,
    persons: P,
    participation: R,
}

impl<F, P, R> QueryService<F, P, R>
where
    F: FileRepository,
    P: PersonRepository,
    R: ParticipationRepository,
{
    pub fn new(files: F, persons: P, participation: R) -> Self {
        Self {
            files,
            persons,
            participation,
        }
    }

    /// Every file as `{id, filename}`, sorted by filename ignoring case.
    pub fn list_files(&self) -> RepoResult<Vec<FileSummary>> {
        let mut files = self.files.list_files()?;
        sort_files_by_name(&mut files);
        Ok(files)
    }

    /// Every file as a full row, in storage order.
    pub fn list_file_records(&self) -> RepoResult<Vec<FileRecord>> {
        self.files.list_file_records()
    }

    pub fn get_file(&self, id: FileId) -> RepoResult<Option<FileRecord>> {
        self.files.get_file(id)
    }

    /// Non-deactivated persons sorted by display name ignoring case.
    pub fn list_active_persons(&self) -> RepoResult<Vec<PersonSummary>> {
        let mut persons = self
            .persons
            .list_persons(PersonFilter::Active)?
            .into_iter()
            .map(PersonSummary::from)
            .collect::<Vec<_>>();
        sort_persons_by_name(&mut persons);
        Ok(persons)
    }

    /// Persons matching `filter`, in storage order.
    pub fn list_persons(&self, filter: PersonFilter) -> RepoResult<Vec<Person>> {
        self.persons.list_persons(filter)
    }

    pub fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        self.persons.get_person(id)
    }

    /// Files whose name contains `text` literally (ASCII case-insensitive),
    /// sorted like [`Self::list_files`]. Empty text matches every file.
    pub fn search_files(&self, text: &str) -> RepoResult<Vec<FileSummary>> {
        let mut files = self.files.search_files(text)?;
        sort_files_by_name(&mut files);
        Ok(files)
    }

    /// Every participation link, in insertion order.
    pub fn list_participation(&self) -> RepoResult<Vec<Participation>> {
        self.participation.list_participation()
    }

    /// Resolves a file's metadata and active participants.
    pub fn resolve_file_participants(&self, file_id: FileId) -> RepoResult<FileLookup> {
        Ok(match self.participation.file_participants(file_id)? {
            Some(file) => FileLookup::Found(file),
            None => FileLookup::NotFound,
        })
    }

    /// Every file the person took part in. Deactivated persons keep their
    /// history here; an unknown person yields an empty list.
    pub fn resolve_person_files(&self, person_id: PersonId) -> RepoResult<Vec<PersonFileEntry>> {
        self.participation.person_files(person_id)
    }
}

/// Query service wired to SQLite repositories sharing one connection.
pub type SqliteQueryService<'conn> = QueryService<
    SqliteFileRepository<'conn>,
    SqlitePersonRepository<'conn>,
    SqliteParticipationRepository<'conn>,
>;

impl<'conn> SqliteQueryService<'conn> {
    pub fn sqlite(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self::new(
            SqliteFileRepository::try_new(conn)?,
            SqlitePersonRepository::try_new(conn)?,
            SqliteParticipationRepository::try_new(conn)?,
        ))
    }
}

/// Stable, case-insensitive sort by filename.
///
/// Keys are uppercased, so `_` and the other ASCII punctuation between `Z`
/// and `a` sort after letters, as the catalog front end displays them.
pub fn sort_files_by_name(files: &mut [FileSummary]) {
    files.sort_by_cached_key(|file| file.filename.to_uppercase());
}

/// Stable, case-insensitive sort by display name, uppercased like filenames.
pub fn sort_persons_by_name(persons: &mut [PersonSummary]) {
    persons.sort_by_cached_key(|person| person.display_name().to_uppercase());
}

#[cfg(test)]
mod tests {
    use super::{sort_files_by_name, sort_persons_by_name, PersonSummary};
    use crate::repo::file_repo::FileSummary;

    fn file(id: i64, filename: &str) -> FileSummary {
        FileSummary {
            id,
            filename: filename.to_string(),
        }
    }

    fn person(id: i64, firstname: &str, lastname: Option<&str>) -> PersonSummary {
        PersonSummary {
            id,
            firstname: firstname.to_string(),
            lastname: lastname.map(str::to_string),
            is_deactivated: false,
        }
    }

    #[test]
    fn file_sort_ignores_case_and_keeps_ties_in_storage_order() {
        let mut files = vec![
            file(1, "beta.mp4"),
            file(2, "ALPHA.mp4"),
            file(3, "Beta.mp4"),
            file(4, "alpha.mp4"),
        ];
        sort_files_by_name(&mut files);
        let ids = files.iter().map(|f| f.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![2, 4, 1, 3]);
    }

    #[test]
    fn person_sort_uses_full_display_name() {
        let mut persons = vec![
            person(1, "ann", Some("Zed")),
            person(2, "Ann", Some("adams")),
            person(3, "Ann", None),
            person(4, "bob", None),
        ];
        sort_persons_by_name(&mut persons);
        let ids = persons.iter().map(|p| p.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![3, 2, 1, 4]);
    }

    #[test]
    fn underscore_sorts_after_letters() {
        let mut files = vec![file(1, "song_b.mp3"), file(2, "songa.mp3")];
        sort_files_by_name(&mut files);
        assert_eq!(files.iter().map(|f| f.id).collect::<Vec<_>>(), vec![2, 1]);

        let mut persons = vec![person(1, "Ann_Marie", None), person(2, "AnnB", None)];
        sort_persons_by_name(&mut persons);
        assert_eq!(persons.iter().map(|p| p.id).collect::<Vec<_>>(), vec![2, 1]);
    }
}
