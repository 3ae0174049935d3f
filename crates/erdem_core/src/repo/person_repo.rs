//! Person repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Persons are never deleted; deactivation flips `is_deactivated`.
//! - Writes reject blank first names before touching SQL.

use crate::model::person::{NameRule, NewPerson, Person};
use crate::model::PersonId;
use crate::repo::{
    bool_to_int, ensure_connection_ready, int_to_bool, RecordKind, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row};

const PERSON_SELECT_SQL: &str = "SELECT
    id,
    firstname,
    lastname,
    extraction_rule,
    is_deactivated
FROM persons";

const REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "firstname",
    "lastname",
    "extraction_rule",
    "is_deactivated",
];

/// Activation filter for person listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PersonFilter {
    #[default]
    Active,
    Deactivated,
    All,
}

/// Repository interface for `persons`.
pub trait PersonRepository {
    fn create_person(&self, person: &NewPerson) -> RepoResult<PersonId>;
    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>>;
    /// Exact name lookup; `lastname = None` only matches persons without one.
    fn find_by_name(
        &self,
        firstname: &str,
        lastname: Option<&str>,
    ) -> RepoResult<Option<Person>>;
    /// Persons matching `filter`, in storage order.
    fn list_persons(&self, filter: PersonFilter) -> RepoResult<Vec<Person>>;
    fn set_deactivated(&self, id: PersonId, deactivated: bool) -> RepoResult<()>;
}

/// SQLite-backed person repository.
pub struct SqlitePersonRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePersonRepository<'conn> {
    /// Constructs a repository from a bootstrapped connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[("persons", REQUIRED_COLUMNS)])?;
        Ok(Self { conn })
    }
}

impl PersonRepository for SqlitePersonRepository<'_> {
    fn create_person(&self, person: &NewPerson) -> RepoResult<PersonId> {
        person.validate()?;

        self.conn.execute(
            "INSERT INTO persons (
                firstname,
                lastname,
                extraction_rule,
                is_deactivated
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                person.firstname.as_str(),
                person.lastname.as_deref(),
                person.extraction_rule.as_db_str(),
                bool_to_int(person.is_deactivated),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PERSON_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_person_row(row)?));
        }

        Ok(None)
    }

    fn find_by_name(
        &self,
        firstname: &str,
        lastname: Option<&str>,
    ) -> RepoResult<Option<Person>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PERSON_SELECT_SQL}
             WHERE firstname = ?1
               AND lastname IS ?2
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query(params![firstname, lastname])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_person_row(row)?));
        }

        Ok(None)
    }

    fn list_persons(&self, filter: PersonFilter) -> RepoResult<Vec<Person>> {
        let sql = match filter {
            PersonFilter::Active => {
                format!("{PERSON_SELECT_SQL} WHERE is_deactivated = 0 ORDER BY id ASC;")
            }
            PersonFilter::Deactivated => {
                format!("{PERSON_SELECT_SQL} WHERE is_deactivated = 1 ORDER BY id ASC;")
            }
            PersonFilter::All => format!("{PERSON_SELECT_SQL} ORDER BY id ASC;"),
        };

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut persons = Vec::new();
        while let Some(row) = rows.next()? {
            persons.push(parse_person_row(row)?);
        }

        Ok(persons)
    }

    fn set_deactivated(&self, id: PersonId, deactivated: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE persons SET is_deactivated = ?2 WHERE id = ?1;",
            params![id, bool_to_int(deactivated)],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: RecordKind::Person,
                id,
            });
        }

        Ok(())
    }
}

fn parse_person_row(row: &Row<'_>) -> RepoResult<Person> {
    let rule_text: String = row.get("extraction_rule")?;
    let extraction_rule = NameRule::parse(&rule_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid extraction rule `{rule_text}` in persons.extraction_rule"
        ))
    })?;

    Ok(Person {
        id: row.get("id")?,
        firstname: row.get("firstname")?,
        lastname: row.get("lastname")?,
        extraction_rule,
        is_deactivated: int_to_bool(row.get("is_deactivated")?, "persons.is_deactivated")?,
    })
}
