//! SQLite storage: connection opening, catalog schema bootstrap and the
//! shared [`CatalogStore`] handle.
//!
//! Nothing above this module reads catalog rows from a connection that has
//! not passed [`schema::bootstrap_schema`].

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;
mod store;

pub use open::{open_db, open_db_in_memory};
pub use store::CatalogStore;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was stamped by a newer build; its layout is unknown here.
    NewerSchema { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::NewerSchema { found, supported } => write!(
                f,
                "catalog schema version {found} is newer than supported {supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::NewerSchema { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
