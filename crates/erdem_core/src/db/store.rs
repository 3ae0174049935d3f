//! Process-wide catalog storage handle.
//!
//! # Responsibility
//! - Own the single SQLite connection shared by every request handler.
//! - Give each request exclusive use of the connection for one unit of work.
//!
//! # Invariants
//! - Callers never hold the connection across requests.
//! - The handle is opened explicitly and closed explicitly; nothing global.

use super::{open_db, open_db_in_memory, DbError, DbResult};
use log::{error, info};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;

/// Injectable storage handle passed to the query and mutation layers.
///
/// `rusqlite::Connection` is `Send` but not `Sync`, so the handle serializes
/// access to it. Each borrowed unit of work runs single statements whose
/// atomicity is provided by SQLite itself.
pub struct CatalogStore {
    conn: Mutex<Connection>,
}

impl CatalogStore {
    /// Opens (and bootstraps) the catalog database at `path`.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    /// Opens an empty in-memory catalog.
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps an already configured connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Runs one unit of work against the shared connection.
    pub fn with_connection<T, E>(
        &self,
        work: impl FnOnce(&Connection) -> Result<T, E>,
    ) -> Result<T, E> {
        let conn = self.conn.lock();
        work(&conn)
    }

    /// Closes the underlying connection, surfacing any flush error.
    pub fn close(self) -> DbResult<()> {
        let conn = self.conn.into_inner();
        match conn.close() {
            Ok(()) => {
                info!("event=db_close module=db status=ok");
                Ok(())
            }
            Err((_, err)) => {
                error!("event=db_close module=db status=error error={err}");
                Err(DbError::Sqlite(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CatalogStore;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn store_is_shareable_across_threads() {
        assert_send_sync::<CatalogStore>();
    }

    #[test]
    fn with_connection_sees_bootstrapped_schema() {
        let store = CatalogStore::open_in_memory().unwrap();
        let count: i64 = store
            .with_connection(|conn| {
                conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                       AND name IN ('files', 'persons', 'participation');",
                    [],
                    |row| row.get(0),
                )
            })
            .unwrap();
        assert_eq!(count, 3);
        store.close().unwrap();
    }
}
