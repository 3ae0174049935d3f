//! Catalog schema bootstrap.
//!
//! The indexer creates these tables without version tracking, so the DDL is
//! idempotent and may run over an existing catalog. `PRAGMA user_version`
//! only records that bootstrap ran and guards against newer layouts.

use super::{DbError, DbResult};
use rusqlite::Connection;

/// Schema version written by [`bootstrap_schema`].
pub const CATALOG_SCHEMA_VERSION: u32 = 1;

const CATALOG_DDL: &str = include_str!("catalog.sql");

/// Creates missing catalog tables and stamps the schema version.
///
/// Databases stamped with a newer version are left untouched.
pub fn bootstrap_schema(conn: &Connection) -> DbResult<()> {
    let found = schema_version(conn)?;
    if found > CATALOG_SCHEMA_VERSION {
        return Err(DbError::NewerSchema {
            found,
            supported: CATALOG_SCHEMA_VERSION,
        });
    }
    if found == CATALOG_SCHEMA_VERSION {
        return Ok(());
    }

    conn.execute_batch(CATALOG_DDL)?;
    conn.pragma_update(None, "user_version", CATALOG_SCHEMA_VERSION)?;
    Ok(())
}

/// Reads `PRAGMA user_version`; `0` means the catalog was never bootstrapped.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?;
    Ok(version)
}
