//! File repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Insert, read, list and search `files` rows.
//! - Apply the two file writes: review replacement and rating.
//!
//! # Invariants
//! - Search text is bound as a parameter and matched literally.
//! - List order is storage order (`id ASC`); display sorting is a service concern.

use crate::model::file::{normalize_review, validate_rating, FileRecord, NewFile};
use crate::model::FileId;
use crate::repo::{ensure_connection_ready, RecordKind, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use serde::Serialize;

const FILE_SELECT_SQL: &str = "SELECT
    id,
    filename,
    fullpath,
    rating,
    review
FROM files";

const REQUIRED_COLUMNS: &[&str] = &["id", "filename", "fullpath", "rating", "review"];

/// `{id, filename}` projection used by list and search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub id: FileId,
    pub filename: String,
}

/// Repository interface for `files`.
pub trait FileRepository {
    fn create_file(&self, file: &NewFile) -> RepoResult<FileId>;
    fn get_file(&self, id: FileId) -> RepoResult<Option<FileRecord>>;
    /// Every file as `{id, filename}`, in storage order.
    fn list_files(&self) -> RepoResult<Vec<FileSummary>>;
    /// Every file as a full row, in storage order.
    fn list_file_records(&self) -> RepoResult<Vec<FileRecord>>;
    /// Files whose name contains `text`. Empty text matches every file.
    fn search_files(&self, text: &str) -> RepoResult<Vec<FileSummary>>;
    /// Overwrites the review. `None` clears it.
    fn update_review(&self, id: FileId, review: Option<&str>) -> RepoResult<()>;
    fn update_rating(&self, id: FileId, rating: i64) -> RepoResult<()>;
}

/// SQLite-backed file repository.
pub struct SqliteFileRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFileRepository<'conn> {
    /// Constructs a repository from a bootstrapped connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[("files", REQUIRED_COLUMNS)])?;
        Ok(Self { conn })
    }
}

impl FileRepository for SqliteFileRepository<'_> {
    fn create_file(&self, file: &NewFile) -> RepoResult<FileId> {
        file.validate()?;

        self.conn.execute(
            "INSERT INTO files (filename, fullpath) VALUES (?1, ?2);",
            params![file.filename.as_str(), file.fullpath.as_str()],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_file(&self, id: FileId) -> RepoResult<Option<FileRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{FILE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_file_row(row)?));
        }

        Ok(None)
    }

    fn list_files(&self) -> RepoResult<Vec<FileSummary>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, filename FROM files ORDER BY id ASC;")?;
        let rows = stmt.query_map([], parse_summary_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn list_file_records(&self) -> RepoResult<Vec<FileRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{FILE_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut files = Vec::new();
        while let Some(row) = rows.next()? {
            files.push(parse_file_row(row)?);
        }
        Ok(files)
    }

    fn search_files(&self, text: &str) -> RepoResult<Vec<FileSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, filename
             FROM files
             WHERE filename LIKE '%' || ?1 || '%' ESCAPE '\\'
             ORDER BY id ASC;",
        )?;
        let rows = stmt.query_map([escape_like(text)], parse_summary_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn update_review(&self, id: FileId, review: Option<&str>) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE files SET review = ?2 WHERE id = ?1;",
            params![id, review.and_then(normalize_review)],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: RecordKind::File,
                id,
            });
        }

        Ok(())
    }

    fn update_rating(&self, id: FileId, rating: i64) -> RepoResult<()> {
        validate_rating(rating)?;

        let changed = self.conn.execute(
            "UPDATE files SET rating = ?2 WHERE id = ?1;",
            params![id, rating],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: RecordKind::File,
                id,
            });
        }

        Ok(())
    }
}

fn parse_file_row(row: &Row<'_>) -> RepoResult<FileRecord> {
    let rating: i64 = row.get("rating")?;
    validate_rating(rating).map_err(|_| {
        RepoError::InvalidData(format!("invalid rating `{rating}` in files.rating"))
    })?;

    Ok(FileRecord {
        id: row.get("id")?,
        filename: row.get("filename")?,
        fullpath: row.get("fullpath")?,
        rating,
        review: row.get("review")?,
    })
}

fn parse_summary_row(row: &Row<'_>) -> rusqlite::Result<FileSummary> {
    Ok(FileSummary {
        id: row.get(0)?,
        filename: row.get(1)?,
    })
}

/// Escapes `LIKE` wildcards so user text matches as a literal substring.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
