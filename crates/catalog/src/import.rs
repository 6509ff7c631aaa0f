//! Batch loading of catalog dumps.
//!
//! Search never writes to the catalog; this is the external loader that
//! fills it. A dump is a JSON array of [`CatalogEntry`] objects, one per
//! book, with its relations inlined.

use crate::error::{ErrorKind, Result};
use crate::fold::fold;
use crate::models::BookId;
use exn::ResultExt;
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::instrument;

/// One book and everything linked to it, as found in a catalog dump.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CatalogEntry {
    /// Catalog id. Assigned by the database when absent.
    pub id: Option<BookId>,
    pub gutenberg_id: i64,
    pub download_count: Option<u64>,
    pub media_type: String,
    pub title: Option<String>,
    pub authors: Vec<PersonEntry>,
    pub languages: Vec<String>,
    pub subjects: Vec<String>,
    pub bookshelves: Vec<String>,
    /// Stored in the order given; later entries get higher format ids.
    pub formats: Vec<FormatEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PersonEntry {
    pub name: String,
    #[serde(default)]
    pub birth_year: Option<i16>,
    #[serde(default)]
    pub death_year: Option<i16>,
}
impl PersonEntry {
    pub fn new(name: impl Into<String>, birth_year: Option<i16>, death_year: Option<i16>) -> Self {
        Self {
            name: name.into(),
            birth_year,
            death_year,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FormatEntry {
    pub mime_type: String,
    pub url: String,
}
impl FormatEntry {
    pub fn new(mime_type: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            url: url.into(),
        }
    }
}

/// Counts reported after an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub books: usize,
    pub formats: usize,
}

/// Writes catalog entries in a single transaction: either the whole batch
/// lands or none of it does.
///
/// Authors are reused when name and life years match, subjects when the
/// name matches, languages and bookshelves by their unique code/name.
#[derive(Debug, Clone)]
pub struct Importer {
    pool: SqlitePool,
}

impl Importer {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Parse a JSON catalog dump.
    pub fn parse(json: &str) -> Result<Vec<CatalogEntry>> {
        serde_json::from_str(json).or_raise(|| ErrorKind::InvalidData("catalog dump"))
    }

    #[instrument(skip(self, entries), fields(entries = entries.len()))]
    pub async fn import(&self, entries: &[CatalogEntry]) -> Result<ImportSummary> {
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let mut summary = ImportSummary::default();
        for entry in entries {
            insert_entry(&mut *tx, entry).await?;
            summary.books += 1;
            summary.formats += entry.formats.len();
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        tracing::info!(books = summary.books, formats = summary.formats, "catalog import committed");
        Ok(summary)
    }
}

async fn insert_entry(conn: &mut SqliteConnection, entry: &CatalogEntry) -> Result<()> {
    let download_count = entry
        .download_count
        .map(|c| i64::try_from(c).or_raise(|| ErrorKind::InvalidData("download count")))
        .transpose()?;
    let book_id: BookId = sqlx::query_scalar(include_str!("../queries/insert_book.sql"))
        .bind(entry.id)
        .bind(download_count)
        .bind(entry.gutenberg_id)
        .bind(&entry.media_type)
        .bind(entry.title.as_deref())
        .bind(entry.title.as_deref().map(fold))
        .fetch_one(&mut *conn)
        .await
        .or_raise(|| ErrorKind::Database)?;

    for author in &entry.authors {
        let author_id = find_or_insert_author(conn, author).await?;
        link(conn, include_str!("../queries/link_author.sql"), book_id, author_id).await?;
    }
    for code in &entry.languages {
        let language_id = returning_id(conn, include_str!("../queries/upsert_language.sql"), code).await?;
        link(conn, include_str!("../queries/link_language.sql"), book_id, language_id).await?;
    }
    for name in &entry.subjects {
        let found: Option<i64> = sqlx::query_scalar(include_str!("../queries/find_subject.sql"))
            .bind(name)
            .fetch_optional(&mut *conn)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let subject_id = match found {
            Some(id) => id,
            None => returning_named_id(conn, include_str!("../queries/insert_subject.sql"), name).await?,
        };
        link(conn, include_str!("../queries/link_subject.sql"), book_id, subject_id).await?;
    }
    for name in &entry.bookshelves {
        let shelf_id = returning_named_id(conn, include_str!("../queries/upsert_bookshelf.sql"), name).await?;
        link(conn, include_str!("../queries/link_bookshelf.sql"), book_id, shelf_id).await?;
    }
    for format in &entry.formats {
        sqlx::query(include_str!("../queries/insert_format.sql"))
            .bind(book_id)
            .bind(&format.mime_type)
            .bind(&format.url)
            .execute(&mut *conn)
            .await
            .or_raise(|| ErrorKind::Database)?;
    }
    Ok(())
}

async fn find_or_insert_author(conn: &mut SqliteConnection, author: &PersonEntry) -> Result<i64> {
    let found: Option<i64> = sqlx::query_scalar(include_str!("../queries/find_author.sql"))
        .bind(&author.name)
        .bind(author.birth_year)
        .bind(author.death_year)
        .fetch_optional(&mut *conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    if let Some(id) = found {
        return Ok(id);
    }
    sqlx::query_scalar(include_str!("../queries/insert_author.sql"))
        .bind(&author.name)
        .bind(author.birth_year)
        .bind(author.death_year)
        .bind(fold(&author.name))
        .fetch_one(&mut *conn)
        .await
        .or_raise(|| ErrorKind::Database)
}

async fn returning_id(conn: &mut SqliteConnection, query: &'static str, value: &str) -> Result<i64> {
    sqlx::query_scalar(query)
        .bind(value)
        .fetch_one(&mut *conn)
        .await
        .or_raise(|| ErrorKind::Database)
}

/// Like [`returning_id`], for rows that also store the folded name.
async fn returning_named_id(conn: &mut SqliteConnection, query: &'static str, name: &str) -> Result<i64> {
    sqlx::query_scalar(query)
        .bind(name)
        .bind(fold(name))
        .fetch_one(&mut *conn)
        .await
        .or_raise(|| ErrorKind::Database)
}

async fn link(conn: &mut SqliteConnection, query: &'static str, book_id: BookId, other_id: i64) -> Result<()> {
    sqlx::query(query)
        .bind(book_id)
        .bind(other_id)
        .execute(&mut *conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(())
}
