use crate::error::{Error, ErrorKind};
use exn::ResultExt;

/// Catalog-internal book identifier (not the Gutenberg id).
pub type BookId = i64;

/// A book with every relation the search output needs, already resolved.
///
/// Built by [`CatalogScope::fetch_page`](crate::CatalogScope::fetch_page)
/// from explicit batch queries; there is no lazy traversal behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: BookId,
    /// Number of downloads, the only ordering key used by search.
    pub popularity: u64,
    pub gutenberg_id: i64,
    pub media_type: String,
    pub title: Option<String>,
    pub author: Option<Author>,
    pub language: Option<Language>,
    pub subjects: Vec<Subject>,
    pub bookshelves: Vec<Bookshelf>,
    /// Enumerated in ascending format id.
    pub formats: Vec<Format>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub birth_year: Option<i16>,
    pub death_year: Option<i16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    pub id: i64,
    /// Unique language code, e.g. `"en"`.
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookshelf {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    pub id: i64,
    pub mime_type: String,
    pub url: String,
}

#[derive(sqlx::FromRow)]
pub(crate) struct BookRow {
    pub(crate) id: i64,
    pub(crate) download_count: i64,
    pub(crate) gutenberg_id: i64,
    pub(crate) media_type: String,
    pub(crate) title: Option<String>,
}
impl TryFrom<BookRow> for Book {
    type Error = Error;
    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            popularity: u64::try_from(row.download_count).or_raise(|| ErrorKind::InvalidData("download count"))?,
            gutenberg_id: row.gutenberg_id,
            media_type: row.media_type,
            title: row.title,
            author: None,
            language: None,
            subjects: Vec::new(),
            bookshelves: Vec::new(),
            formats: Vec::new(),
        })
    }
}
