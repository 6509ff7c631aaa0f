//! Rows returned by the per-relation batch queries.
//!
//! Every row carries the `book_id` it belongs to so a page of books can be
//! assembled from one query per relation.

use crate::error::{Error, ErrorKind};
use crate::models::{Author, BookId, Bookshelf, Format, Language, Subject};
use exn::ResultExt;

#[derive(sqlx::FromRow)]
pub(crate) struct AuthorLinkRow {
    pub(crate) book_id: BookId,
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) birth_year: Option<i64>,
    pub(crate) death_year: Option<i64>,
}
impl TryFrom<AuthorLinkRow> for (BookId, Author) {
    type Error = Error;
    fn try_from(row: AuthorLinkRow) -> Result<Self, Self::Error> {
        let year = |y: Option<i64>| {
            y.map(|y| i16::try_from(y).or_raise(|| ErrorKind::InvalidData("author year")))
                .transpose()
        };
        let author = Author {
            id: row.id,
            name: row.name,
            birth_year: year(row.birth_year)?,
            death_year: year(row.death_year)?,
        };
        Ok((row.book_id, author))
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct LanguageLinkRow {
    pub(crate) book_id: BookId,
    pub(crate) id: i64,
    pub(crate) code: String,
}
impl From<LanguageLinkRow> for (BookId, Language) {
    fn from(row: LanguageLinkRow) -> Self {
        (row.book_id, Language { id: row.id, code: row.code })
    }
}

/// Subject and bookshelf links share a shape: an id and a name.
#[derive(sqlx::FromRow)]
pub(crate) struct NamedLinkRow {
    pub(crate) book_id: BookId,
    pub(crate) id: i64,
    pub(crate) name: String,
}
impl From<NamedLinkRow> for (BookId, Subject) {
    fn from(row: NamedLinkRow) -> Self {
        (row.book_id, Subject { id: row.id, name: row.name })
    }
}
impl From<NamedLinkRow> for (BookId, Bookshelf) {
    fn from(row: NamedLinkRow) -> Self {
        (row.book_id, Bookshelf { id: row.id, name: row.name })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct FormatRow {
    pub(crate) book_id: BookId,
    pub(crate) id: i64,
    pub(crate) mime_type: String,
    pub(crate) url: String,
}
impl From<FormatRow> for (BookId, Format) {
    fn from(row: FormatRow) -> Self {
        let format = Format {
            id: row.id,
            mime_type: row.mime_type,
            url: row.url,
        };
        (row.book_id, format)
    }
}
