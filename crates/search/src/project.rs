//! Projector: flattens a catalog book into its output record.

use gutendex_catalog::Book;
use serde::Serialize;
use std::collections::BTreeMap;

/// Display-ready shape of one book in a search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookRecord {
    pub title: Option<String>,
    pub author: Option<String>,
    pub language: Option<String>,
    pub bookshelves: Vec<String>,
    pub subjects: Vec<String>,
    /// Mime type to URL.
    pub download_links: BTreeMap<String, String>,
}

/// Expand one book into a [`BookRecord`]. Pure: the same book always
/// projects to the same record.
///
/// When several formats share a mime type, the one enumerated last (highest
/// format id) wins.
pub fn project(book: &Book) -> BookRecord {
    let mut download_links = BTreeMap::new();
    for format in &book.formats {
        download_links.insert(format.mime_type.clone(), format.url.clone());
    }
    BookRecord {
        title: book.title.clone(),
        author: book.author.as_ref().map(|a| a.name.clone()),
        language: book.language.as_ref().map(|l| l.code.clone()),
        bookshelves: book.bookshelves.iter().map(|s| s.name.clone()).collect(),
        subjects: book.subjects.iter().map(|s| s.name.clone()).collect(),
        download_links,
    }
}
