//! Filter engine: narrows the catalog to the candidate set for a search.
//!
//! Categories combine with AND, values inside a category with OR. Each
//! supplied category costs one query against the scope (topics cost two:
//! one for subjects, one for bookshelves).

use crate::criteria::Criteria;
use crate::error::{ErrorKind, Result};
use derive_more::Display;
use gutendex_catalog::{BookId, CatalogScope};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::str::FromStr;
use tracing::{debug, instrument};

pub type Candidates = BTreeSet<BookId>;

/// How the `topics` category combines with the others.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicMode {
    /// A non-empty topic match replaces the candidates narrowed by every
    /// other category instead of being intersected with them. A topic
    /// search that matches nothing is ignored and the other categories
    /// apply as usual.
    #[default]
    #[display("override")]
    Override,
    /// Topics narrow the candidates like every other category.
    #[display("strict")]
    Strict,
}
impl FromStr for TopicMode {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "override" => Ok(Self::Override),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown topic mode: {other:?} (expected \"override\" or \"strict\")")),
        }
    }
}

/// Intersect `ids` into the running candidate set. `None` stands for
/// "every book", so the first category narrows it to exactly its own ids.
fn narrow(candidates: &mut Option<Candidates>, ids: Candidates) {
    *candidates = Some(match candidates.take() {
        None => ids,
        Some(previous) => previous.intersection(&ids).copied().collect(),
    });
}

/// Integer-looking ids only; anything else can't match a catalog id.
fn parse_ids(values: &[String]) -> Vec<BookId> {
    values.iter().filter_map(|v| v.trim().parse::<BookId>().ok()).collect()
}

/// Produce the deduplicated set of book ids matching every supplied category.
///
/// Finding nothing is not an error; the empty set flows on to pagination.
#[instrument(level = "debug", skip_all, fields(mode = %mode))]
pub async fn filter(scope: &mut CatalogScope, criteria: &Criteria, mode: TopicMode) -> Result<Candidates> {
    let mut narrowed: Option<Candidates> = None;

    if !criteria.book_ids.is_empty() {
        let ids = scope.book_ids_in(&parse_ids(&criteria.book_ids)).await.map_err(ErrorKind::storage)?;
        debug!(matched = ids.len(), "book ids");
        narrow(&mut narrowed, ids);
    }
    if !criteria.languages.is_empty() {
        let ids = scope.book_ids_by_language(&criteria.languages).await.map_err(ErrorKind::storage)?;
        debug!(matched = ids.len(), "languages");
        narrow(&mut narrowed, ids);
    }
    if !criteria.mime_types.is_empty() {
        let ids = scope.book_ids_by_mime_type(&criteria.mime_types).await.map_err(ErrorKind::storage)?;
        debug!(matched = ids.len(), "mime types");
        narrow(&mut narrowed, ids);
    }
    if !criteria.authors.is_empty() {
        let ids = scope.book_ids_by_author(&criteria.authors).await.map_err(ErrorKind::storage)?;
        debug!(matched = ids.len(), "authors");
        narrow(&mut narrowed, ids);
    }
    if !criteria.titles.is_empty() {
        let ids = scope.book_ids_by_title(&criteria.titles).await.map_err(ErrorKind::storage)?;
        debug!(matched = ids.len(), "titles");
        narrow(&mut narrowed, ids);
    }
    if !criteria.topics.is_empty() {
        let mut topics = scope.book_ids_by_subject(&criteria.topics).await.map_err(ErrorKind::storage)?;
        let shelves = scope.book_ids_by_bookshelf(&criteria.topics).await.map_err(ErrorKind::storage)?;
        topics.extend(shelves);
        debug!(matched = topics.len(), "topics");
        match mode {
            TopicMode::Override if !topics.is_empty() => return Ok(topics),
            TopicMode::Override => debug!("no topic matches, falling back to other categories"),
            TopicMode::Strict => narrow(&mut narrowed, topics),
        }
    }

    match narrowed {
        Some(ids) => Ok(ids),
        None => scope.all_book_ids().await.map_err(ErrorKind::storage),
    }
}
