//! The search pipeline: filter, paginate, project.

use crate::criteria::Criteria;
use crate::error::{ErrorKind, Result};
use crate::filter::{TopicMode, filter};
use crate::paginate::paginate;
use crate::project::{BookRecord, project};
use gutendex_catalog::Repository;
use serde::Serialize;
use tracing::{debug, instrument};

/// A successful search: one page of books plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    /// Candidates before pagination.
    pub count: u64,
    pub page: u64,
    pub total_page: u64,
    pub books: Vec<BookRecord>,
}

/// Book search over a catalog.
///
/// Holds no per-search state. Every call to [`run`](Self::run) opens its own
/// read scope and releases it before returning, so one `BookSearch` can be
/// cloned and used from concurrent tasks.
#[derive(Debug, Clone)]
pub struct BookSearch {
    repo: Repository,
    topic_mode: TopicMode,
}

impl BookSearch {
    pub fn new(repo: Repository, topic_mode: TopicMode) -> Self {
        Self { repo, topic_mode }
    }

    #[instrument(
        skip_all,
        fields(
            page = %criteria.page.unwrap_or_default(),
            book_ids = criteria.book_ids.len(),
            languages = criteria.languages.len(),
            mime_types = criteria.mime_types.len(),
            authors = criteria.authors.len(),
            titles = criteria.titles.len(),
            topics = criteria.topics.len(),
        )
    )]
    pub async fn run(&self, criteria: &Criteria) -> Result<SearchResult> {
        // Dropping the scope on any early return releases the transaction.
        let mut scope = self.repo.scope().await.map_err(ErrorKind::storage)?;
        let candidates = filter(&mut scope, criteria, self.topic_mode).await?;
        debug!(candidates = candidates.len(), "filtered");
        let page = paginate(&mut scope, &candidates, criteria.page.unwrap_or_default()).await?;
        drop(scope);
        Ok(SearchResult {
            count: candidates.len() as u64,
            page: page.number,
            total_page: page.total_pages,
            books: page.items.iter().map(project).collect(),
        })
    }
}
