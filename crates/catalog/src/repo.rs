//! Entry point for reading (and batch-loading) the catalog.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::import::{CatalogEntry, ImportSummary, Importer};
use crate::scope::CatalogScope;
use exn::ResultExt;
use sqlx::SqlitePool;
use tracing::instrument;

/// Repository over the catalog tables.
///
/// The repository itself holds nothing but a pool handle, so it is cheap to
/// clone and share between concurrent searches. Each search asks for its own
/// [`CatalogScope`].
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl Repository {
    /// Open a read scope for one search.
    ///
    /// Fails fast with [`ErrorKind::Database`] if no connection can be
    /// obtained (pool closed, file unreadable, acquire timeout).
    #[instrument(level = "trace", skip(self))]
    pub async fn scope(&self) -> Result<CatalogScope> {
        let tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        Ok(CatalogScope::new(tx))
    }

    /// Total number of books in the catalog.
    pub async fn count_books(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(include_str!("../queries/count_books.sql"))
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        u64::try_from(count).or_raise(|| ErrorKind::InvalidData("book count"))
    }

    /// Batch-load catalog entries. See [`Importer`].
    pub async fn import(&self, entries: &[CatalogEntry]) -> Result<ImportSummary> {
        Importer::new(self.pool.clone()).import(entries).await
    }
}
