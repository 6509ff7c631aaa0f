//! Per-search read scope.

use crate::error::{ErrorKind, Result};
use crate::fold::fold;
use crate::models::{
    Author, AuthorLinkRow, Book, BookId, BookRow, Bookshelf, Format, FormatRow, Language, LanguageLinkRow,
    NamedLinkRow, Subject,
};
use exn::ResultExt;
use serde::Serialize;
use sqlx::{Sqlite, Transaction};
use std::collections::{BTreeSet, HashMap};
use tracing::instrument;

type IdSet = BTreeSet<BookId>;

/// A read transaction over the catalog, opened for a single search.
///
/// Every query a search makes runs inside the same transaction, so all of
/// them see one consistent snapshot of the catalog. Nothing is ever written
/// through a scope: dropping it (on success or on any error path) rolls the
/// transaction back and returns the connection to the pool.
#[derive(Debug)]
pub struct CatalogScope {
    tx: Transaction<'static, Sqlite>,
}

/// Encode query parameters as a JSON array for `json_each(?)`, which keeps
/// `IN (...)` lists out of SQLite's bound-variable limit.
fn json_array<T: Serialize>(values: &[T]) -> Result<String> {
    serde_json::to_string(values).or_raise(|| ErrorKind::InvalidData("query parameter list"))
}

/// Substring matching is case-insensitive: fragments are folded here and
/// compared against the `*_folded` columns written at import.
fn fold_fragments(fragments: &[String]) -> Vec<String> {
    fragments.iter().map(|f| fold(f)).collect()
}

impl CatalogScope {
    pub(crate) fn new(tx: Transaction<'static, Sqlite>) -> Self {
        Self { tx }
    }

    async fn ids(&mut self, query: &'static str, param: Option<String>) -> Result<IdSet> {
        let query = sqlx::query_scalar::<_, BookId>(query);
        let query = match param {
            Some(param) => query.bind(param),
            None => query,
        };
        let ids = query.fetch_all(&mut *self.tx).await.or_raise(|| ErrorKind::Database)?;
        Ok(ids.into_iter().collect())
    }

    // =========================================================================
    // Candidate ids
    // =========================================================================

    /// Every book id in the catalog.
    #[instrument(level = "trace", skip(self))]
    pub async fn all_book_ids(&mut self) -> Result<IdSet> {
        self.ids(include_str!("../queries/all_book_ids.sql"), None).await
    }

    /// The subset of `ids` that exist in the catalog.
    #[instrument(level = "trace", skip(self))]
    pub async fn book_ids_in(&mut self, ids: &[BookId]) -> Result<IdSet> {
        let param = json_array(ids)?;
        self.ids(include_str!("../queries/book_ids_by_id.sql"), Some(param)).await
    }

    /// Books whose language code is exactly one of `codes`.
    #[instrument(level = "trace", skip(self))]
    pub async fn book_ids_by_language(&mut self, codes: &[String]) -> Result<IdSet> {
        let param = json_array(codes)?;
        self.ids(include_str!("../queries/book_ids_by_language.sql"), Some(param)).await
    }

    /// Books with at least one format whose mime type is exactly one of `mime_types`.
    #[instrument(level = "trace", skip(self))]
    pub async fn book_ids_by_mime_type(&mut self, mime_types: &[String]) -> Result<IdSet> {
        let param = json_array(mime_types)?;
        self.ids(include_str!("../queries/book_ids_by_mime_type.sql"), Some(param)).await
    }

    /// Books whose author name contains any of `fragments`, ignoring case.
    #[instrument(level = "trace", skip(self))]
    pub async fn book_ids_by_author(&mut self, fragments: &[String]) -> Result<IdSet> {
        let param = json_array(&fold_fragments(fragments))?;
        self.ids(include_str!("../queries/book_ids_by_author.sql"), Some(param)).await
    }

    /// Books whose title contains any of `fragments`, ignoring case.
    /// Untitled books never match.
    #[instrument(level = "trace", skip(self))]
    pub async fn book_ids_by_title(&mut self, fragments: &[String]) -> Result<IdSet> {
        let param = json_array(&fold_fragments(fragments))?;
        self.ids(include_str!("../queries/book_ids_by_title.sql"), Some(param)).await
    }

    /// Books linked to a subject whose name contains any of `fragments`, ignoring case.
    #[instrument(level = "trace", skip(self))]
    pub async fn book_ids_by_subject(&mut self, fragments: &[String]) -> Result<IdSet> {
        let param = json_array(&fold_fragments(fragments))?;
        self.ids(include_str!("../queries/book_ids_by_subject.sql"), Some(param)).await
    }

    /// Books linked to a bookshelf whose name contains any of `fragments`, ignoring case.
    #[instrument(level = "trace", skip(self))]
    pub async fn book_ids_by_bookshelf(&mut self, fragments: &[String]) -> Result<IdSet> {
        let param = json_array(&fold_fragments(fragments))?;
        self.ids(include_str!("../queries/book_ids_by_bookshelf.sql"), Some(param)).await
    }

    // =========================================================================
    // Page materialization
    // =========================================================================

    /// Order `candidates` by popularity (descending, ties by id ascending),
    /// skip `offset` of them and return the next `limit` as full books.
    ///
    /// The ordering and slicing happen in SQL; only the selected books'
    /// relations are fetched, with one batch query per relation.
    #[instrument(level = "trace", skip(self, candidates), fields(candidates = candidates.len()))]
    pub async fn fetch_page(&mut self, candidates: &IdSet, limit: u32, offset: u64) -> Result<Vec<Book>> {
        if candidates.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let ids = candidates.iter().copied().collect::<Vec<_>>();
        let offset = i64::try_from(offset).or_raise(|| ErrorKind::InvalidData("page offset"))?;
        let rows: Vec<BookRow> = sqlx::query_as(include_str!("../queries/page_of_books.sql"))
            .bind(json_array(&ids)?)
            .bind(i64::from(limit))
            .bind(offset)
            .fetch_all(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let mut books = rows.into_iter().map(Book::try_from).collect::<Result<Vec<_>>>()?;
        self.attach_relations(&mut books).await?;
        Ok(books)
    }

    async fn attach_relations(&mut self, books: &mut [Book]) -> Result<()> {
        if books.is_empty() {
            return Ok(());
        }
        let page_ids = json_array(&books.iter().map(|b| b.id).collect::<Vec<_>>())?;

        let authors: Vec<AuthorLinkRow> = sqlx::query_as(include_str!("../queries/authors_for_books.sql"))
            .bind(&page_ids)
            .fetch_all(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let authors = authors
            .into_iter()
            .map(<(BookId, Author)>::try_from)
            .collect::<Result<Vec<_>>>()?;

        let languages: Vec<LanguageLinkRow> = sqlx::query_as(include_str!("../queries/languages_for_books.sql"))
            .bind(&page_ids)
            .fetch_all(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;

        let subjects: Vec<NamedLinkRow> = sqlx::query_as(include_str!("../queries/subjects_for_books.sql"))
            .bind(&page_ids)
            .fetch_all(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;

        let bookshelves: Vec<NamedLinkRow> = sqlx::query_as(include_str!("../queries/bookshelves_for_books.sql"))
            .bind(&page_ids)
            .fetch_all(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;

        let formats: Vec<FormatRow> = sqlx::query_as(include_str!("../queries/formats_for_books.sql"))
            .bind(&page_ids)
            .fetch_all(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;

        let index: HashMap<BookId, usize> = books.iter().enumerate().map(|(i, b)| (b.id, i)).collect();
        // Rows arrive ordered by link id, so "first wins" below picks the
        // lowest link for the single-valued relations.
        for (book_id, author) in authors {
            if let Some(&i) = index.get(&book_id) {
                books[i].author.get_or_insert(author);
            }
        }
        for (book_id, language) in languages.into_iter().map(<(BookId, Language)>::from) {
            if let Some(&i) = index.get(&book_id) {
                books[i].language.get_or_insert(language);
            }
        }
        for (book_id, subject) in subjects.into_iter().map(<(BookId, Subject)>::from) {
            if let Some(&i) = index.get(&book_id) {
                books[i].subjects.push(subject);
            }
        }
        for (book_id, shelf) in bookshelves.into_iter().map(<(BookId, Bookshelf)>::from) {
            if let Some(&i) = index.get(&book_id) {
                books[i].bookshelves.push(shelf);
            }
        }
        for (book_id, format) in formats.into_iter().map(<(BookId, Format)>::from) {
            if let Some(&i) = index.get(&book_id) {
                books[i].formats.push(format);
            }
        }
        Ok(())
    }

    /// Release the scope explicitly. Equivalent to dropping it.
    pub async fn close(self) -> Result<()> {
        self.tx.rollback().await.or_raise(|| ErrorKind::Database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::{CatalogEntry, FormatEntry, PersonEntry};
    use crate::{Database, Repository};

    fn entry(id: i64, downloads: u64, title: &str) -> CatalogEntry {
        CatalogEntry {
            id: Some(id),
            gutenberg_id: id,
            download_count: Some(downloads),
            media_type: "Text".to_string(),
            title: Some(title.to_string()),
            ..CatalogEntry::default()
        }
    }

    async fn seeded() -> (Database, Repository) {
        let db = Database::connect_in_memory().await.unwrap();
        let repo = Repository::from(&db);
        let entries = vec![
            CatalogEntry {
                authors: vec![PersonEntry::new("Austen, Jane", Some(1775), Some(1817))],
                languages: vec!["en".to_string()],
                subjects: vec!["Courtship -- Fiction".to_string(), "England -- Fiction".to_string()],
                bookshelves: vec!["Best Books Ever Listings".to_string()],
                formats: vec![
                    FormatEntry::new("text/plain", "https://example.org/1342.txt"),
                    FormatEntry::new("application/epub+zip", "https://example.org/1342.epub"),
                ],
                ..entry(1342, 48_000, "Pride and Prejudice")
            },
            CatalogEntry {
                authors: vec![PersonEntry::new("Shelley, Mary Wollstonecraft", Some(1797), Some(1851))],
                languages: vec!["en".to_string()],
                subjects: vec!["Monsters -- Fiction".to_string()],
                bookshelves: vec!["Gothic Fiction".to_string(), "Precursors of Science Fiction".to_string()],
                formats: vec![FormatEntry::new("text/html", "https://example.org/84.html")],
                ..entry(84, 51_000, "Frankenstein; Or, The Modern Prometheus")
            },
            CatalogEntry {
                languages: vec!["fr".to_string()],
                subjects: vec!["Revolutions -- France".to_string()],
                formats: vec![FormatEntry::new("text/plain", "https://example.org/17489.txt")],
                ..entry(17489, 900, "Les Misérables, Tome I")
            },
            CatalogEntry {
                title: None,
                ..entry(9999, 900, "")
            },
        ];
        repo.import(&entries).await.unwrap();
        (db, repo)
    }

    fn set(ids: &[BookId]) -> IdSet {
        ids.iter().copied().collect()
    }

    #[tokio::test]
    async fn test_all_book_ids() {
        let (_db, repo) = seeded().await;
        let mut scope = repo.scope().await.unwrap();
        assert_eq!(scope.all_book_ids().await.unwrap(), set(&[84, 1342, 9999, 17489]));
    }

    #[tokio::test]
    async fn test_ids_in_ignores_unknown() {
        let (_db, repo) = seeded().await;
        let mut scope = repo.scope().await.unwrap();
        assert_eq!(scope.book_ids_in(&[84, 5, 1342]).await.unwrap(), set(&[84, 1342]));
        assert!(scope.book_ids_in(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_language_is_exact() {
        let (_db, repo) = seeded().await;
        let mut scope = repo.scope().await.unwrap();
        let codes = vec!["fr".to_string()];
        assert_eq!(scope.book_ids_by_language(&codes).await.unwrap(), set(&[17489]));
        let codes = vec!["EN".to_string(), "e".to_string()];
        assert!(scope.book_ids_by_language(&codes).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mime_type_any_format() {
        let (_db, repo) = seeded().await;
        let mut scope = repo.scope().await.unwrap();
        let mimes = vec!["text/plain".to_string(), "application/x-unknown".to_string()];
        assert_eq!(scope.book_ids_by_mime_type(&mimes).await.unwrap(), set(&[1342, 17489]));
    }

    #[tokio::test]
    async fn test_author_fragment_is_case_insensitive() {
        let (_db, repo) = seeded().await;
        let mut scope = repo.scope().await.unwrap();
        let fragments = vec!["AUSTEN".to_string()];
        assert_eq!(scope.book_ids_by_author(&fragments).await.unwrap(), set(&[1342]));
        let fragments = vec!["austen".to_string(), "shelley".to_string()];
        assert_eq!(scope.book_ids_by_author(&fragments).await.unwrap(), set(&[84, 1342]));
    }

    #[tokio::test]
    async fn test_title_skips_untitled_books() {
        let (_db, repo) = seeded().await;
        let mut scope = repo.scope().await.unwrap();
        let fragments = vec!["".to_string()];
        assert_eq!(scope.book_ids_by_title(&fragments).await.unwrap(), set(&[84, 1342, 17489]));
        let fragments = vec!["prometheus".to_string()];
        assert_eq!(scope.book_ids_by_title(&fragments).await.unwrap(), set(&[84]));
    }

    #[tokio::test]
    async fn test_subject_and_bookshelf_paths() {
        let (_db, repo) = seeded().await;
        let mut scope = repo.scope().await.unwrap();
        let fragments = vec!["fiction".to_string()];
        assert_eq!(scope.book_ids_by_subject(&fragments).await.unwrap(), set(&[84, 1342]));
        assert_eq!(scope.book_ids_by_bookshelf(&fragments).await.unwrap(), set(&[84]));
    }

    #[tokio::test]
    async fn test_fetch_page_orders_and_assembles() {
        let (_db, repo) = seeded().await;
        let mut scope = repo.scope().await.unwrap();
        let all = scope.all_book_ids().await.unwrap();
        let page = scope.fetch_page(&all, 10, 0).await.unwrap();
        let ids = page.iter().map(|b| b.id).collect::<Vec<_>>();
        // 9999 and 17489 tie on popularity; the lower id comes first.
        assert_eq!(ids, vec![84, 1342, 9999, 17489]);

        let austen = &page[1];
        assert_eq!(austen.author.as_ref().map(|a| a.name.as_str()), Some("Austen, Jane"));
        assert_eq!(austen.language.as_ref().map(|l| l.code.as_str()), Some("en"));
        assert_eq!(austen.subjects.len(), 2);
        assert_eq!(austen.bookshelves.len(), 1);
        assert_eq!(
            austen.formats.iter().map(|f| f.mime_type.as_str()).collect::<Vec<_>>(),
            vec!["text/plain", "application/epub+zip"]
        );

        let untitled = &page[2];
        assert!(untitled.title.is_none());
        assert!(untitled.author.is_none());
        assert!(untitled.language.is_none());
    }

    #[tokio::test]
    async fn test_fetch_page_slices() {
        let (_db, repo) = seeded().await;
        let mut scope = repo.scope().await.unwrap();
        let all = scope.all_book_ids().await.unwrap();
        let page = scope.fetch_page(&all, 2, 2).await.unwrap();
        assert_eq!(page.iter().map(|b| b.id).collect::<Vec<_>>(), vec![9999, 17489]);
        assert!(scope.fetch_page(&all, 2, 4).await.unwrap().is_empty());
        assert!(scope.fetch_page(&IdSet::new(), 2, 0).await.unwrap().is_empty());
    }

    async fn seeded_with(entries: &[CatalogEntry]) -> (Database, Repository) {
        let db = Database::connect_in_memory().await.unwrap();
        let repo = Repository::from(&db);
        repo.import(entries).await.unwrap();
        (db, repo)
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_fragments_fold_non_ascii_capitals() {
        let (_db, repo) = seeded_with(&[CatalogEntry {
            authors: vec![PersonEntry::new("Zola, Émile", Some(1840), Some(1902))],
            subjects: strings(&["Ésotérisme"]),
            bookshelves: strings(&["Œuvres Françaises"]),
            ..entry(5, 10, "ÉTUDES")
        }])
        .await;
        let mut scope = repo.scope().await.unwrap();
        assert_eq!(scope.book_ids_by_author(&strings(&["émile"])).await.unwrap(), set(&[5]));
        assert_eq!(scope.book_ids_by_author(&strings(&["ÉMILE"])).await.unwrap(), set(&[5]));
        assert_eq!(scope.book_ids_by_title(&strings(&["études"])).await.unwrap(), set(&[5]));
        assert_eq!(scope.book_ids_by_subject(&strings(&["ésotér"])).await.unwrap(), set(&[5]));
        assert_eq!(scope.book_ids_by_bookshelf(&strings(&["œuvres"])).await.unwrap(), set(&[5]));

        // Stored text keeps its original case.
        let page = scope.fetch_page(&set(&[5]), 1, 0).await.unwrap();
        assert_eq!(page[0].title.as_deref(), Some("ÉTUDES"));
        assert_eq!(page[0].author.as_ref().map(|a| a.name.as_str()), Some("Zola, Émile"));
    }

    #[tokio::test]
    async fn test_only_first_author_and_language_links_match() {
        let (_db, repo) = seeded_with(&[CatalogEntry {
            authors: vec![
                PersonEntry::new("Alpha, Ann", None, None),
                PersonEntry::new("Beta, Bob", None, None),
            ],
            languages: strings(&["en", "fr"]),
            ..entry(7, 10, "Two Hands")
        }])
        .await;
        let mut scope = repo.scope().await.unwrap();
        assert_eq!(scope.book_ids_by_author(&strings(&["alpha"])).await.unwrap(), set(&[7]));
        assert!(scope.book_ids_by_author(&strings(&["beta"])).await.unwrap().is_empty());
        assert_eq!(scope.book_ids_by_language(&strings(&["en"])).await.unwrap(), set(&[7]));
        assert!(scope.book_ids_by_language(&strings(&["fr"])).await.unwrap().is_empty());

        let page = scope.fetch_page(&set(&[7]), 1, 0).await.unwrap();
        assert_eq!(page[0].author.as_ref().map(|a| a.name.as_str()), Some("Alpha, Ann"));
        assert_eq!(page[0].language.as_ref().map(|l| l.code.as_str()), Some("en"));
    }

    #[tokio::test]
    async fn test_scope_release_returns_connection() {
        let (_db, repo) = seeded().await;
        // The in-memory pool has exactly one connection, so a leaked scope
        // would make the second acquisition time out.
        let scope = repo.scope().await.unwrap();
        scope.close().await.unwrap();
        {
            let mut scope = repo.scope().await.unwrap();
            scope.all_book_ids().await.unwrap();
        }
        let mut scope = repo.scope().await.unwrap();
        assert_eq!(scope.all_book_ids().await.unwrap().len(), 4);
    }
}
