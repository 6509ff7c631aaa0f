//! Paginator: orders candidates by popularity and cuts out one page.

use crate::criteria::PageNumber;
use crate::error::{ErrorKind, PageProblem, Result};
use crate::filter::Candidates;
use gutendex_catalog::{Book, CatalogScope};
use tracing::{debug, instrument};

/// Books per page. Fixed; callers can't change it.
pub const PAGE_SIZE: u32 = 25;

/// One page of books, most popular first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub items: Vec<Book>,
    pub number: u64,
    pub total_pages: u64,
}

/// `ceil(count / PAGE_SIZE)`; zero candidates means zero pages.
pub fn total_pages(count: u64) -> u64 {
    count.div_ceil(u64::from(PAGE_SIZE))
}

/// Offset of the first item on `page`, or an error if the page lies beyond
/// the last one. With no candidates at all even page 1 is out of range.
pub fn page_offset(page: PageNumber, count: u64) -> Result<u64> {
    let total_pages = total_pages(count);
    if page.get() > total_pages {
        exn::bail!(ErrorKind::InvalidPage(PageProblem::OutOfRange {
            requested: page.get(),
            total_pages,
        }));
    }
    Ok((page.get() - 1) * u64::from(PAGE_SIZE))
}

/// Order `candidates` by popularity (descending, ties by id ascending) and
/// materialize the books on `page`.
#[instrument(level = "debug", skip(scope, candidates), fields(candidates = candidates.len(), page = %page))]
pub async fn paginate(scope: &mut CatalogScope, candidates: &Candidates, page: PageNumber) -> Result<Page> {
    let count = candidates.len() as u64;
    let offset = page_offset(page, count)?;
    let items = scope.fetch_page(candidates, PAGE_SIZE, offset).await.map_err(ErrorKind::storage)?;
    debug!(offset, items = items.len(), "page sliced");
    Ok(Page {
        items,
        number: page.get(),
        total_pages: total_pages(count),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use rstest::rstest;

    fn page(n: i64) -> PageNumber {
        PageNumber::try_from(n).unwrap()
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(25, 1)]
    #[case(26, 2)]
    #[case(50, 2)]
    #[case(51, 3)]
    fn test_total_pages(#[case] count: u64, #[case] expected: u64) {
        assert_eq!(total_pages(count), expected);
    }

    #[rstest]
    #[case(1, 26, 0)]
    #[case(2, 26, 25)]
    #[case(3, 51, 50)]
    fn test_page_offset(#[case] n: i64, #[case] count: u64, #[case] expected: u64) {
        assert_eq!(page_offset(page(n), count).unwrap(), expected);
    }

    #[rstest]
    #[case(1, 0, 0)]
    #[case(3, 26, 2)]
    #[case(2, 25, 1)]
    fn test_page_out_of_range(#[case] n: i64, #[case] count: u64, #[case] pages: u64) {
        let err = page_offset(page(n), count).unwrap_err();
        match &*err {
            ErrorKind::InvalidPage(PageProblem::OutOfRange { requested, total_pages }) => {
                assert_eq!(*requested, n as u64);
                assert_eq!(*total_pages, pages);
            },
            other => panic!("unexpected error kind: {other}"),
        }
    }

    #[tokio::test]
    async fn test_twenty_six_candidates() {
        let (_db, repo) = fixtures::shelf_of(26).await;
        let mut scope = repo.scope().await.unwrap();
        let all = scope.all_book_ids().await.unwrap();

        let first = paginate(&mut scope, &all, page(1)).await.unwrap();
        assert_eq!(first.items.len(), 25);
        assert_eq!(first.number, 1);
        assert_eq!(first.total_pages, 2);

        let second = paginate(&mut scope, &all, page(2)).await.unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.total_pages, 2);

        let err = paginate(&mut scope, &all, page(3)).await.unwrap_err();
        assert!(err.is_invalid_page());
    }

    #[tokio::test]
    async fn test_pages_are_ordered_and_disjoint() {
        let (_db, repo) = fixtures::shelf_of(60).await;
        let mut scope = repo.scope().await.unwrap();
        let all = scope.all_book_ids().await.unwrap();
        let mut seen = Vec::new();
        for n in 1..=3 {
            let listing = paginate(&mut scope, &all, page(n)).await.unwrap();
            seen.extend(listing.items.into_iter().map(|b| (b.popularity, b.id)));
        }
        assert_eq!(seen.len(), 60);
        // Non-increasing popularity across the whole listing, ties by ascending id.
        for pair in seen.windows(2) {
            let ((pop_a, id_a), (pop_b, id_b)) = (pair[0], pair[1]);
            assert!(pop_a > pop_b || (pop_a == pop_b && id_a < id_b), "{pair:?} out of order");
        }
    }

    #[tokio::test]
    async fn test_empty_candidates_fail_on_first_page() {
        let (_db, repo) = fixtures::library().await;
        let mut scope = repo.scope().await.unwrap();
        let err = paginate(&mut scope, &Candidates::new(), PageNumber::FIRST).await.unwrap_err();
        assert!(matches!(
            &*err,
            ErrorKind::InvalidPage(PageProblem::OutOfRange { requested: 1, total_pages: 0 })
        ));
    }
}
