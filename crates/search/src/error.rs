//! Search Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Only two things can go wrong with a
//! search: the caller asked for a page that doesn't exist, or the catalog
//! couldn't be read. Filter values that match nothing are not errors.

use derive_more::{Display, Error};
use gutendex_catalog::error::Error as CatalogError;

/// A search error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The requested page is not a positive integer, or lies beyond the last
    /// page of results (which includes page 1 of an empty result).
    #[display("{_0}")]
    InvalidPage(#[error(not(source))] PageProblem),
    /// The catalog store could not be reached or queried. Fatal for the
    /// current search.
    #[display("catalog storage unavailable")]
    StorageUnavailable,
}

/// Why a page number was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum PageProblem {
    #[display("page number is not a number: {_0:?}")]
    Malformed(String),
    #[display("page number must be positive")]
    NotPositive,
    #[display("that page contains no results")]
    OutOfRange { requested: u64, total_pages: u64 },
}

impl ErrorKind {
    /// Wrap a catalog error, keeping its `Exn` frame as a child in the error tree.
    #[track_caller]
    pub fn storage(err: CatalogError) -> Error {
        err.raise(ErrorKind::StorageUnavailable)
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }

    pub fn is_invalid_page(&self) -> bool {
        matches!(self, Self::InvalidPage(_))
    }
}
