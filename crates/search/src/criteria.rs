//! Search criteria as handed over by a caller.

use crate::error::{Error, ErrorKind, PageProblem};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::num::NonZeroU64;
use std::str::FromStr;

/// The seven independent filter inputs of a search.
///
/// An empty list means "no restriction" for that category. Values are taken
/// as-is: splitting comma-delimited input and trimming whitespace is done by
/// the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    /// Catalog ids, matched exactly. Values that aren't integers match nothing.
    pub book_ids: Vec<String>,
    /// Language codes, matched exactly.
    pub languages: Vec<String>,
    /// Mime types, matched exactly against any of a book's formats.
    pub mime_types: Vec<String>,
    /// Case-insensitive fragments of the author's name.
    pub authors: Vec<String>,
    /// Case-insensitive fragments of the title.
    pub titles: Vec<String>,
    /// Case-insensitive fragments of a subject or bookshelf name.
    pub topics: Vec<String>,
    /// Defaults to the first page.
    pub page: Option<PageNumber>,
}

fn strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Vec<String> {
    values.into_iter().map(Into::into).collect()
}

impl Criteria {
    pub fn with_book_ids<S: Into<String>>(mut self, ids: impl IntoIterator<Item = S>) -> Self {
        self.book_ids = strings(ids);
        self
    }
    pub fn with_languages<S: Into<String>>(mut self, codes: impl IntoIterator<Item = S>) -> Self {
        self.languages = strings(codes);
        self
    }
    pub fn with_mime_types<S: Into<String>>(mut self, mime_types: impl IntoIterator<Item = S>) -> Self {
        self.mime_types = strings(mime_types);
        self
    }
    pub fn with_authors<S: Into<String>>(mut self, fragments: impl IntoIterator<Item = S>) -> Self {
        self.authors = strings(fragments);
        self
    }
    pub fn with_titles<S: Into<String>>(mut self, fragments: impl IntoIterator<Item = S>) -> Self {
        self.titles = strings(fragments);
        self
    }
    pub fn with_topics<S: Into<String>>(mut self, fragments: impl IntoIterator<Item = S>) -> Self {
        self.topics = strings(fragments);
        self
    }
    pub fn with_page(mut self, page: PageNumber) -> Self {
        self.page = Some(page);
        self
    }
}

/// A 1-based page number. Can only hold positive values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageNumber(NonZeroU64);

impl PageNumber {
    pub const FIRST: Self = Self(NonZeroU64::MIN);

    pub fn get(self) -> u64 {
        self.0.get()
    }
}
impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}
impl TryFrom<i64> for PageNumber {
    type Error = Error;
    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u64::try_from(value)
            .ok()
            .and_then(NonZeroU64::new)
            .map(Self)
            .ok_or_else(|| Error::new(ErrorKind::InvalidPage(PageProblem::NotPositive)))
    }
}
impl FromStr for PageNumber {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.parse::<i64>() {
            Ok(n) => Self::try_from(n),
            Err(_) => exn::bail!(ErrorKind::InvalidPage(PageProblem::Malformed(trimmed.to_string()))),
        }
    }
}
impl Display for PageNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}
