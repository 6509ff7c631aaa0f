//! Multi-criterion book search over a Gutendex catalog.
//!
//! A search runs three stages against one [`CatalogScope`]:
//!
//! 1. [`filter`] narrows the catalog to the set of candidate ids matching
//!    every supplied criterion category.
//! 2. [`paginate`] orders the candidates by popularity and materializes one
//!    page of [`PAGE_SIZE`] books.
//! 3. [`project`] flattens each book into a [`BookRecord`].
//!
//! [`BookSearch`] ties the stages together and owns the scope lifetime.
//!
//! [`CatalogScope`]: gutendex_catalog::CatalogScope

mod criteria;
mod engine;
pub mod error;
mod filter;
#[cfg(test)]
mod fixtures;
mod paginate;
mod project;

pub use crate::criteria::{Criteria, PageNumber};
pub use crate::engine::{BookSearch, SearchResult};
pub use crate::filter::{Candidates, TopicMode, filter};
pub use crate::paginate::{PAGE_SIZE, Page, page_offset, paginate, total_pages};
pub use crate::project::{BookRecord, project};
