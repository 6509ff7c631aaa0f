//! SQLite catalog store for Project Gutenberg book metadata.
//!
//! The catalog is batch-loaded (see [`Importer`]) and otherwise only ever
//! read. Reads happen inside a [`CatalogScope`]: a read transaction that is
//! opened per search and released when dropped, whether the search
//! succeeded or not.
//!
//! # Architecture
//! The schema follows the Gutendex tables: books, authors, languages,
//! subjects, bookshelves and formats, with link tables for everything a
//! book can have more than one of. Nothing is traversed lazily. A scope
//! answers "which book ids match X" with one query per criterion, and
//! assembles full [`Book`] records for a page of ids with one batch query
//! per relation.

mod db;
pub mod error;
mod fold;
mod import;
mod models;
mod repo;
mod scope;

pub use crate::db::Database;
pub use crate::import::{CatalogEntry, FormatEntry, ImportSummary, Importer, PersonEntry};
pub use crate::models::{Author, Book, BookId, Bookshelf, Format, Language, Subject};
pub use crate::repo::Repository;
pub use crate::scope::CatalogScope;
