mod book;
mod relation;

pub use self::book::{Author, Book, BookId, Bookshelf, Format, Language, Subject};
pub(crate) use self::book::BookRow;
pub(crate) use self::relation::{AuthorLinkRow, FormatRow, LanguageLinkRow, NamedLinkRow};
