//! Command-line Error Types
//!
//! Every failure the binary reports carries the message of the layer it
//! came from, so that `{"error": ...}` is meaningful on its own. The full
//! error tree is only logged.

use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("{_0}")]
    Config(#[error(not(source))] String),
    #[display("could not read {}", _0.display())]
    Read(#[error(not(source))] PathBuf),
    #[display("{_0}")]
    Catalog(#[error(not(source))] String),
    #[display("{_0}")]
    Search(#[error(not(source))] String),
    #[display("could not render output")]
    Output,
}

impl ErrorKind {
    #[track_caller]
    pub fn config(err: gutendex_config::error::Error) -> Error {
        let message = err.to_string();
        err.raise(Self::Config(message))
    }

    #[track_caller]
    pub fn catalog(err: gutendex_catalog::error::Error) -> Error {
        let message = err.to_string();
        err.raise(Self::Catalog(message))
    }

    #[track_caller]
    pub fn search(err: gutendex_search::error::Error) -> Error {
        let message = err.to_string();
        err.raise(Self::Search(message))
    }
}
