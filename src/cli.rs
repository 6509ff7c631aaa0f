//! Command-line Arguments

use clap::{Args, Parser, Subcommand};
use gutendex_search::error::Result;
use gutendex_search::{Criteria, PageNumber, TopicMode};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "gutendex", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, global = true, env = "GUTENDEX_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search the catalog and print one page of results as JSON
    Search(SearchArgs),
    /// Load a JSON catalog dump into the database
    Import {
        /// JSON array of catalog entries
        path: PathBuf,
    },
}

/// Every list takes a single comma-delimited value, e.g. `--languages en,fr`.
#[derive(Debug, Default, Args)]
pub struct SearchArgs {
    #[arg(long, value_name = "IDS")]
    pub book_ids: Option<String>,
    #[arg(long, value_name = "CODES")]
    pub languages: Option<String>,
    #[arg(long, value_name = "TYPES")]
    pub mime_types: Option<String>,
    /// Case-insensitive fragments of author names
    #[arg(long, value_name = "FRAGMENTS")]
    pub authors: Option<String>,
    /// Case-insensitive fragments of titles
    #[arg(long, value_name = "FRAGMENTS")]
    pub titles: Option<String>,
    /// Case-insensitive fragments of subjects or bookshelves
    #[arg(long, value_name = "FRAGMENTS")]
    pub topics: Option<String>,
    #[arg(long, value_name = "N")]
    pub page: Option<String>,
    /// Overrides the configured topic mode
    #[arg(long, value_name = "MODE")]
    pub topic_mode: Option<TopicMode>,
    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Split a comma-delimited value and trim each part. Absent or empty input
/// means no values at all; empty parts between commas are kept.
pub fn split_values(data: Option<&str>) -> Vec<String> {
    match data {
        Some(data) if !data.is_empty() => data.split(',').map(|v| v.trim().to_string()).collect(),
        _ => Vec::new(),
    }
}

impl SearchArgs {
    /// Only the first of several comma-separated page values counts.
    pub fn criteria(&self) -> Result<Criteria> {
        let page = match split_values(self.page.as_deref()).first() {
            Some(value) => Some(value.parse::<PageNumber>()?),
            None => None,
        };
        Ok(Criteria {
            book_ids: split_values(self.book_ids.as_deref()),
            languages: split_values(self.languages.as_deref()),
            mime_types: split_values(self.mime_types.as_deref()),
            authors: split_values(self.authors.as_deref()),
            titles: split_values(self.titles.as_deref()),
            topics: split_values(self.topics.as_deref()),
            page,
        })
    }
}
