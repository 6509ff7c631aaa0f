mod cli;
mod error;

use crate::cli::{Cli, Command, SearchArgs};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use gutendex_catalog::{Database, Importer, Repository};
use gutendex_config::Config;
use gutendex_search::BookSearch;
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

/// `RUST_LOG` wins over the configured level. Logs go to stderr so that
/// stdout only ever carries JSON.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(true).compact().init();
}

fn render<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    rendered.or_raise(|| ErrorKind::Output)
}

async fn connect(config: &Config) -> Result<Database> {
    Database::connect_with_pool_size(&config.database, config.max_connections)
        .await
        .map_err(ErrorKind::catalog)
}

async fn search(config: &Config, args: &SearchArgs) -> Result<String> {
    let criteria = args.criteria().map_err(ErrorKind::search)?;
    let db = connect(config).await?;
    let search = BookSearch::new(Repository::from(&db), args.topic_mode.unwrap_or(config.topic_mode));
    let outcome = search.run(&criteria).await.map_err(ErrorKind::search);
    db.close().await;
    render(&outcome?, args.pretty)
}

async fn import(config: &Config, path: &Path) -> Result<String> {
    let json = tokio::fs::read_to_string(path)
        .await
        .or_raise(|| ErrorKind::Read(path.to_path_buf()))?;
    let entries = Importer::parse(&json).map_err(ErrorKind::catalog)?;
    let db = connect(config).await?;
    let repo = Repository::from(&db);
    let outcome = async {
        let summary = repo.import(&entries).await?;
        let total = repo.count_books().await?;
        Ok::<_, gutendex_catalog::error::Error>((summary, total))
    }
    .await
    .map_err(ErrorKind::catalog);
    db.close().await;
    let (summary, total) = outcome?;
    info!(
        books = summary.books,
        formats = summary.formats,
        total,
        database = %config.database.display(),
        "catalog imported"
    );
    render(&summary, false)
}

async fn execute(config: &Config, command: &Command) -> Result<String> {
    match command {
        Command::Search(args) => search(config, args).await,
        Command::Import { path } => import(config, path).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let outcome = match Config::load(cli.config.as_deref()) {
        Ok(config) => {
            init_tracing(&config.log_level);
            execute(&config, &cli.command).await
        },
        Err(err) => {
            init_tracing("warn");
            Err(ErrorKind::config(err))
        },
    };
    match outcome {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        },
        Err(err) => {
            error!("{err:?}");
            println!("{}", serde_json::json!({ "error": err.to_string() }));
            ExitCode::FAILURE
        },
    }
}
