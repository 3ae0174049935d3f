//! Command-line boundary for the catalog.
//!
//! Runs one catalog operation per invocation and prints the JSON response
//! a browser client would receive.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use erdem_core::{
    default_log_level, init_logging, ApiError, CatalogApi, CatalogStore, ReviewUpdate,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "erdem", version, about = "Query and annotate the media catalog")]
struct Cli {
    /// Catalog database written by the indexer.
    #[arg(long, env = "ERDEM_DB", default_value = "cache.db")]
    db: PathBuf,

    /// trace|debug|info|warn|error
    #[arg(long, env = "ERDEM_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, env = "ERDEM_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every file.
    Files,
    /// List active persons.
    Persons,
    /// Search files by filename substring.
    Search { query: String },
    /// Show a file with its active participants.
    File { file_id: String },
    /// List the files a person took part in.
    PersonFiles { person_id: String },
    /// Set a person's deactivation flag (0|1|true|false).
    Deactivate { person_id: String, flag: String },
    /// Replace a file's review. An empty string clears it.
    Review { file_id: String, review: String },
    /// Rate a file from 0 to 10.
    Rate { file_id: String, rating: String },
    /// Dump one of: files, persons, participation.
    Dump { table: String },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_ref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).context("failed to initialize logging")?;
    }

    let store = CatalogStore::open(&cli.db)
        .with_context(|| format!("failed to open catalog `{}`", cli.db.display()))?;
    let store = Arc::new(store);
    let api = CatalogApi::new(Arc::clone(&store));

    let outcome = run(&api, cli.command);

    drop(api);
    if let Ok(store) = Arc::try_unwrap(store) {
        store.close().context("failed to close catalog")?;
    }
    match outcome {
        Ok(body) => {
            println!("{body}");
            Ok(ExitCode::SUCCESS)
        }
        Err(RunError::Api(err)) => {
            eprintln!("error ({}): {err}", err.status_code());
            Ok(ExitCode::FAILURE)
        }
        Err(RunError::Encode(err)) => {
            eprintln!("error: failed to serialize response: {err}");
            Ok(ExitCode::FAILURE)
        }
    }
}

#[derive(Debug)]
enum RunError {
    Api(ApiError),
    Encode(serde_json::Error),
}

impl From<ApiError> for RunError {
    fn from(value: ApiError) -> Self {
        Self::Api(value)
    }
}

impl From<serde_json::Error> for RunError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Runs one command and returns the pretty-printed JSON body.
fn run(api: &CatalogApi, command: Command) -> Result<String, RunError> {
    match command {
        Command::Files => to_json(&api.list_files()?),
        Command::Persons => to_json(&api.list_active_persons()?),
        Command::Search { query } => to_json(&api.search_files(&query)?),
        Command::File { file_id } => to_json(&api.file_participants(&file_id)?),
        Command::PersonFiles { person_id } => to_json(&api.person_files(&person_id)?),
        Command::Deactivate { person_id, flag } => {
            to_json(&api.set_person_deactivation(&person_id, &flag)?)
        }
        Command::Review { file_id, review } => {
            to_json(&api.replace_file_review(&file_id, &ReviewUpdate { review })?)
        }
        Command::Rate { file_id, rating } => to_json(&api.rate_file(&file_id, &rating)?),
        Command::Dump { table } => to_json(&api.fetch_table(&table)?),
    }
}

fn to_json(value: &impl Serialize) -> Result<String, RunError> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::{run, to_json, Cli, Command, RunError};
    use clap::{CommandFactory, Parser};
    use erdem_core::{CatalogApi, CatalogStore};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn review_accepts_empty_text() {
        let cli = Cli::try_parse_from(["erdem", "--db", "x.db", "review", "3", ""]).unwrap();
        match cli.command {
            Command::Review { file_id, review } => {
                assert_eq!(file_id, "3");
                assert!(review.is_empty());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unencodable_response_is_an_error() {
        let mut by_pair = BTreeMap::new();
        by_pair.insert((1, 2), "tuple keys are not valid JSON object keys");

        assert!(matches!(to_json(&by_pair), Err(RunError::Encode(_))));
    }

    #[test]
    fn run_renders_json_body_and_surfaces_api_errors() {
        let api = CatalogApi::new(Arc::new(CatalogStore::open_in_memory().unwrap()));

        let body = run(&api, Command::Files).unwrap();
        assert_eq!(body, "[]");

        let missing = run(
            &api,
            Command::File {
                file_id: "7".to_string(),
            },
        );
        match missing {
            Err(RunError::Api(err)) => assert_eq!(err.status_code(), 404),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
