//! CLI for fetching from multi-mirror repositories.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mirrorpool_core::config;
use std::path::{Path, PathBuf};

use commands::{run_checksum, run_fetch, run_inspect_index, run_mirrors, FetchArgs};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "mirrorpool")]
#[command(about = "Fetch repository files with automatic mirror failover", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch one or more files from a configured repository.
    Fetch {
        /// Repository id or name from config.toml.
        repo: String,
        /// Paths relative to the repository address (or absolute URLs under it).
        #[arg(required = true)]
        paths: Vec<String>,
        /// Directory to write fetched files into.
        #[arg(short, long, default_value = ".", value_name = "DIR")]
        output: PathBuf,
        /// Fetch up to N files concurrently (default from config).
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,
        /// Expected SHA-256 of the file (only with a single path).
        #[arg(long, value_name = "HEX")]
        sha256: Option<String>,
        /// Print the failover state as JSON when done.
        #[arg(long)]
        show_state: bool,
    },

    /// List the mirror candidates of a repository.
    Mirrors {
        /// Repository id or name from config.toml.
        repo: String,
    },

    /// Print the repo descriptor from an index-v1.json as a config entry.
    InspectIndex {
        /// Path to index-v1.json.
        path: String,
        /// Id to assign to the repository.
        #[arg(long, default_value = "1")]
        id: i64,
    },

    /// Compute SHA-256 of a file (e.g. after fetching).
    Checksum {
        /// Path to the file.
        path: String,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Fetch {
                repo,
                paths,
                output,
                jobs,
                sha256,
                show_state,
            } => {
                let args = FetchArgs {
                    repo,
                    paths,
                    output,
                    jobs,
                    sha256,
                    show_state,
                };
                run_fetch(&cfg, args).await?
            }
            CliCommand::Mirrors { repo } => run_mirrors(&cfg, &repo)?,
            CliCommand::InspectIndex { path, id } => run_inspect_index(Path::new(&path), id)?,
            CliCommand::Checksum { path } => run_checksum(Path::new(&path))?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
