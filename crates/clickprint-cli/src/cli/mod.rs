//! CLI for the ClickPrint upload client.

mod args;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clickprint_core::config;
use std::path::PathBuf;

use args::{ColorArg, OrientationArg, PageRange, SidesArg};
use commands::{
    run_completions, run_hash, run_man, run_probe, run_submit, run_upload, SubmitArgs,
};

/// Top-level CLI for the ClickPrint upload client.
#[derive(Debug, Parser)]
#[command(name = "clickprint")]
#[command(about = "ClickPrint: upload documents by content hash and request print jobs", long_about = None)]
pub struct Cli {
    /// File holding the bearer token (overrides `token_file` in config; falls back to $CLICKPRINT_TOKEN).
    #[arg(long, global = true, value_name = "PATH")]
    pub token_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Print the SHA-256 content hash of each file.
    Hash {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Ask the backend whether it already stores an object with this hash.
    Probe {
        /// 64-character hex SHA-256.
        hash: String,
    },

    /// Upload the files the backend does not already have.
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Process up to N files at once (default from config).
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,
    },

    /// Upload documents, then submit a print job referencing them by hash.
    Submit {
        /// Print shop identifier.
        #[arg(long)]
        shop: String,
        #[arg(long, value_enum, default_value = "bw")]
        color: ColorArg,
        #[arg(long, value_enum, default_value = "portrait")]
        orientation: OrientationArg,
        #[arg(long, value_enum, default_value = "single")]
        sides: SidesArg,
        /// 1-based inclusive page range; all pages if omitted.
        #[arg(long, value_name = "START-END", value_parser = args::parse_pages)]
        pages: Option<PageRange>,
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
        copies: u32,
        /// Process up to N files at once (default from config).
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Print shell completions to stdout.
    Completions { shell: clap_complete::Shell },

    /// Print the man page (roff) to stdout.
    Man,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        // These need neither config nor backend.
        match &cli.command {
            CliCommand::Hash { paths } => return run_hash(paths).await,
            CliCommand::Completions { shell } => return run_completions(*shell),
            CliCommand::Man => return run_man(),
            _ => {}
        }

        let mut cfg = config::load_or_init()?;
        if let Some(path) = cli.token_file {
            cfg.token_file = Some(path);
        }
        tracing::debug!(base = %cfg.api_base_url, "loaded config");

        match cli.command {
            CliCommand::Probe { hash } => run_probe(&cfg, &hash).await?,
            CliCommand::Upload { paths, jobs } => run_upload(&cfg, &paths, jobs).await?,
            CliCommand::Submit {
                shop,
                color,
                orientation,
                sides,
                pages,
                copies,
                jobs,
                paths,
            } => {
                let args = SubmitArgs {
                    shop,
                    color,
                    orientation,
                    sides,
                    pages,
                    copies,
                    jobs,
                };
                run_submit(&cfg, &paths, args).await?
            }
            CliCommand::Hash { .. } | CliCommand::Completions { .. } | CliCommand::Man => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
