//! Command line interface for collecting recent arXiv papers with author affiliations.
//!
//! Searches arXiv for the most recently submitted papers matching a keyword, resolves each
//! author's affiliations from the paper's first page, and writes everything to a single JSON file
//! named after the keyword.
//!
//! # Usage
//!
//! ```bash
//! # Ten newest papers about diffusion models into ./out/diffusion_models.json
//! paperlink -k "diffusion models" -s ./out
//!
//! # More papers, four at a time, with debug logging
//! paperlink -k "graph neural networks" -s ./out -m 40 --concurrency 4 -vvv
//! ```
//!
//! The model credential is read from `DASHSCOPE_API_KEY` (a `.env` file in the working directory
//! is honoured). Other settings can be given in a TOML file via `--config`, or in
//! `paperlink/config.toml` under the platform config directory.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{path::PathBuf, process::ExitCode};

use clap::{builder::ArgAction, Parser};
use console::style;
use paperlink::{
  config::{Config, Settings},
  output::save_results,
  pipeline::Pipeline,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub mod error;

use crate::error::*;

/// Prefix for information messages
static INFO_PREFIX: &str = "ℹ ";
/// Prefix for success messages
static SUCCESS_PREFIX: &str = "✓ ";
/// Prefix for warning messages
static WARNING_PREFIX: &str = "⚠️ ";
/// Prefix for error messages
static ERROR_PREFIX: &str = "✗ ";

/// Command line interface configuration and argument parsing
#[derive(Parser, Debug)]
#[command(author, version, about = "Collect recent arXiv papers with author affiliations")]
pub struct Cli {
  /// Search keyword, matched against all fields of arXiv entries
  #[arg(short, long)]
  keyword: String,

  /// Directory the JSON result is written to (created if missing)
  #[arg(short = 's', long = "save_dir", visible_alias = "save-dir")]
  save_dir: PathBuf,

  /// Maximum number of papers to fetch
  #[arg(short, long, default_value_t = 10)]
  max: usize,

  /// Settings file (TOML). Defaults to the per-user config file if present.
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Model identifier, overriding the settings file
  #[arg(long)]
  model: Option<String>,

  /// Chat completions endpoint, overriding the settings file
  #[arg(long)]
  endpoint: Option<String>,

  /// Number of papers processed at the same time, overriding the settings file
  #[arg(long)]
  concurrency: Option<usize>,

  /// Verbose mode (-v, -vv, -vvv) for different levels of logging detail
  #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase logging verbosity"
    )]
  verbose: u8,
}

impl Cli {
  /// Loads settings and applies the command line overrides on top.
  fn settings(&self) -> paperlink::error::Result<Settings> {
    let mut settings = Settings::load(self.config.as_deref())?;
    if let Some(model) = &self.model {
      settings.model.name = model.clone();
    }
    if let Some(endpoint) = &self.endpoint {
      settings.model.endpoint = endpoint.clone();
    }
    if let Some(concurrency) = self.concurrency {
      settings.concurrency = concurrency;
    }
    Ok(settings)
  }
}

/// Configures the logging system based on the verbosity level
///
/// The verbosity levels are:
/// - 0: error (default)
/// - 1: warn
/// - 2: info
/// - 3: debug
/// - 4+: trace
fn setup_logging(verbosity: u8) {
  let filter = match verbosity {
    0 => "error",
    1 => "warn",
    2 => "info",
    3 => "debug",
    _ => "trace",
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_file(true)
    .with_line_number(true)
    .with_target(true)
    .init();
}

/// Entry point for the paperlink CLI
///
/// Fatal errors are printed once, styled, and end the process with a failure status.
#[tokio::main]
async fn main() -> ExitCode {
  dotenv::dotenv().ok();
  let cli = Cli::parse();
  setup_logging(cli.verbose);
  debug!("{cli:?}");

  match run(&cli).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("{} {}", style(ERROR_PREFIX).red(), style(&e).red());
      ExitCode::FAILURE
    },
  }
}

/// Searches, resolves, and saves the papers for `cli.keyword`.
///
/// A missing credential, an unreadable settings file, or an unwritable output directory end the
/// run with an error. A failed feed query is reported and produces an empty result file.
async fn run(cli: &Cli) -> Result<()> {
  let config = Config::from_env(cli.settings()?)?;
  let pipeline = Pipeline::from_config(&config)?;

  println!(
    "{} Searching arXiv for the {} newest papers on {}",
    style(INFO_PREFIX).cyan(),
    cli.max,
    style(&cli.keyword).yellow()
  );

  let papers = match pipeline.run(&cli.keyword, cli.max).await {
    Ok(papers) => papers,
    Err(e) => {
      eprintln!(
        "{} Feed query failed, please check your query parameters: {}",
        style(WARNING_PREFIX).yellow(),
        style(&e).red()
      );
      Vec::new()
    },
  };

  let path = save_results(&cli.save_dir, &cli.keyword, &papers)?;
  println!(
    "{} Saved {} {} to: {}",
    style(SUCCESS_PREFIX).green(),
    papers.len(),
    if papers.len() == 1 { "paper" } else { "papers" },
    style(path.display()).yellow()
  );
  Ok(())
}
