//! Error type for the `paperlink` command line tool.

use thiserror::Error;

/// Result alias for the CLI.
pub type Result<T> = core::result::Result<T, CliError>;

/// Errors that end a CLI run.
#[derive(Error, Debug)]
pub enum CliError {
  /// A library error that could not be degraded away (configuration, output file).
  #[error(transparent)]
  Paperlink(#[from] paperlink::error::PaperlinkError),

  /// A terminal or file system operation failed.
  #[error(transparent)]
  Io(#[from] std::io::Error),
}
