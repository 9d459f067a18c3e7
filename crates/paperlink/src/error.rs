//! Error types for the paperlink library.
//!
//! Errors fall into two tiers. Configuration problems such as a missing API credential are fatal and
//! reach the caller. Everything that can go wrong while handling a single paper (a broken PDF, a
//! timed out model call, a malformed answer) is still represented here, but the [`pdf`](crate::pdf)
//! and [`affiliation`](crate::affiliation) modules catch those at their boundary and degrade instead
//! of returning them.
//!
//! # Examples
//!
//! ```
//! use paperlink::{
//!   config::{Config, Settings},
//!   error::PaperlinkError,
//! };
//!
//! let mut settings = Settings::default();
//! settings.model.api_key_env = "PAPERLINK_DOC_EXAMPLE_UNSET".to_string();
//!
//! match Config::from_env(settings) {
//!   Err(PaperlinkError::MissingCredential(var)) => println!("set {var} first"),
//!   Err(e) => println!("Other error: {e}"),
//!   Ok(_) => println!("Ready"),
//! }
//! ```

use thiserror::Error;

/// Error type alias used for the [`paperlink`](crate) crate.
pub type Result<T> = core::result::Result<T, PaperlinkError>;

/// Errors that can occur while collecting papers and resolving affiliations.
#[derive(Error, Debug)]
pub enum PaperlinkError {
  /// A network request failed.
  ///
  /// This covers unreachable hosts, TLS failures, timeouts, and non-success statuses surfaced
  /// through `error_for_status`.
  #[error(transparent)]
  Network(#[from] reqwest::Error),

  /// An API answered, but not with something usable.
  ///
  /// The string carries the status or a short description for debugging.
  #[error("API error: {0}")]
  ApiError(String),

  /// The environment variable holding the model credential is not set.
  ///
  /// This is the only error that stops a run before any paper is touched.
  #[error("Missing API credential: set the `{0}` environment variable")]
  MissingCredential(String),

  /// A configuration value is present but unusable.
  #[error("{0}")]
  Config(String),

  /// A configuration file could not be deserialized.
  #[error(transparent)]
  TomlDe(#[from] toml::de::Error),

  /// A file system operation failed.
  #[error(transparent)]
  Path(#[from] std::io::Error),

  /// PDF parsing errors from the lopdf library.
  ///
  /// Common causes are non-PDF payloads (an HTML error page served with status 200), truncated
  /// downloads, and encrypted documents.
  #[error(transparent)]
  Lopdf(#[from] lopdf::Error),

  /// The PDF parsed but has no pages to read.
  #[error("PDF document has no pages")]
  EmptyDocument,

  /// The Atom feed could not be parsed.
  #[error(transparent)]
  Xml(#[from] quick_xml::Error),

  /// JSON (de)serialization failed.
  #[error(transparent)]
  Json(#[from] serde_json::Error),

  /// The model answered with something other than the requested JSON shape.
  #[error("Malformed model response: {0}")]
  MalformedResponse(String),

  /// A blocking task panicked or was cancelled.
  #[error(transparent)]
  Join(#[from] tokio::task::JoinError),
}
