//! Recent arXiv papers with author affiliations resolved from their first page.
//!
//! `paperlink` queries the arXiv Atom API for the most recently submitted papers matching a
//! keyword, downloads each paper's PDF, extracts the text of its first page, and asks a
//! chat-completion model to bind every author to the institutions printed there.
//!
//! The author list that arXiv publishes is treated as ground truth. Whatever the model answers is
//! only a suggestion that gets reconciled back onto that list, so the resolved authors of a paper
//! always have the same names, count, and order as the feed reported.
//!
//! # Getting Started
//!
//! ```no_run
//! use paperlink::{config::Config, output::save_results, pipeline::Pipeline, prelude::*};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), PaperlinkError> {
//!   let config = Config::from_env(Default::default())?;
//!   let pipeline = Pipeline::from_config(&config)?;
//!
//!   let papers = pipeline.run("quantum error correction", 5).await?;
//!   let path = save_results("papers", "quantum error correction", &papers)?;
//!   println!("Saved {} papers to {}", papers.len(), path.display());
//!   Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`feed`]: arXiv search and Atom feed parsing
//! - [`pdf`]: first-page text extraction that never fails
//! - [`llm`]: chat-completion client and the [`llm::CompletionModel`] seam
//! - [`affiliation`]: prompt construction, response parsing, and reconciliation
//! - [`pipeline`]: per-paper orchestration
//! - [`output`] and [`format`]: JSON persistence and file naming
//! - [`config`]: settings and credentials

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{
  collections::HashMap,
  path::{Path, PathBuf},
  time::Duration,
};

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
#[cfg(test)]
use {tempfile::tempdir, tracing_test::traced_test};

pub mod affiliation;
pub mod config;
pub mod error;
pub mod feed;
pub mod format;
pub mod llm;
pub mod output;
pub mod paper;
pub mod pdf;
pub mod pipeline;

use crate::{error::*, paper::*};

/// Common traits and types for ergonomic imports.
///
/// ```no_run
/// use paperlink::prelude::*;
///
/// fn check(result: Result<(), PaperlinkError>) -> bool { result.is_ok() }
/// ```
pub mod prelude {
  pub use crate::{
    error::PaperlinkError,
    llm::CompletionModel,
    paper::{AuthorAffiliation, Paper, ResolvedPaper},
  };
}
