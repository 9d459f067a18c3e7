//! Per-paper orchestration: feed → PDF text → affiliations.
//!
//! Every paper goes through the same strictly ordered steps: download the PDF, extract the first
//! page, ask the model. Papers are independent of each other, so several may be in flight at once
//! when `concurrency` is raised; the output keeps feed order regardless, and a failure in one
//! paper only ever empties that paper's affiliations.

use futures::{stream, StreamExt};

use super::*;
use crate::{
  affiliation::AffiliationLinker,
  config::Config,
  feed::FeedClient,
  llm::{ChatClient, CompletionModel},
  pdf::PdfExtractor,
};

/// Drives a search from the feed query to resolved papers.
#[derive(Debug)]
pub struct Pipeline<M> {
  /// Source of papers
  feed:        FeedClient,
  /// First-page text extraction
  extractor:   PdfExtractor,
  /// Affiliation resolution
  linker:      AffiliationLinker<M>,
  /// Maximum number of papers processed at once
  concurrency: usize,
}

impl Pipeline<ChatClient> {
  /// Wires a pipeline from `config`, sharing one HTTP client between all components.
  ///
  /// # Errors
  ///
  /// Returns an error if the HTTP client cannot be built.
  pub fn from_config(config: &Config) -> Result<Self> {
    let client = config.http_client()?;
    Ok(
      Self::new(
        FeedClient::from_settings(&config.settings.feed, client.clone()),
        PdfExtractor::new(client.clone()),
        AffiliationLinker::new(ChatClient::from_config(config, client)),
      )
      .with_concurrency(config.settings.concurrency),
    )
  }
}

impl<M: CompletionModel> Pipeline<M> {
  /// Creates a sequential pipeline from its parts.
  pub fn new(feed: FeedClient, extractor: PdfExtractor, linker: AffiliationLinker<M>) -> Self {
    Self { feed, extractor, linker, concurrency: 1 }
  }

  /// Sets how many papers may be processed at the same time. Values below one mean one.
  pub fn with_concurrency(mut self, concurrency: usize) -> Self {
    self.concurrency = concurrency.max(1);
    self
  }

  /// Searches the feed for `keyword` and resolves the affiliations of every paper found.
  ///
  /// # Errors
  ///
  /// Only the feed query can fail; per-paper problems degrade that paper's affiliations instead.
  pub async fn run(&self, keyword: &str, max_results: usize) -> Result<Vec<ResolvedPaper>> {
    let papers = self
      .feed
      .search(keyword, max_results)
      .await
      .inspect_err(|e| warn!("Feed query for {keyword:?} failed: {e}"))?;
    Ok(self.process_all(papers).await)
  }

  /// Resolves a batch of papers, keeping their order.
  pub async fn process_all(&self, papers: Vec<Paper>) -> Vec<ResolvedPaper> {
    stream::iter(papers).map(|paper| self.process(paper)).buffered(self.concurrency).collect().await
  }

  /// Resolves a single paper. Never fails.
  #[instrument(skip_all, fields(url = %paper.url), level = "debug")]
  pub async fn process(&self, paper: Paper) -> ResolvedPaper {
    let page_text = self.extractor.first_page_text(&paper.pdf_url).await;
    let authors = self.linker.resolve(&page_text, &paper.authors).await;
    debug!(
      "Resolved {} authors, {} with affiliations",
      authors.len(),
      authors.iter().filter(|a| !a.affiliations.is_empty()).count()
    );
    paper.resolve(authors)
  }
}
