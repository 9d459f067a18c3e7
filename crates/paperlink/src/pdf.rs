//! First-page text extraction from remote PDFs.
//!
//! Everything in this module that touches the network is infallible from the caller's point of
//! view: a PDF that cannot be downloaded or parsed yields an empty string. An empty page text is a
//! legitimate input to [`affiliation`](crate::affiliation), which then degrades that one paper
//! instead of aborting the run.

use lopdf::Document;

use super::*;

lazy_static! {
  /// Runs of whitespace, including the line breaks lopdf inserts between text objects.
  static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Downloads PDFs and extracts the text of their first page.
#[derive(Debug, Clone, Default)]
pub struct PdfExtractor {
  /// HTTP client used for downloads, carrying the per-call timeout
  client: reqwest::Client,
}

impl PdfExtractor {
  /// Creates an extractor that downloads through `client`.
  pub fn new(client: reqwest::Client) -> Self { Self { client } }

  /// Returns the normalized text of the first page of the PDF at `pdf_url`.
  ///
  /// Any failure along the way (network errors, timeouts, non-success statuses, payloads that are
  /// not PDFs, documents without pages) produces an empty string.
  pub async fn first_page_text(&self, pdf_url: &str) -> String {
    match self.try_first_page_text(pdf_url).await {
      Ok(text) => text,
      Err(e) => {
        debug!("No first-page text for {pdf_url}: {e}");
        String::new()
      },
    }
  }

  /// Fallible version of [`PdfExtractor::first_page_text`].
  pub async fn try_first_page_text(&self, pdf_url: &str) -> Result<String> {
    if pdf_url.trim().is_empty() {
      return Err(PaperlinkError::ApiError("No PDF URL available".to_string()));
    }

    let response = self.client.get(pdf_url).send().await?;
    if !response.status().is_success() {
      trace!("pdf_url response: {response:?}");
      return Err(PaperlinkError::ApiError(format!(
        "Failed to download PDF: {}",
        response.status()
      )));
    }
    let bytes = response.bytes().await?;
    debug!("Downloaded {} bytes from {pdf_url}", bytes.len());

    tokio::task::spawn_blocking(move || first_page_text_from_bytes(&bytes)).await?
  }
}

/// Extracts the normalized text of the lowest-numbered page of an in-memory PDF.
///
/// # Errors
///
/// Returns [`PaperlinkError::Lopdf`] if the bytes are not a readable PDF and
/// [`PaperlinkError::EmptyDocument`] if it has no pages.
pub fn first_page_text_from_bytes(bytes: &[u8]) -> Result<String> {
  let doc = Document::load_mem(bytes)?;
  let first_page = doc.get_pages().keys().next().copied().ok_or(PaperlinkError::EmptyDocument)?;
  let text = doc.extract_text(&[first_page])?;
  Ok(normalize_whitespace(&text))
}

/// Collapses every whitespace run to a single space and trims the ends.
///
/// ```
/// use paperlink::pdf::normalize_whitespace;
///
/// assert_eq!(normalize_whitespace("  Alice\n\nSmith\t MIT "), "Alice Smith MIT");
/// ```
pub fn normalize_whitespace(text: &str) -> String {
  WHITESPACE.replace_all(text, " ").trim().to_string()
}
