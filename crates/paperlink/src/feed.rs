//! arXiv search and Atom feed parsing.
//!
//! [`FeedClient::search`] asks the arXiv API for the most recently submitted papers matching a
//! term and turns every `<entry>` of the Atom response into a flat [`Paper`]. The parser walks the
//! document with `quick-xml` events and only looks at elements directly relevant to a paper:
//!
//! ```xml
//! <entry>
//!   <id>http://arxiv.org/abs/2301.07041v2</id>
//!   <published>2023-01-17T18:57:37Z</published>
//!   <title>Verifiable Fully Homomorphic Encryption</title>
//!   <summary>...</summary>
//!   <author><name>Alexander Viand</name></author>
//!   <link href="http://arxiv.org/abs/2301.07041v2" rel="alternate" type="text/html"/>
//!   <link title="pdf" href="http://arxiv.org/pdf/2301.07041v2" rel="related" type="application/pdf"/>
//! </entry>
//! ```

use chrono::NaiveDateTime;
use quick_xml::{
  events::{BytesStart, Event},
  Reader,
};

use super::*;
use crate::config::FeedSettings;

/// Timestamp layout used by the Atom `<published>` element.
const PUBLISHED_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Client for the arXiv query API.
#[derive(Debug, Clone)]
pub struct FeedClient {
  /// Shared HTTP client carrying the per-call timeout
  client:   reqwest::Client,
  /// Query endpoint
  base_url: String,
}

impl FeedClient {
  /// Creates a client querying `base_url` through `client`.
  pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
    Self { client, base_url: base_url.into() }
  }

  /// Creates a client from feed settings.
  pub fn from_settings(settings: &FeedSettings, client: reqwest::Client) -> Self {
    Self::new(client, settings.base_url.clone())
  }

  /// Retrieves up to `max_results` of the most recently submitted papers matching `term`.
  ///
  /// # Errors
  ///
  /// Returns [`PaperlinkError::Network`] if the request fails, [`PaperlinkError::ApiError`] on a
  /// non-success status, and [`PaperlinkError::Xml`] if the feed cannot be parsed.
  pub async fn search(&self, term: &str, max_results: usize) -> Result<Vec<Paper>> {
    let query = [
      ("search_query", format!("all:{term}")),
      ("start", "0".to_string()),
      ("max_results", max_results.to_string()),
      ("sortBy", "submittedDate".to_string()),
      ("sortOrder", "descending".to_string()),
    ];
    debug!("Querying {} for {term:?} (max {max_results})", self.base_url);

    let response = self.client.get(&self.base_url).query(&query).send().await?;
    let status = response.status();
    if !status.is_success() {
      return Err(PaperlinkError::ApiError(format!("Feed query failed with status {status}")));
    }

    let body = response.text().await?;
    trace!("Feed response: {body}");
    let papers = parse_feed(&body)?;
    info!("Feed returned {} papers for {term:?}", papers.len());
    Ok(papers)
  }
}

/// Fields of the entry currently being parsed.
#[derive(Debug, Default)]
struct EntryBuilder {
  /// Entry title
  title:     String,
  /// Entry abstract
  summary:   String,
  /// Entry identifier URL
  id:        String,
  /// Raw `<published>` timestamp
  published: String,
  /// Author names in document order
  authors:   Vec<String>,
  /// The `alternate` link that points at the abstract page
  abs_url:   String,
  /// An explicitly advertised PDF link
  pdf_url:   String,
}

impl EntryBuilder {
  /// Records a `<link>` element.
  fn link(&mut self, element: &BytesStart) -> Result<()> {
    let (mut href, mut rel, mut title) = (String::new(), String::new(), String::new());
    for attribute in element.attributes() {
      let attribute = attribute.map_err(quick_xml::Error::from)?;
      let value = attribute.unescape_value()?.into_owned();
      match attribute.key.local_name().as_ref() {
        b"href" => href = value,
        b"rel" => rel = value,
        b"title" => title = value,
        _ => {},
      }
    }

    if rel == "alternate" && href.contains("abs") {
      self.abs_url = href.clone();
    }
    if title.eq_ignore_ascii_case("pdf") || (rel == "related" && href.ends_with(".pdf")) {
      self.pdf_url = href;
    }
    Ok(())
  }

  /// Finishes the entry.
  fn build(self) -> Paper {
    let pdf_url = if self.pdf_url.is_empty() && !self.abs_url.is_empty() {
      self.abs_url.replace("abs", "pdf")
    } else {
      self.pdf_url
    };

    Paper {
      title: self.title.trim().to_string(),
      summary: self.summary.trim().to_string(),
      url: self.id.trim().to_string(),
      pub_date: publication_date(self.published.trim()),
      pdf_url,
      authors: self.authors,
    }
  }
}

/// Parses an arXiv Atom document into papers, in feed order.
///
/// Elements are matched by local name, so the Atom namespace may be the default one or bound to any
/// prefix. Authors with blank names are skipped. Missing elements leave the corresponding field empty.
///
/// # Errors
///
/// Returns [`PaperlinkError::Xml`] if the document is not well-formed.
pub fn parse_feed(xml: &str) -> Result<Vec<Paper>> {
  let mut reader = Reader::from_str(xml);
  reader.config_mut().trim_text(true);

  let mut papers = Vec::new();
  let mut path: Vec<String> = Vec::new();
  let mut entry: Option<EntryBuilder> = None;

  loop {
    match reader.read_event()? {
      Event::Start(element) => {
        let name = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
        if name == "entry" && entry.is_none() {
          entry = Some(EntryBuilder::default());
        } else if let (true, Some(current)) = (name == "link", entry.as_mut()) {
          current.link(&element)?;
        }
        path.push(name);
      },
      Event::Empty(element) =>
        if let (b"link", Some(current)) = (element.local_name().as_ref(), entry.as_mut()) {
          current.link(&element)?;
        },
      Event::Text(text) =>
        if let Some(current) = entry.as_mut() {
          let text = text.unescape()?;
          append_text(current, &path, &text);
        },
      Event::CData(data) =>
        if let Some(current) = entry.as_mut() {
          let text = String::from_utf8_lossy(&data).into_owned();
          append_text(current, &path, &text);
        },
      Event::End(element) => {
        path.pop();
        if element.local_name().as_ref() == b"entry" {
          if let Some(finished) = entry.take() {
            papers.push(finished.build());
          }
        }
      },
      Event::Eof => break,
      _ => {},
    }
  }

  Ok(papers)
}

/// Routes a piece of text to the entry field addressed by the current element path.
fn append_text(entry: &mut EntryBuilder, path: &[String], text: &str) {
  let (Some(element), Some(parent)) = (path.last(), path.len().checked_sub(2).map(|i| &path[i]))
  else {
    return;
  };

  match (parent.as_str(), element.as_str()) {
    ("entry", "title") => entry.title.push_str(text),
    ("entry", "summary") => entry.summary.push_str(text),
    ("entry", "id") => entry.id.push_str(text),
    ("entry", "published") => entry.published.push_str(text),
    ("author", "name") => {
      let name = text.trim();
      if !name.is_empty() {
        entry.authors.push(name.to_string());
      }
    },
    _ => {},
  }
}

/// Formats a `<published>` timestamp as `YYYY-MM-DD`.
///
/// Falls back to the first ten characters of the raw value when it does not follow the Atom
/// layout.
///
/// ```
/// use paperlink::feed::publication_date;
///
/// assert_eq!(publication_date("2024-03-05T17:59:59Z"), "2024-03-05");
/// assert_eq!(publication_date("2024-03-05T17:59:59+01:00"), "2024-03-05");
/// assert_eq!(publication_date(""), "");
/// ```
pub fn publication_date(raw: &str) -> String {
  match NaiveDateTime::parse_from_str(raw, PUBLISHED_FORMAT) {
    Ok(timestamp) => timestamp.format("%Y-%m-%d").to_string(),
    Err(_) => raw.chars().take(10).collect(),
  }
}
