//! Paper records as they come out of the feed and as they are written out.
//!
//! A [`Paper`] is the flat record parsed from one Atom `<entry>`. Its `authors` field is the
//! authoritative, ordered name list. A [`ResolvedPaper`] is what gets persisted: the same metadata
//! with every author paired with the affiliations found for them.
//!
//! # Examples
//!
//! ```
//! use paperlink::paper::{AuthorAffiliation, Paper};
//!
//! let paper = Paper {
//!   title:    "Verifiable Fully Homomorphic Encryption".to_string(),
//!   summary:  "We study...".to_string(),
//!   url:      "http://arxiv.org/abs/2301.07041v2".to_string(),
//!   pub_date: "2023-01-17".to_string(),
//!   pdf_url:  "http://arxiv.org/pdf/2301.07041v2".to_string(),
//!   authors:  vec!["Alexander Viand".to_string(), "Christian Knabenhans".to_string()],
//! };
//!
//! let authors = AuthorAffiliation::unknown_all(&paper.authors);
//! let resolved = paper.resolve(authors);
//! assert_eq!(resolved.authors.len(), 2);
//! assert!(resolved.authors.iter().all(|a| a.affiliations.is_empty()));
//! ```

use super::*;

/// One entry of the bibliographic feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Paper {
  /// Title as published, trimmed
  pub title:    String,
  /// Abstract text, trimmed
  pub summary:  String,
  /// Canonical identifier URL (the Atom `<id>`)
  pub url:      String,
  /// Submission date as `YYYY-MM-DD`, best effort
  pub pub_date: String,
  /// Direct link to the PDF, possibly empty if the entry advertised none
  pub pdf_url:  String,
  /// Authoritative author names in byline order
  pub authors:  Vec<String>,
}

/// An author paired with the institutions they were attributed to.
///
/// An empty `affiliations` list means "unknown", which is also what every author gets when a
/// paper's affiliations could not be resolved at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorAffiliation {
  /// Author name exactly as the feed reported it
  pub name:         String,
  /// Free-text institution names, possibly empty
  pub affiliations: Vec<String>,
}

/// A paper ready to be written out.
///
/// Field order matches the persisted JSON layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPaper {
  /// Title as published
  pub title:    String,
  /// Canonical identifier URL
  pub url:      String,
  /// Publication date in `YYYY-MM-DD` form
  pub pub_date: String,
  /// Abstract text
  pub summary:  String,
  /// Authors in byline order with their affiliations
  pub authors:  Vec<AuthorAffiliation>,
}

impl AuthorAffiliation {
  /// Creates an entry with no known affiliations.
  pub fn unknown(name: impl Into<String>) -> Self {
    Self { name: name.into(), affiliations: Vec::new() }
  }

  /// Maps every name to an entry with no known affiliations, keeping order and duplicates.
  pub fn unknown_all(names: &[String]) -> Vec<Self> {
    names.iter().map(|name| Self::unknown(name.as_str())).collect()
  }
}

impl Paper {
  /// Consumes the feed record and attaches resolved authors to it.
  ///
  /// The raw name list is dropped in favour of `authors`; callers are expected to pass a list
  /// derived from `self.authors`.
  pub fn resolve(self, authors: Vec<AuthorAffiliation>) -> ResolvedPaper {
    ResolvedPaper {
      title: self.title,
      url: self.url,
      pub_date: self.pub_date,
      summary: self.summary,
      authors,
    }
  }
}
