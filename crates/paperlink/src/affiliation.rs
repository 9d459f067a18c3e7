//! Resolving author affiliations from first-page text.
//!
//! The feed tells us who wrote a paper and in which order; the first page of the PDF tells us where
//! they work, but only as unstructured text. [`AffiliationLinker`] asks a [`CompletionModel`] to
//! connect the two and then treats the answer as an untrusted suggestion:
//!
//! 1. The answer is parsed strictly ([`parse_response`]). Anything that is not the requested JSON
//!    shape is discarded.
//! 2. The answer is mapped back onto the authoritative name list ([`reconcile`]). Names the model
//!    invented are dropped, names it forgot get no affiliations, and the order is always the feed's.
//!
//! Whenever the text is missing or a step fails, every author gets an empty affiliation list (the
//! degraded result, see [`degraded`]). Resolution therefore never fails and never changes the
//! author list.
//!
//! # Examples
//!
//! ```
//! use std::collections::HashMap;
//!
//! use paperlink::affiliation::reconcile;
//!
//! let authors = vec!["Alice Smith".to_string(), "Bob Lee".to_string()];
//! let claimed = HashMap::from([
//!   ("Alice Smith".to_string(), vec!["MIT".to_string()]),
//!   ("Carol X".to_string(), vec!["X Lab".to_string()]),
//! ]);
//!
//! let resolved = reconcile(&authors, &claimed);
//! assert_eq!(resolved[0].affiliations, vec!["MIT"]);
//! assert!(resolved[1].affiliations.is_empty());
//! ```

use serde_json::Value;

use crate::llm::{CompletionModel, Message};

use super::*;

lazy_static! {
  /// An optional language tag on the first line of a fenced answer.
  static ref LANGUAGE_TAG: Regex = Regex::new(r"(?i)\Ajson[ \t]*\r?\n").unwrap();
}

/// Instruction that frames the model as a linker over a fixed author list.
const SYSTEM_PROMPT: &str = "You link scholarly authors to their institutions. You receive an \
                             ordered author list taken from arXiv, which is authoritative, and \
                             the text of the first page of the paper's PDF. For every listed \
                             author, find the institutional affiliations named in the text.\n\
                             Rules:\n\
                             - Never add, remove, rename, or reorder authors.\n\
                             - If you cannot attribute an author with confidence, give that \
                             author an empty affiliations array.\n\
                             - Report institution-level names only (universities, labs, \
                             companies). Leave out email addresses and footnote symbols.\n\
                             - When the text uses superscripts or footnote markers, use them to \
                             tie authors to affiliations.\n\
                             Reply with one strict JSON object and nothing else, shaped as:\n\
                             {\"authors\": [{\"name\": \"...\", \"affiliations\": [\"...\"]}]}\n\
                             The authors array must follow the order of the given list exactly.";

/// The JSON object the model is asked to produce.
#[derive(Debug, Deserialize)]
struct LinkerAnswer {
  /// One entry per author, as claimed by the model
  authors: Vec<ClaimedAuthor>,
}

/// A single author entry as claimed by the model.
#[derive(Debug, Deserialize)]
struct ClaimedAuthor {
  /// Name as the model spelled it
  name:         String,
  /// Claimed institutions; `null` entries are tolerated and skipped
  #[serde(default)]
  affiliations: Option<Vec<Option<String>>>,
}

/// Resolves per-author affiliations using a completion model.
#[derive(Debug, Clone)]
pub struct AffiliationLinker<M> {
  /// The model asked to link authors to institutions
  model: M,
}

impl<M: CompletionModel> AffiliationLinker<M> {
  /// Creates a linker that consults `model`.
  pub fn new(model: M) -> Self { Self { model } }

  /// The underlying model.
  pub fn model(&self) -> &M { &self.model }

  /// Pairs every author with the affiliations found for them in `page_text`.
  ///
  /// The result always has exactly one entry per element of `authors`, in the same order and with
  /// the same names. If `page_text` is blank, the model call fails, or its answer is malformed,
  /// every author gets an empty list.
  #[instrument(skip_all, fields(authors = authors.len(), text_len = page_text.len()), level = "debug")]
  pub async fn resolve(&self, page_text: &str, authors: &[String]) -> Vec<AuthorAffiliation> {
    if authors.is_empty() {
      return Vec::new();
    }
    if page_text.trim().is_empty() {
      debug!("No page text, skipping the model");
      return degraded(authors);
    }

    match self.try_resolve(page_text, authors).await {
      Ok(resolved) => resolved,
      Err(e) => {
        debug!("Affiliation lookup degraded: {e}");
        degraded(authors)
      },
    }
  }

  /// Fallible core of [`AffiliationLinker::resolve`].
  async fn try_resolve(&self, page_text: &str, authors: &[String]) -> Result<Vec<AuthorAffiliation>> {
    let messages = build_messages(page_text, authors)?;
    let raw = self.model.complete(&messages).await?;
    let claimed = parse_response(&raw)?;
    Ok(reconcile(authors, &claimed))
  }
}

/// Builds the system instruction and the user message carrying the author list and page text.
///
/// The author list is embedded as a JSON array so names survive verbatim, including quotes and
/// non-ASCII characters.
pub fn build_messages(page_text: &str, authors: &[String]) -> Result<Vec<Message>> {
  let author_list = serde_json::to_string(authors)?;
  let user = format!(
    "Author list (authoritative, ordered):\n{author_list}\n\nFirst-page text:\n{page_text}\n\nNow \
     output JSON only."
  );
  Ok(vec![Message::system(SYSTEM_PROMPT), Message::user(user)])
}

/// Parses a raw model answer into a map from claimed author name to claimed affiliations.
///
/// Surrounding backtick or quote fences and one leading `json` language-tag line are removed before
/// parsing. Anything else around the JSON object makes the answer malformed.
///
/// # Errors
///
/// [`PaperlinkError::MalformedResponse`] if the answer is not a JSON object with an `authors` array
/// of `{ "name": string, "affiliations": [string] }` entries.
///
/// # Examples
///
/// ```
/// use paperlink::affiliation::parse_response;
///
/// let raw = "```json\n{\"authors\": [{\"name\": \"Alice\", \"affiliations\": [\"MIT\"]}]}\n```";
/// let claimed = parse_response(raw).unwrap();
/// assert_eq!(claimed["Alice"], vec!["MIT"]);
///
/// assert!(parse_response("Sure! Here is the JSON: {}").is_err());
/// ```
pub fn parse_response(raw: &str) -> Result<HashMap<String, Vec<String>>> {
  let value: Value = serde_json::from_str(strip_fences(raw))
    .map_err(|e| PaperlinkError::MalformedResponse(e.to_string()))?;
  let answer = object_shaped(value)?;

  // Later entries win when the model repeats a name.
  Ok(
    answer
      .authors
      .into_iter()
      .map(|claimed| {
        let affiliations =
          claimed.affiliations.unwrap_or_default().into_iter().flatten().collect::<Vec<_>>();
        (claimed.name.trim().to_string(), affiliations)
      })
      .collect(),
  )
}

/// Deserializes the answer after checking that it and every author entry are JSON objects.
///
/// Derived struct deserialization also accepts arrays in field order, which would let
/// `[["Alice", ["MIT"]]]` through.
fn object_shaped(value: Value) -> Result<LinkerAnswer> {
  let Some(authors) = value.as_object().and_then(|answer| answer.get("authors")) else {
    return Err(PaperlinkError::MalformedResponse(
      "expected an object with an `authors` field".to_string(),
    ));
  };
  if authors.as_array().is_some_and(|entries| !entries.iter().all(Value::is_object)) {
    return Err(PaperlinkError::MalformedResponse("author entries must be objects".to_string()));
  }
  serde_json::from_value(value).map_err(|e| PaperlinkError::MalformedResponse(e.to_string()))
}

/// Maps claimed affiliations back onto the authoritative author list.
///
/// Iterates `authoritative`, never the claims: each name is looked up by exact match, missing names
/// get an empty list, and claims for names not in the list are ignored. Affiliations are trimmed
/// and blank ones dropped.
pub fn reconcile(
  authoritative: &[String],
  claimed: &HashMap<String, Vec<String>>,
) -> Vec<AuthorAffiliation> {
  authoritative
    .iter()
    .map(|name| AuthorAffiliation {
      name:         name.clone(),
      affiliations: claimed
        .get(name)
        .map(|affiliations| {
          affiliations
            .iter()
            .map(|affiliation| affiliation.trim())
            .filter(|affiliation| !affiliation.is_empty())
            .map(str::to_string)
            .collect()
        })
        .unwrap_or_default(),
    })
    .collect()
}

/// The result used whenever affiliations cannot be trusted: every author, nothing known.
pub fn degraded(authors: &[String]) -> Vec<AuthorAffiliation> { AuthorAffiliation::unknown_all(authors) }

/// Removes surrounding whitespace, backtick or quote fences, and a leading `json` tag line.
fn strip_fences(raw: &str) -> &str {
  let fenced = raw.trim().trim_matches(|c: char| c == '`' || c == '"' || c == '\'');
  LANGUAGE_TAG.find(fenced).map_or(fenced, |tag| &fenced[tag.end()..]).trim()
}
