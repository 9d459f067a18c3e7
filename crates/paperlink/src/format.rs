//! File name formatting helpers.

use super::*;

/// Base name used when a label sanitizes down to nothing.
pub const DEFAULT_FILE_STEM: &str = "keywords";

lazy_static! {
  /// Runs of characters that are not allowed in file names on common platforms.
  static ref PATH_HOSTILE: Regex = Regex::new(r#"[\\/:*?"<>|]+"#).unwrap();
  /// Runs of whitespace.
  static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Turns a free-text label (typically the search keyword) into a file-system safe base name.
///
/// Surrounding whitespace and quotes are removed, every run of `\ / : * ? " < > |` becomes a single
/// `_`, and every run of whitespace becomes a single `_`. An empty result falls back to
/// [`DEFAULT_FILE_STEM`].
///
/// # Examples
///
/// ```
/// use paperlink::format::sanitize_filename;
///
/// assert_eq!(sanitize_filename("  large   language models "), "large_language_models");
/// assert_eq!(sanitize_filename("\"cs/AI agents\""), "cs_AI_agents");
/// assert_eq!(sanitize_filename("''"), "keywords");
/// ```
pub fn sanitize_filename(label: &str) -> String {
  let label = label.trim().trim_matches('"').trim_matches('\'');
  let label = PATH_HOSTILE.replace_all(label, "_");
  let label = WHITESPACE.replace_all(&label, "_");
  if label.is_empty() {
    DEFAULT_FILE_STEM.to_string()
  } else {
    label.into_owned()
  }
}
