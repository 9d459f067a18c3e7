//! Persisting resolved papers as a JSON document.

use super::*;

/// Writes `papers` to `<root_dir>/<sanitized label>.json` and returns the full path written.
///
/// The directory is created if needed and a leading `~` is expanded to the home directory. The
/// document is UTF-8, indented with two spaces, and keeps non-ASCII characters as they are.
///
/// # Errors
///
/// Returns [`PaperlinkError::Path`] if the directory cannot be created or the file cannot be
/// written.
///
/// # Examples
///
/// ```no_run
/// use paperlink::output::save_results;
///
/// let path = save_results("~/papers", "diffusion models", &[])?;
/// assert!(path.ends_with("diffusion_models.json"));
/// # Ok::<(), paperlink::error::PaperlinkError>(())
/// ```
pub fn save_results(
  root_dir: impl AsRef<Path>,
  label: &str,
  papers: &[ResolvedPaper],
) -> Result<PathBuf> {
  let root = absolute(&expand_home(root_dir.as_ref()))?;
  std::fs::create_dir_all(&root)?;

  let path = root.join(format!("{}.json", format::sanitize_filename(label)));
  let json = serde_json::to_string_pretty(papers)?;
  std::fs::write(&path, json)?;

  info!("Wrote {} papers to {}", papers.len(), path.display());
  Ok(path)
}

/// Replaces a leading `~` component with the user's home directory, if one is known.
fn expand_home(path: &Path) -> PathBuf {
  match (path.strip_prefix("~"), dirs::home_dir()) {
    (Ok(rest), Some(home)) => home.join(rest),
    _ => path.to_path_buf(),
  }
}

/// Anchors a relative path at the current working directory.
fn absolute(path: &Path) -> Result<PathBuf> {
  if path.is_absolute() {
    Ok(path.to_path_buf())
  } else {
    Ok(std::env::current_dir()?.join(path))
  }
}
