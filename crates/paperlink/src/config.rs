//! Run configuration: tunable settings plus the model credential.
//!
//! [`Settings`] holds everything that is safe to keep in a file and can be loaded from TOML. Every
//! field is optional in the file and falls back to the values the tool has always used. [`Config`]
//! pairs the settings with the API key, which is only ever read from the environment, once, at
//! startup.
//!
//! ```toml
//! timeout_secs = 60
//! concurrency  = 4
//!
//! [model]
//! endpoint    = "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions"
//! name        = "qwen-max"
//! temperature = 0.0
//! max_tokens  = 1200
//! api_key_env = "DASHSCOPE_API_KEY"
//!
//! [feed]
//! base_url = "http://export.arxiv.org/api/query"
//! ```

use std::fmt;

use reqwest::Url;

use super::*;

/// Environment variable holding the model credential unless configured otherwise.
pub const DEFAULT_API_KEY_ENV: &str = "DASHSCOPE_API_KEY";

/// OpenAI-compatible chat completions endpoint used by default.
pub const DEFAULT_MODEL_ENDPOINT: &str =
  "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions";

/// arXiv Atom query endpoint.
pub const DEFAULT_FEED_URL: &str = "http://export.arxiv.org/api/query";

/// Tunable, non-secret settings for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// Model endpoint and sampling parameters
  pub model:        ModelSettings,
  /// Bibliographic feed settings
  pub feed:         FeedSettings,
  /// Wall-clock timeout applied to every HTTP call, in seconds
  pub timeout_secs: u64,
  /// Number of papers processed at the same time
  pub concurrency:  usize,
}

/// Settings for the chat completion model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
  /// Full URL of the chat completions endpoint
  pub endpoint:    String,
  /// Model identifier sent with every request
  pub name:        String,
  /// Sampling temperature
  pub temperature: f64,
  /// Upper bound on generated tokens
  pub max_tokens:  u32,
  /// Name of the environment variable that holds the bearer credential
  pub api_key_env: String,
}

/// Settings for the arXiv feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
  /// Query endpoint of the Atom API
  pub base_url: String,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      model:        ModelSettings::default(),
      feed:         FeedSettings::default(),
      timeout_secs: 60,
      concurrency:  1,
    }
  }
}

// NOTE: The answer is parsed as JSON, so sampling stays at zero temperature.
impl Default for ModelSettings {
  fn default() -> Self {
    Self {
      endpoint:    DEFAULT_MODEL_ENDPOINT.to_string(),
      name:        "qwen-max".to_string(),
      temperature: 0.0,
      max_tokens:  1200,
      api_key_env: DEFAULT_API_KEY_ENV.to_string(),
    }
  }
}

impl Default for FeedSettings {
  fn default() -> Self { Self { base_url: DEFAULT_FEED_URL.to_string() } }
}

impl Settings {
  /// Location of the per-user configuration file, if the platform has a config directory.
  pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("paperlink").join("config.toml"))
  }

  /// Parses settings from a TOML string, filling in defaults for anything missing.
  pub fn from_toml_str(toml_str: &str) -> Result<Self> {
    let settings: Settings = toml::from_str(toml_str)?;
    settings.validate()?;
    Ok(settings)
  }

  /// Reads settings from a TOML file.
  pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    debug!("Loading settings from {}", path.display());
    let content = std::fs::read_to_string(path)?;
    Self::from_toml_str(&content)
  }

  /// Loads settings from `path`, or from [`Settings::default_path`] when it exists, or falls back
  /// to the defaults.
  ///
  /// An explicitly given path that cannot be read is an error; a missing default file is not.
  pub fn load(path: Option<&Path>) -> Result<Self> {
    if let Some(path) = path {
      return Self::from_file(path);
    }
    match Self::default_path() {
      Some(path) if path.is_file() => Self::from_file(path),
      _ => {
        trace!("No settings file found, using defaults");
        Ok(Self::default())
      },
    }
  }

  /// The per-call HTTP timeout.
  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }

  /// Rejects values that would make a run impossible.
  pub fn validate(&self) -> Result<()> {
    if self.concurrency == 0 {
      return Err(PaperlinkError::Config("concurrency must be at least 1".to_string()));
    }
    if self.timeout_secs == 0 {
      return Err(PaperlinkError::Config("timeout_secs must be at least 1".to_string()));
    }
    if self.model.api_key_env.trim().is_empty() {
      return Err(PaperlinkError::Config("model.api_key_env must not be empty".to_string()));
    }
    for (key, value) in [("model.endpoint", &self.model.endpoint), ("feed.base_url", &self.feed.base_url)]
    {
      Url::parse(value)
        .map_err(|e| PaperlinkError::Config(format!("{key} is not a valid URL ({value}): {e}")))?;
    }
    Ok(())
  }
}

/// Settings together with the model credential.
///
/// Built once when the process starts and handed by reference to whatever needs to talk to the
/// model. The credential never shows up in `Debug` output.
#[derive(Clone)]
pub struct Config {
  /// Non-secret settings
  pub settings: Settings,
  /// Bearer token for the model endpoint
  api_key:      String,
}

impl Config {
  /// Creates a configuration with an explicitly provided credential.
  pub fn new(settings: Settings, api_key: impl Into<String>) -> Self {
    Self { settings, api_key: api_key.into() }
  }

  /// Creates a configuration reading the credential from the environment variable named by
  /// `settings.model.api_key_env`.
  ///
  /// # Errors
  ///
  /// Returns [`PaperlinkError::MissingCredential`] if the variable is unset or blank, and
  /// [`PaperlinkError::Config`] if the settings are invalid.
  pub fn from_env(settings: Settings) -> Result<Self> {
    settings.validate()?;
    let var = settings.model.api_key_env.clone();
    match std::env::var(&var) {
      Ok(key) if !key.trim().is_empty() => Ok(Self::new(settings, key.trim())),
      _ => Err(PaperlinkError::MissingCredential(var)),
    }
  }

  /// The bearer credential for the model endpoint.
  pub fn api_key(&self) -> &str { &self.api_key }

  /// Builds the HTTP client shared by every component of a run.
  pub fn http_client(&self) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(self.settings.timeout()).build()?)
  }
}

impl fmt::Debug for Config {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Config")
      .field("settings", &self.settings)
      .field("api_key", &"<redacted>")
      .finish()
  }
}
