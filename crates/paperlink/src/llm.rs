//! Client for OpenAI-compatible chat completion endpoints.
//!
//! The affiliation linker only needs "send these messages, give me the text back", which is what
//! the [`CompletionModel`] trait captures. [`ChatClient`] implements it against any endpoint that
//! speaks the `/chat/completions` protocol with bearer authentication (DashScope's compatible mode
//! by default). Tests and alternative backends implement the trait directly.
//!
//! # Examples
//!
//! ```no_run
//! use paperlink::{
//!   config::Config,
//!   llm::{ChatClient, CompletionModel, Message},
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env(Default::default())?;
//! let client = ChatClient::from_config(&config, config.http_client()?);
//!
//! let answer = client
//!   .complete(&[Message::system("Answer in one word."), Message::user("Capital of France?")])
//!   .await?;
//! println!("{answer}");
//! # Ok(())
//! # }
//! ```

use super::*;
use crate::config::Config;

/// Something that turns a conversation into a single text completion.
///
/// Implementations return the assistant's reply with surrounding whitespace removed. They do not
/// interpret the reply; that is up to the caller.
#[async_trait]
pub trait CompletionModel: Send + Sync {
  /// Sends `messages` in order and returns the generated text.
  ///
  /// # Errors
  ///
  /// Any transport, status, or decoding failure.
  async fn complete(&self, messages: &[Message]) -> Result<String>;
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
  /// Author of the message: "system", "user", or "assistant"
  pub role:    String,
  /// Message text
  pub content: String,
}

impl Message {
  /// Creates a system instruction.
  pub fn system(content: impl Into<String>) -> Self {
    Self { role: "system".to_string(), content: content.into() }
  }

  /// Creates a user message.
  pub fn user(content: impl Into<String>) -> Self {
    Self { role: "user".to_string(), content: content.into() }
  }
}

/// Request body for the chat completions endpoint.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
  /// Model identifier
  pub model:       &'a str,
  /// Conversation so far
  pub messages:    &'a [Message],
  /// Sampling temperature
  pub temperature: f64,
  /// Upper bound on generated tokens
  pub max_tokens:  u32,
}

/// Response body of the chat completions endpoint, reduced to what is read.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
  /// Generated alternatives; only the first one is used
  pub choices: Vec<Choice>,
}

/// One generated alternative.
#[derive(Debug, Deserialize)]
pub struct Choice {
  /// The assistant message
  pub message: Message,
}

/// [`CompletionModel`] backed by an OpenAI-compatible HTTP endpoint.
#[derive(Clone)]
pub struct ChatClient {
  /// Shared HTTP client carrying the per-call timeout
  client:      reqwest::Client,
  /// Full URL of the chat completions endpoint
  endpoint:    String,
  /// Bearer credential
  api_key:     String,
  /// Model identifier
  model:       String,
  /// Sampling temperature
  temperature: f64,
  /// Upper bound on generated tokens
  max_tokens:  u32,
}

impl ChatClient {
  /// Creates a client from the model settings and credential in `config`.
  pub fn from_config(config: &Config, client: reqwest::Client) -> Self {
    let model = &config.settings.model;
    Self {
      client,
      endpoint: model.endpoint.clone(),
      api_key: config.api_key().to_string(),
      model: model.name.clone(),
      temperature: model.temperature,
      max_tokens: model.max_tokens,
    }
  }

  /// Overrides the model identifier.
  pub fn with_model(mut self, model: impl Into<String>) -> Self {
    self.model = model.into();
    self
  }

  /// Overrides the endpoint URL.
  pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
    self.endpoint = endpoint.into();
    self
  }
}

impl std::fmt::Debug for ChatClient {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ChatClient")
      .field("endpoint", &self.endpoint)
      .field("model", &self.model)
      .field("temperature", &self.temperature)
      .field("max_tokens", &self.max_tokens)
      .finish_non_exhaustive()
  }
}

#[async_trait]
impl CompletionModel for ChatClient {
  async fn complete(&self, messages: &[Message]) -> Result<String> {
    if messages.is_empty() {
      return Err(PaperlinkError::ApiError("No messages were supplied to the model".to_string()));
    }

    let request = ChatRequest {
      model: &self.model,
      messages,
      temperature: self.temperature,
      max_tokens: self.max_tokens,
    };
    debug!("Sending {} messages to {} ({})", messages.len(), self.endpoint, self.model);

    let response = self
      .client
      .post(&self.endpoint)
      .bearer_auth(&self.api_key)
      .json(&request)
      .send()
      .await?
      .error_for_status()?;
    let body: ChatResponse = response.json().await?;

    let content = body
      .choices
      .into_iter()
      .next()
      .map(|choice| choice.message.content)
      .ok_or_else(|| PaperlinkError::ApiError("Model response contained no choices".to_string()))?;
    trace!("Model response: {content}");
    Ok(content.trim().to_string())
  }
}
