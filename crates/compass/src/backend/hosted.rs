//! Hosted chat-completion providers (Groq, OpenAI)
//!
//! These APIs accept `json_object` mode but not a schema, so the expected
//! shape is spelled out in the prompt and checked after the fact.

use async_trait::async_trait;
use serde_json::Value;

use super::chat::{ChatClient, ChatRequest};
use super::{prompts, schema, AxisAttributes, Provider, Rating, RatingScale, ReasoningBackend};
use crate::config::BackendSettings;
use crate::error::{CompassError, Result};

const CHAT_PATH: &str = "chat/completions";
const FREE_TEXT_TOKENS: u32 = 200;

pub struct HostedBackend {
  provider: Provider,
  client: ChatClient,
  model: String,
  scale: RatingScale,
}

impl HostedBackend {
  /// Build a client for `provider`. An explicit `api_key` wins over the
  /// environment variable named in the settings.
  pub fn new(
    provider: Provider,
    settings: &BackendSettings,
    scale: RatingScale,
    api_key: Option<String>,
  ) -> Result<Self> {
    let api_key = resolve_api_key(provider, settings, api_key)?;
    Ok(Self {
      provider,
      client: ChatClient::new(settings, Some(api_key))?,
      model: settings.model.clone(),
      scale,
    })
  }

  async fn structured(&self, prompt: &str) -> Result<Value> {
    let request = ChatRequest::user(&self.model, prompt).json(None).temperature(0.0);
    let content = self.client.complete(CHAT_PATH, &request).await?;
    schema::extract_json(&content)
  }
}

fn resolve_api_key(
  provider: Provider,
  settings: &BackendSettings,
  api_key: Option<String>,
) -> Result<String> {
  if let Some(key) = api_key.filter(|key| !key.trim().is_empty()) {
    return Ok(key);
  }

  let env_var = settings.api_key_env.as_deref().ok_or_else(|| {
    CompassError::backend_init(format!("No API key and no api_key_env configured for {provider}"))
  })?;

  match std::env::var(env_var) {
    Ok(key) if !key.trim().is_empty() => Ok(key),
    _ => Err(CompassError::backend_init(format!("{env_var} is not set for {provider}"))),
  }
}

#[async_trait]
impl ReasoningBackend for HostedBackend {
  fn name(&self) -> &'static str {
    self.provider.as_str()
  }

  async fn classify_slang(&self, word: &str) -> Result<bool> {
    let value = self.structured(&prompts::slang_prompt(word)).await?;
    schema::parse_slang(&value)
  }

  async fn generate_axes(&self, word: &str, is_slang: bool) -> Result<AxisAttributes> {
    let value = self.structured(&prompts::axes_prompt(word, is_slang)).await?;
    schema::parse_axes(&value)
  }

  async fn define(&self, word: &str) -> Result<String> {
    let prompt = prompts::definition_prompt(word);
    let request = ChatRequest::user(&self.model, &prompt).max_tokens(FREE_TEXT_TOKENS);
    Ok(self.client.complete(CHAT_PATH, &request).await?.trim().to_string())
  }

  async fn context(&self, word: &str, attributes: &AxisAttributes) -> Result<String> {
    let prompt = prompts::context_prompt(word, attributes);
    let request = ChatRequest::user(&self.model, &prompt).max_tokens(FREE_TEXT_TOKENS);
    Ok(self.client.complete(CHAT_PATH, &request).await?.trim().to_string())
  }

  async fn rate_chunk(
    &self,
    chunk: &str,
    word: &str,
    attributes: &AxisAttributes,
  ) -> Result<Rating> {
    let prompt = prompts::rating_prompt(chunk, word, attributes, self.scale);
    let value = self.structured(&prompt).await?;
    schema::parse_rating(&value, self.scale)
  }
}
