//! Local inference through a llama.cpp server
//!
//! Structured calls use the server's OpenAI-compatible chat endpoint with a
//! JSON schema attached, which llama.cpp turns into a sampling grammar.
//! Definitions go through the raw `/completion` endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::chat::{ChatClient, ChatRequest};
use super::{prompts, schema, AxisAttributes, Rating, RatingScale, ReasoningBackend};
use crate::config::BackendSettings;
use crate::error::{CompassError, Result};

const CHAT_PATH: &str = "v1/chat/completions";
const COMPLETION_PATH: &str = "completion";
const DEFINITION_TOKENS: u32 = 100;

#[derive(Serialize)]
struct CompletionRequest<'a> {
  prompt: &'a str,
  n_predict: u32,
  stream: bool,
}

#[derive(Deserialize)]
struct CompletionResponse {
  content: String,
}

pub struct LocalBackend {
  client: ChatClient,
  model: String,
  scale: RatingScale,
}

impl LocalBackend {
  pub fn new(settings: &BackendSettings, scale: RatingScale) -> Result<Self> {
    if settings.base_url.trim().is_empty() {
      return Err(CompassError::backend_init("llama_cpp base_url is empty"));
    }
    Ok(Self { client: ChatClient::new(settings, None)?, model: settings.model.clone(), scale })
  }

  async fn structured(&self, prompt: &str, schema: Value) -> Result<Value> {
    let request = ChatRequest::user(&self.model, prompt).json(Some(schema)).temperature(0.0);
    let content = self.client.complete(CHAT_PATH, &request).await?;
    schema::extract_json(&content)
  }
}

#[async_trait]
impl ReasoningBackend for LocalBackend {
  fn name(&self) -> &'static str {
    "llama_cpp"
  }

  async fn classify_slang(&self, word: &str) -> Result<bool> {
    let value = self.structured(&prompts::slang_prompt(word), schema::slang_schema()).await?;
    schema::parse_slang(&value)
  }

  async fn generate_axes(&self, word: &str, is_slang: bool) -> Result<AxisAttributes> {
    let value =
      self.structured(&prompts::axes_prompt(word, is_slang), schema::axes_schema()).await?;
    schema::parse_axes(&value)
  }

  async fn define(&self, word: &str) -> Result<String> {
    let prompt = prompts::definition_prompt(word);
    let request =
      CompletionRequest { prompt: &prompt, n_predict: DEFINITION_TOKENS, stream: false };
    let response: CompletionResponse = self.client.post_json(COMPLETION_PATH, &request).await?;
    Ok(response.content.trim().to_string())
  }

  async fn context(&self, word: &str, attributes: &AxisAttributes) -> Result<String> {
    let prompt = prompts::context_prompt(word, attributes);
    let request = ChatRequest::user(&self.model, &prompt);
    Ok(self.client.complete(CHAT_PATH, &request).await?.trim().to_string())
  }

  async fn rate_chunk(
    &self,
    chunk: &str,
    word: &str,
    attributes: &AxisAttributes,
  ) -> Result<Rating> {
    let prompt = prompts::rating_prompt(chunk, word, attributes, self.scale);
    let value = self.structured(&prompt, schema::rating_schema(self.scale)).await?;
    schema::parse_rating(&value, self.scale)
  }
}
