//! OpenAI-compatible chat-completions transport
//!
//! Both llama.cpp's server and the hosted providers speak this protocol; the
//! variants differ in paths, auth and how structured output is requested.

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::config::BackendSettings;
use crate::error::{CompassError, Result};

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
  pub model: &'a str,
  pub messages: Vec<ChatMessage<'a>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub response_format: Option<ResponseFormat>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub temperature: Option<f32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub max_tokens: Option<u32>,
  pub stream: bool,
}

impl<'a> ChatRequest<'a> {
  /// Single user-turn request
  pub fn user(model: &'a str, prompt: &'a str) -> Self {
    Self {
      model,
      messages: vec![ChatMessage { role: "user", content: prompt }],
      response_format: None,
      temperature: None,
      max_tokens: None,
      stream: false,
    }
  }

  pub fn json(mut self, schema: Option<Value>) -> Self {
    self.response_format = Some(ResponseFormat { kind: "json_object", schema });
    self
  }

  pub fn temperature(mut self, temperature: f32) -> Self {
    self.temperature = Some(temperature);
    self
  }

  pub fn max_tokens(mut self, max_tokens: u32) -> Self {
    self.max_tokens = Some(max_tokens);
    self
  }
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
  pub role: &'a str,
  pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ResponseFormat {
  #[serde(rename = "type")]
  pub kind: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub schema: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
  #[serde(default)]
  choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
  message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
  #[serde(default)]
  content: Option<String>,
}

/// Thin reqwest wrapper bound to one provider endpoint
pub struct ChatClient {
  client: Client,
  base_url: String,
  api_key: Option<String>,
}

impl ChatClient {
  pub fn new(settings: &BackendSettings, api_key: Option<String>) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(settings.timeout_secs))
      .build()
      .map_err(|e| CompassError::backend_init(format!("Failed to create HTTP client: {e}")))?;

    Ok(Self { client, base_url: settings.base_url.trim_end_matches('/').to_string(), api_key })
  }

  pub fn url(&self, path: &str) -> String {
    format!("{}/{}", self.base_url, path.trim_start_matches('/'))
  }

  /// Send a chat request and return the first choice's message content
  pub async fn complete(&self, path: &str, request: &ChatRequest<'_>) -> Result<String> {
    let response: ChatResponse = self.post_json(path, request).await?;
    response
      .choices
      .into_iter()
      .next()
      .and_then(|choice| choice.message.content)
      .ok_or_else(|| CompassError::schema_violation("Chat response has no message content"))
  }

  /// POST a JSON body and decode a JSON reply
  pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
  where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
  {
    let url = self.url(path);
    let mut request = self.client.post(&url).json(body);
    if let Some(api_key) = &self.api_key {
      request = request.bearer_auth(api_key);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
      let error_text = response.text().await.unwrap_or_default();
      return Err(CompassError::transport(format!("POST {url} returned HTTP {status}: {error_text}")));
    }

    response
      .json()
      .await
      .map_err(|e| CompassError::transport(format!("Unreadable response from {url}: {e}")))
  }
}
