//! The chat-completions collaborator the orchestrator dispatches batches to.
//!
//! The wire contract is the OpenAI-compatible shape: a system message
//! carrying the translation instructions, a user message carrying the
//! newline-joined lines, and `choices[0].message.content` coming back as the
//! newline-joined translations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::AppSettings;
use crate::error::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

/// One batch in, its translation out. The orchestrator only ever talks to
/// this trait; tests substitute stubs for the HTTP client.
#[async_trait]
pub trait TranslationApi: Send + Sync {
    async fn translate_batch(&self, system_prompt: &str, content: &str) -> Result<String, Error>;
}

/// Production implementation backed by `reqwest` with bearer-token auth.
pub struct HttpTranslationApi {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: String,
}

impl HttpTranslationApi {
    pub fn new(settings: &AppSettings) -> Result<Self, Error> {
        if !settings.api_key_is_configured() {
            return Err(Error::config_error(
                "API key is not set; edit the settings file first",
            ));
        }
        if settings.api.url.is_empty() {
            return Err(Error::config_error("API url is not set"));
        }

        Ok(HttpTranslationApi {
            client: reqwest::Client::new(),
            url: settings.api.url.clone(),
            model: settings.api.model.clone(),
            api_key: settings.api.api_key.clone(),
        })
    }
}

#[async_trait]
impl TranslationApi for HttpTranslationApi {
    async fn translate_batch(&self, system_prompt: &str, content: &str) -> Result<String, Error> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: content.to_string(),
                },
            ],
            stream: false,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::api_error("unexpected response from the translation API"))
    }
}
