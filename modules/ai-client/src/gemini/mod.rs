mod client;
pub(crate) mod types;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{AiError, Result};
use crate::traits::TextModel;

use client::GeminiClient;
use types::GenerateRequest;

// =============================================================================
// Gemini Agent
// =============================================================================

#[derive(Clone)]
pub struct Gemini {
    api_key: String,
    pub(crate) model: String,
    base_url: Option<String>,
    http: reqwest::Client,
}

impl Gemini {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
            http: reqwest::Client::new(),
        }
    }

    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| AiError::Config("GEMINI_API_KEY environment variable not set".into()))?;
        Ok(Self::new(api_key, model))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub(crate) fn client(&self) -> GeminiClient {
        let client = GeminiClient::new(self.http.clone(), &self.api_key);
        if let Some(ref url) = self.base_url {
            client.with_base_url(url)
        } else {
            client
        }
    }

    /// Single-turn text generation. Returns the first candidate's text.
    pub async fn generate(&self, prompt: &str, temperature: f32) -> Result<String> {
        let request = GenerateRequest::user(prompt).temperature(temperature);
        let response = self.client().generate(&self.model, &request).await?;

        response.text().ok_or_else(|| {
            let finish_reason = response
                .candidates
                .first()
                .and_then(|c| c.finish_reason.as_deref())
                .unwrap_or("none");
            debug!(model = %self.model, finish_reason, "Gemini response had no text");
            AiError::EmptyResponse
        })
    }
}

// =============================================================================
// TextModel Implementation
// =============================================================================

#[async_trait]
impl TextModel for Gemini {
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String> {
        Gemini::generate(self, prompt, temperature).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_new() {
        let ai = Gemini::new("gm-test", "gemini-2.0-flash");
        assert_eq!(ai.model(), "gemini-2.0-flash");
        assert_eq!(ai.api_key, "gm-test");
        assert_eq!(ai.base_url, None);
    }

    #[test]
    fn test_gemini_with_base_url() {
        let ai = Gemini::new("gm-test", "gemini-2.0-flash").with_base_url("https://custom.api.com");
        assert_eq!(ai.base_url, Some("https://custom.api.com".to_string()));
    }
}
