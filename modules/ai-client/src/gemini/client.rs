use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use tracing::debug;

use super::types::*;
use crate::error::{AiError, Result};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub(crate) struct GeminiClient {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            http,
            base_url: GEMINI_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| AiError::Config(format!("invalid API key header: {e}")))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    pub async fn generate(&self, model: &str, request: &GenerateRequest) -> Result<GenerateResponse> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        debug!(model, "Gemini generate request");

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AiError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        Ok(response.json().await?)
    }
}
