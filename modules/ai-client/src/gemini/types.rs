use serde::{Deserialize, Serialize};

// =============================================================================
// Request
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub(crate) struct GenerateRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateRequest {
    pub fn user(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.into()),
                }],
            }],
            generation_config: None,
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.generation_config = Some(GenerationConfig {
            temperature: Some(temperature),
        });
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

// =============================================================================
// Response
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Candidate {
    pub content: Option<Content>,
    #[serde(rename = "finishReason")]
    pub finish_reason: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate, if there are any.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_generation_config() {
        let request = GenerateRequest::user("hi").temperature(0.2);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");
        assert!((value["generationConfig"]["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn response_text_joins_parts_of_first_candidate() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "role": "model", "parts": [{ "text": "POSI" }, { "text": "TIVE" }] } },
                { "content": { "role": "model", "parts": [{ "text": "ignored" }] } }
            ]
        }))
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("POSITIVE"));
    }

    #[test]
    fn blocked_response_has_no_text() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        }))
        .unwrap();
        assert_eq!(response.text(), None);

        let empty: GenerateResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.text(), None);
    }
}
