//! Model client collaborator: the one outbound call of the pipeline.
//!
//! The core treats the hosted model as `send(prompt, parts) -> raw text`.
//! Transport errors are surfaced unchanged to the caller; the core never
//! retries.

use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::BinaryPart;

/// Transport failures from the model endpoint.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("model endpoint unreachable at {0}")]
    Unavailable(String),

    #[error("rate limited by model endpoint")]
    RateLimited,

    #[error("authentication rejected by model endpoint")]
    Authentication,

    #[error("model endpoint returned status {status}: {body}")]
    Endpoint { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("malformed response envelope: {0}")]
    Envelope(String),
}

/// Hosted LLM abstraction (allows mocking).
pub trait ModelClient {
    /// Send one prompt with optional binary parts, blocking until the model
    /// replies with raw text.
    fn send(&self, prompt: &str, parts: &[BinaryPart]) -> Result<String, ModelError>;
}

/// Blocking HTTP client for the hosted generateContent API.
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, ModelError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ModelError::Http(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        })
    }

    /// Hosted endpoint with a 5-minute timeout.
    pub fn hosted(api_key: &str, model: &str) -> Result<Self, ModelError> {
        Self::new(
            "https://generativelanguage.googleapis.com",
            api_key,
            model,
            300,
        )
    }

    fn endpoint_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
enum RequestPart<'a> {
    #[serde(rename = "text")]
    Text(&'a str),
    #[serde(rename = "inlineData")]
    InlineData {
        #[serde(rename = "mimeType")]
        mime_type: String,
        data: String,
    },
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Map a non-success HTTP status to the matching transport error.
fn classify_status(status: u16, body: String) -> ModelError {
    match status {
        429 => ModelError::RateLimited,
        401 | 403 => ModelError::Authentication,
        _ => ModelError::Endpoint { status, body },
    }
}

impl ModelClient for GeminiClient {
    fn send(&self, prompt: &str, parts: &[BinaryPart]) -> Result<String, ModelError> {
        let mut request_parts = vec![RequestPart::Text(prompt)];
        for part in parts {
            request_parts.push(RequestPart::InlineData {
                mime_type: part.mime_type.clone(),
                data: base64::engine::general_purpose::STANDARD.encode(&part.data),
            });
        }

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: request_parts,
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        let response = self
            .client
            .post(self.endpoint_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    ModelError::Unavailable(self.base_url.clone())
                } else if e.is_timeout() {
                    ModelError::Http(format!("request timed out after {}s", self.timeout_secs))
                } else {
                    ModelError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(classify_status(status.as_u16(), body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|e| ModelError::Envelope(e.to_string()))?;

        let text: String = parsed
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .map(|parts| {
                parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ModelError::Envelope("no candidate text in response".into()));
        }
        Ok(text)
    }
}

/// Mock model client for testing — returns a configurable response.
pub struct MockModelClient {
    response: String,
}

impl MockModelClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
        }
    }
}

impl ModelClient for MockModelClient {
    fn send(&self, _prompt: &str, _parts: &[BinaryPart]) -> Result<String, ModelError> {
        Ok(self.response.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_client_returns_configured_response() {
        let client = MockModelClient::new("{\"plan\": \"\"}");
        let result = client.send("prompt", &[]).unwrap();
        assert_eq!(result, "{\"plan\": \"\"}");
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = GeminiClient::new("http://localhost:8080/", "key", "gemini-2.5-flash", 60)
            .unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
        assert_eq!(
            client.endpoint_url(),
            "http://localhost:8080/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn rate_limit_status_maps_to_rate_limited() {
        assert!(matches!(
            classify_status(429, String::new()),
            ModelError::RateLimited
        ));
    }

    #[test]
    fn auth_statuses_map_to_authentication() {
        assert!(matches!(
            classify_status(401, String::new()),
            ModelError::Authentication
        ));
        assert!(matches!(
            classify_status(403, String::new()),
            ModelError::Authentication
        ));
    }

    #[test]
    fn other_statuses_carry_body() {
        let err = classify_status(500, "boom".into());
        match err {
            ModelError::Endpoint { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected Endpoint, got {other:?}"),
        }
    }

    #[test]
    fn inline_data_serializes_with_api_field_names() {
        let part = RequestPart::InlineData {
            mime_type: "image/png".into(),
            data: "AAAA".into(),
        };
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"inlineData": {"mimeType": "image/png", "data": "AAAA"}})
        );
    }
}
