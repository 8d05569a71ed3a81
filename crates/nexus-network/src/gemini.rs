//! `generateContent` client for Gemini-compatible completion endpoints.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use nexus_contracts::error::{NexusError, NexusResult};
use nexus_core::traits::{CompletionClient, CompletionRequest};

use crate::alex::AlexConfig;

// -- Wire types --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    status: String,
    message: String,
}

impl<'a> GenerateRequest<'a> {
    fn from_completion(request: &'a CompletionRequest) -> Self {
        let system_instruction = (!request.system_instruction.is_empty()).then(|| Content {
            role: None,
            parts: vec![Part { text: &request.system_instruction }],
        });
        Self {
            system_instruction,
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: &request.prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
            },
        }
    }
}

impl GenerateResponse {
    /// Text of the first candidate, parts concatenated. Empty when the
    /// service returned no text.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// HTTP completion client for the Gemini `generateContent` API.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, config: &AlexConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, request: &CompletionRequest) -> NexusResult<String> {
        let body = GenerateRequest::from_completion(request);
        debug!(model = %self.model, prompt_len = request.prompt.len(), "sending completion request");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| NexusError::CompletionFailed {
                reason: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let reason = match serde_json::from_str::<ErrorResponse>(&text) {
                Ok(err) => format!("Gemini API error ({}): {}", err.error.status, err.error.message),
                Err(_) => format!("Gemini API error (HTTP {status}): {text}"),
            };
            return Err(NexusError::CompletionFailed { reason });
        }

        let parsed: GenerateResponse =
            response.json().await.map_err(|e| NexusError::CompletionFailed {
                reason: format!("failed to parse response: {e}"),
            })?;
        Ok(parsed.text())
    }
}
