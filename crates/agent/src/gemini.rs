//! Gemini `generateContent` client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::llm::{ClassifierError, LlmClient};

pub struct GeminiClient {
    client: Client,
    endpoint: String,
    api_key: SecretString,
}

impl GeminiClient {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        let endpoint =
            format!("{}/models/{}:generateContent", base_url.trim_end_matches('/'), model.trim());
        Ok(Self { client, endpoint, api_key })
    }
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiTextPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiTextPart {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
}

fn request_error(error: reqwest::Error) -> ClassifierError {
    if error.is_timeout() {
        ClassifierError::Timeout
    } else if error.is_decode() {
        ClassifierError::MalformedBody(error.to_string())
    } else {
        ClassifierError::Transport(error.to_string())
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, prompt: &str, context: Option<&str>) -> Result<String, ClassifierError> {
        let parts = vec![
            GeminiTextPart { text: prompt.to_string() },
            GeminiTextPart { text: context.unwrap_or_default().to_string() },
        ];
        let body = GenerateContentRequest { contents: vec![GeminiContent { parts }] };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ClassifierError::Status(status.as_u16()));
        }

        let payload: GenerateContentResponse = response.json().await.map_err(request_error)?;
        payload
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .and_then(|part| part.text)
            .map(|text| text.trim().to_string())
            .ok_or_else(|| {
                ClassifierError::MalformedBody(
                    "missing candidates[0].content.parts[0].text".to_string(),
                )
            })
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}
