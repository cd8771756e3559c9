// src/analysis/model.rs
// =============================================================================
// The generative-language service seam.
//
// `GenerativeModel` is the one operation the analyzer needs: prompt in, text
// out. `GeminiClient` implements it against the Gemini REST API:
//
//   POST {base}/v1beta/models/{model}:generateContent?key={API_KEY}
//   { "contents": [ { "parts": [ { "text": "<prompt>" } ] } ] }
//
// and reads the text parts of the first candidate. The client is constructed
// once at startup and handed to the analyzer; there is no global instance.
// =============================================================================

use std::future::Future;
use std::pin::Pin;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no API key configured for the generative-language service")]
    MissingApiKey,
    #[error("cannot build request URL from {0}")]
    InvalidUrl(String),
    #[error("could not serialize the repository tree: {0}")]
    Prompt(#[from] serde_json::Error),
    #[error("request to the generative-language service failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("generative-language service returned HTTP {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Boxed future returned by [`GenerativeModel`], keeping the trait object-safe.
pub type ModelFuture<'a> = Pin<Box<dyn Future<Output = Result<String, AnalysisError>> + Send + 'a>>;

/// Produces text for a prompt.
pub trait GenerativeModel: Send + Sync {
    fn generate_content<'a>(&'a self, prompt: &'a str) -> ModelFuture<'a>;
}

pub struct GeminiClient {
    client: Client,
    api_base: Url,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(api_base: Url, model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_base,
            model: model.into(),
            api_key,
        }
    }

    fn endpoint(&self, api_key: &str) -> Result<Url, AnalysisError> {
        let method = format!("{}:generateContent", self.model);
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| AnalysisError::InvalidUrl(self.api_base.to_string()))?
            .pop_if_empty()
            .extend(["v1beta", "models", method.as_str()]);
        url.query_pairs_mut().append_pair("key", api_key);
        Ok(url)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl GenerativeModel for GeminiClient {
    fn generate_content<'a>(&'a self, prompt: &'a str) -> ModelFuture<'a> {
        Box::pin(async move {
            let api_key = self.api_key.as_deref().ok_or(AnalysisError::MissingApiKey)?;
            let url = self.endpoint(api_key)?;

            let body = GenerateRequest {
                contents: vec![RequestContent {
                    parts: vec![RequestPart { text: prompt }],
                }],
            };

            debug!(model = %self.model, prompt_len = prompt.len(), "requesting analysis");
            let response = self.client.post(url).json(&body).send().await?;

            let status = response.status();
            let text = response.text().await?;

            if !status.is_success() {
                let message = serde_json::from_str::<ErrorResponse>(&text)
                    .map(|e| e.error.message)
                    .unwrap_or(text);
                return Err(AnalysisError::Status { status, message });
            }

            let parsed: GenerateResponse = serde_json::from_str(&text)
                .map_err(|e| AnalysisError::Malformed(e.to_string()))?;

            let output: String = parsed
                .candidates
                .into_iter()
                .next()
                .and_then(|candidate| candidate.content)
                .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
                .unwrap_or_default();

            if output.is_empty() {
                return Err(AnalysisError::Malformed(
                    "response contained no candidate text".to_string(),
                ));
            }

            Ok(output)
        })
    }
}
