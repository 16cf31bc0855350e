//! Ollama Provider Implementation
//!
//! Provides integration with Ollama's local LLM API. Table reformatting and
//! keyword expansion are short prompts, so a blocking client is used and the
//! caller wraps each call in its own timeout.
//!
//! # Examples
//!
//! ```no_run
//! use tablegraph_llm::OllamaProvider;
//! use tablegraph_domain::traits::TextGenerator;
//!
//! let provider = OllamaProvider::new("http://localhost:11434", "qwen2.5").unwrap();
//! let reply = provider.generate("Say hello").unwrap();
//! ```

use crate::LlmError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tablegraph_domain::traits::TextGenerator;
use tracing::{debug, warn};

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for LLM requests (120 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default number of attempts per request
pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// Ollama API provider for local LLM inference
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    client: reqwest::blocking::Client,
    max_retries: u32,
}

/// Request body for Ollama generate API
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>,
}

/// Response from Ollama generate API
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "qwen2.5", "llama3")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::Communication(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Create a new Ollama provider on `http://localhost:11434`
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Set the maximum number of attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Model name this provider talks to
    pub fn model(&self) -> &str {
        &self.model
    }

    fn request(&self, prompt: &str, format: Option<&str>) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.endpoint);
        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            format,
        };

        let mut last_error = None;
        for attempt in 1..=self.max_retries {
            debug!("Ollama request attempt {}/{}", attempt, self.max_retries);
            match self.client.post(&url).json(&body).send() {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response
                            .json::<OllamaGenerateResponse>()
                            .map(|r| r.response)
                            .map_err(|e| {
                                LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                            });
                    }
                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(LlmError::ModelNotAvailable(self.model.clone()));
                    }
                    let error_text = response
                        .text()
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    last_error = Some(LlmError::Communication(format!(
                        "HTTP {}: {}",
                        status, error_text
                    )));
                }
                Err(e) => {
                    last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
                }
            }
            if attempt < self.max_retries {
                warn!("Ollama request failed, retrying");
                std::thread::sleep(Duration::from_secs(1 << (attempt - 1)));
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }
}

impl TextGenerator for OllamaProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        self.request(prompt, None)
    }

    fn generate_structured(&self, prompt: &str, _schema: &str) -> Result<String, Self::Error> {
        // Ollama's JSON mode; the schema itself is spelled out in the prompt
        self.request(prompt, Some("json"))
    }
}
