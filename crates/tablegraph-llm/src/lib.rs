//! Tablegraph LLM Provider Layer
//!
//! Pluggable text-generation backends behind the `TextGenerator` trait from
//! `tablegraph-domain`. The extractor calls them to reformat messy table markup
//! and to expand keywords into colloquial synonyms.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OllamaProvider`: Local Ollama API integration
//!
//! # Examples
//!
//! ```
//! use tablegraph_llm::MockProvider;
//! use tablegraph_domain::traits::TextGenerator;
//!
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.generate("test prompt").unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod ollama;

use std::sync::{Arc, Mutex, MutexGuard};
use tablegraph_domain::traits::TextGenerator;
use thiserror::Error;

pub use ollama::OllamaProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Error,
}

#[derive(Debug, Default)]
struct MockState {
    rules: Vec<(String, MockReply)>,
    prompts: Vec<String>,
    // prompts that arrived through generate_structured
    structured: Vec<String>,
}

/// Mock LLM provider for deterministic testing
///
/// Replies are chosen by the first registered rule whose needle occurs in the
/// prompt, falling back to the default response. Every prompt is recorded so
/// tests can assert on what was sent.
///
/// # Examples
///
/// ```
/// use tablegraph_llm::MockProvider;
/// use tablegraph_domain::traits::TextGenerator;
///
/// let mut provider = MockProvider::new("{}");
/// provider.add_response("reformat", "| a | b |");
/// provider.add_error("keywords");
///
/// assert_eq!(provider.generate("please reformat this").unwrap(), "| a | b |");
/// assert!(provider.generate("expand keywords").is_err());
/// assert_eq!(provider.generate("anything else").unwrap(), "{}");
/// assert_eq!(provider.call_count(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Reply with `response` to prompts containing `needle`
    pub fn add_response(&mut self, needle: impl Into<String>, response: impl Into<String>) {
        self.lock().rules.push((needle.into(), MockReply::Text(response.into())));
    }

    /// Fail prompts containing `needle`
    pub fn add_error(&mut self, needle: impl Into<String>) {
        self.lock().rules.push((needle.into(), MockReply::Error));
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        self.lock().prompts.len()
    }

    /// Reset the call count and the recorded prompts
    pub fn reset_call_count(&self) {
        let mut state = self.lock();
        state.prompts.clear();
        state.structured.clear();
    }

    /// Prompts received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.lock().prompts.clone()
    }

    /// Prompts received through `generate_structured`, in call order
    pub fn structured_prompts(&self) -> Vec<String> {
        self.lock().structured.clone()
    }

    fn reply(&self, prompt: &str, structured: bool) -> Result<String, LlmError> {
        let mut state = self.lock();
        state.prompts.push(prompt.to_string());
        if structured {
            state.structured.push(prompt.to_string());
        }

        let reply = state
            .rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone());

        match reply {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Error) => Err(LlmError::Other("Mock error".to_string())),
            None => Ok(self.default_response.clone()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // Poisoned by a panicking test; the state itself is still consistent
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl TextGenerator for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        self.reply(prompt, false)
    }

    fn generate_structured(&self, prompt: &str, _schema: &str) -> Result<String, Self::Error> {
        self.reply(prompt, true)
    }
}
