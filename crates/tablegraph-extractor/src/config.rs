//! Configuration for the table extractor

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What to do when the keyword enrichment call fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Log and continue without colloquial expansions
    FailOpen,
    /// Abort the table's extraction
    FailClosed,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        FailurePolicy::FailOpen
    }
}

/// Language the prompts are written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptLanguage {
    /// English
    En,
    /// Simplified Chinese
    Zh,
}

impl Default for PromptLanguage {
    fn default() -> Self {
        PromptLanguage::En
    }
}

/// Configuration for the table extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Maximum time for a single collaborator call (seconds)
    pub llm_timeout_secs: u64,

    /// Maximum characters per chunk handed to the generic extractor
    pub chunk_budget: usize,

    /// Ask the LLM to clean up metric tables before the heuristic parse
    #[serde(default = "default_true")]
    pub use_llm_reformat: bool,

    /// Expand keywords into colloquial synonyms
    #[serde(default = "default_true")]
    pub enable_keyword_enrichment: bool,

    /// Behavior when keyword enrichment fails
    #[serde(default)]
    pub enrichment_failure: FailurePolicy,

    /// Prompt language
    #[serde(default)]
    pub language: PromptLanguage,
}

fn default_true() -> bool {
    true
}

impl ExtractorConfig {
    /// Get the collaborator timeout as a Duration
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.llm_timeout_secs == 0 {
            return Err("llm_timeout_secs must be greater than 0".to_string());
        }
        if self.chunk_budget == 0 {
            return Err("chunk_budget must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            llm_timeout_secs: 120,
            chunk_budget: 500,
            use_llm_reformat: true,
            enable_keyword_enrichment: true,
            enrichment_failure: FailurePolicy::FailOpen,
            language: PromptLanguage::En,
        }
    }
}

impl ExtractorConfig {
    /// Offline preset: heuristic parsing only, no keyword expansion
    pub fn offline() -> Self {
        Self {
            use_llm_reformat: false,
            enable_keyword_enrichment: false,
            ..Self::default()
        }
    }

    /// Strict preset: enrichment failures abort the table
    pub fn strict() -> Self {
        Self {
            enrichment_failure: FailurePolicy::FailClosed,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
