//! Error types for table extraction

use tablegraph_domain::GraphError;
use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Text-generation provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// A collaborator call exceeded the configured timeout
    #[error("Extraction timeout")]
    Timeout,

    /// LLM response did not have the expected shape
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Table markup could not be turned into a grid
    #[error("Table parse error: {0}")]
    TableParse(String),

    /// Graph invariant violated during assembly
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// Generic extractor collaborator failed
    #[error("Generic extraction error: {0}")]
    GenericExtraction(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}

impl From<csv::Error> for ExtractorError {
    fn from(e: csv::Error) -> Self {
        ExtractorError::TableParse(format!("CSV export failed: {}", e))
    }
}
