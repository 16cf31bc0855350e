//! Trait definitions for external collaborators
//!
//! These traits define the boundaries between table extraction and
//! infrastructure. Implementations live in other crates.

use crate::{Graph, TableChunk};

/// Trait for text-generation services
///
/// Implemented by the infrastructure layer (tablegraph-llm). Calls are
/// blocking; the extractor puts its own timeout around them.
pub trait TextGenerator {
    /// Error type for generation
    type Error;

    /// Generate a free-text completion
    fn generate(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Generate output constrained to JSON (if supported)
    fn generate_structured(&self, prompt: &str, schema: &str) -> Result<String, Self::Error>;
}

/// Trait for the generic entity/relation extractor used for non-metric tables
///
/// One call receives one bounded-size chunk and may return several graphs.
pub trait GenericExtractor {
    /// Error type for extraction
    type Error;

    /// Extract graphs from a chunk of table text
    fn extract(&self, chunk: &TableChunk) -> Result<Vec<Graph>, Self::Error>;
}
