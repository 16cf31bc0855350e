//! Tablegraph Extractor
//!
//! Converts one semi-structured table into a typed property graph.
//!
//! # Overview
//!
//! Tables cut from larger documents arrive as [`TableChunk`]s carrying a
//! free-text classification. Metric tables, whose cells are measurements under
//! row and column dimensions, get the full pipeline; every other table is
//! chunked and handed to a generic entity/relation extractor.
//!
//! # Architecture
//!
//! ```text
//! TableChunk → TableExtractor ─ metric ─→ normalizer → describer + subitem
//!                    │                  → keyword enrichment → GraphAssembler → Graph
//!                    └─ simple/other ─→ TableChunker → GenericExtractor → Graph per chunk
//! ```
//!
//! # Key Features
//!
//! - **Header recovery**: LLM reformat with heuristic fallback, multi-level headers
//! - **Cell descriptions**: row, section and column context for every value
//! - **Sub-items**: parent/child rows from hyphen indentation
//! - **Keyword registry**: one node per scope-qualified label
//! - **Colloquial expansion**: at most two informal phrasings per keyword
//!
//! # Example Usage
//!
//! ```no_run
//! use tablegraph_domain::{TableChunk, TableInfo, TableMetadata};
//! use tablegraph_extractor::{ExtractorConfig, TableExtractor, TripleExtractor};
//! use tablegraph_llm::OllamaProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = OllamaProvider::new("http://localhost:11434", "llama3")?;
//! let generic = TripleExtractor::new(OllamaProvider::new("http://localhost:11434", "llama3")?);
//! let extractor = TableExtractor::new(llm, generic, ExtractorConfig::default())?;
//!
//! let metadata = TableMetadata {
//!     table_type: "Metric_Based_Table".to_string(),
//!     table_info: Some(TableInfo {
//!         header: vec![0],
//!         index_col: vec![0],
//!         ..Default::default()
//!     }),
//!     table_name: "Income".to_string(),
//!     ..Default::default()
//! };
//! let chunk = TableChunk::new("| | 2024 |\n|---|---|\n| Revenue | 12 |", metadata);
//!
//! let graphs = extractor.extract(chunk).await?;
//! println!("{} nodes", graphs[0].nodes.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod assembler;
mod chunking;
mod config;
mod describer;
mod error;
mod extractor;
mod generic;
mod keywords;
mod markup;
mod normalizer;
mod parser;
mod prompt;
mod subitem;
mod types;


pub use assembler::GraphAssembler;
pub use chunking::TableChunker;
pub use config::{ExtractorConfig, FailurePolicy, PromptLanguage};
pub use describer::{describe_cells, is_placeholder_value, value_suffix, DescribeContext};
pub use error::ExtractorError;
pub use extractor::TableExtractor;
pub use generic::{triples_to_graph, TripleExtractor};
pub use keywords::{KeywordEnricher, KeywordRegistry};
pub use markup::{parse_table, RawGrid};
pub use normalizer::{canonicalize, from_reformatted, heuristic, normalize_grid};
pub use parser::{KeywordExpansions, Triple, MAX_COLLOQUIAL};
pub use prompt::{PromptBuilder, KEYWORD_TASK, REFORMAT_TASK, TRIPLE_TASK};
pub use subitem::{extract_subitems, indent_level, reconcile};
pub use types::{CellInfo, NormalizedTable, SplitKeywords, SubItemRelation, TableCell};
