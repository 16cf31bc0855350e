//! Tablegraph Domain Layer
//!
//! Core data model shared by every other crate: the table chunk handed in by a
//! document splitter, the keyword vocabulary, and the property graph emitted for
//! the knowledge store.
//!
//! ## Key Concepts
//!
//! - **TableChunk**: one table cut out of a larger document, with its metadata
//! - **TableKind**: closed classification resolved once at the dispatcher boundary
//! - **Keyword**: a scoped semantic label that becomes exactly one graph node
//! - **Graph**: the node/edge contribution of one table
//!
//! ## Architecture
//!
//! Infrastructure lives elsewhere. This crate only defines the value types and
//! the trait seams (`TextGenerator`, `GenericExtractor`) that the extractor
//! consumes.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod graph;
pub mod keyword;
pub mod table;
pub mod traits;

// Re-exports for convenience
pub use graph::{Edge, EdgeLabel, Graph, GraphBuilder, GraphError, Node, NodeLabel, Properties};
pub use keyword::{Keyword, KeywordScope};
pub use table::{TableChunk, TableInfo, TableKind, TableMetadata};
