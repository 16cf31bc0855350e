//! LLM-backed entity/relation extractor for non-metric tables

use crate::config::PromptLanguage;
use crate::error::ExtractorError;
use crate::parser::{self, Triple};
use crate::prompt::PromptBuilder;
use std::fmt::Display;
use tablegraph_domain::traits::{GenericExtractor, TextGenerator};
use tablegraph_domain::{
    Edge, EdgeLabel, Graph, GraphBuilder, Node, NodeLabel, Properties, TableChunk,
};
use tracing::debug;

const TRIPLE_SCHEMA: &str = r#"{"type":"array","items":{"type":"object","required":["subject","predicate","object"],"properties":{"subject":{"type":"string"},"predicate":{"type":"string"},"object":{"type":"string"}}}}"#;

/// Generic extractor asking a text generator for subject/predicate/object triples
///
/// Every distinct subject or object becomes an `Entity` node; every triple a
/// `relation` edge carrying its predicate.
pub struct TripleExtractor<L> {
    llm: L,
    prompts: PromptBuilder,
}

impl<L> TripleExtractor<L>
where
    L: TextGenerator,
    L::Error: Display,
{
    /// Create an extractor with English prompts
    pub fn new(llm: L) -> Self {
        Self::with_language(llm, PromptLanguage::En)
    }

    /// Create an extractor writing prompts in `language`
    pub fn with_language(llm: L, language: PromptLanguage) -> Self {
        Self {
            llm,
            prompts: PromptBuilder::new(language),
        }
    }
}

impl<L> GenericExtractor for TripleExtractor<L>
where
    L: TextGenerator,
    L::Error: Display,
{
    type Error = ExtractorError;

    fn extract(&self, chunk: &TableChunk) -> Result<Vec<Graph>, ExtractorError> {
        let prompt = self.prompts.triples(&chunk.metadata.table_name, &chunk.content);
        let response = self
            .llm
            .generate_structured(&prompt, TRIPLE_SCHEMA)
            .map_err(|e| ExtractorError::Llm(e.to_string()))?;

        let triples = parser::parse_triples(&response)?;
        debug!("Chunk {} yielded {} triples", chunk.id, triples.len());
        if triples.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![triples_to_graph(&chunk.id, &triples)?])
    }
}

/// Build an entity graph from triples
pub fn triples_to_graph(source: &str, triples: &[Triple]) -> Result<Graph, ExtractorError> {
    let mut builder = GraphBuilder::new();
    for triple in triples {
        for entity in [&triple.subject, &triple.object] {
            builder.add_node(
                Node::new(entity.clone(), entity.clone(), NodeLabel::Entity)
                    .with_property("source", source),
            );
        }

        let mut properties = Properties::new();
        properties.insert("predicate".to_string(), triple.predicate.clone());
        let id = format!(
            "{}:{}",
            Edge::make_id(EdgeLabel::Relation, &triple.subject, &triple.object),
            triple.predicate
        );
        builder.add_edge_with_id(id, &triple.subject, &triple.object, EdgeLabel::Relation, properties)?;
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablegraph_domain::TableMetadata;
    use tablegraph_llm::MockProvider;

    fn chunk() -> TableChunk {
        TableChunk::new("| a | b |\n|---|---|\n| x | 1 |", TableMetadata::default()).with_id("c:chunk:0")
    }

    #[test]
    fn test_triples_become_entity_graph() {
        let llm = MockProvider::new(
            r#"[
                {"subject": "Acme", "predicate": "revenue 2024", "object": "12"},
                {"subject": "Acme", "predicate": "revenue 2023", "object": "12"},
                {"subject": "Acme", "predicate": "ceo", "object": "Alice"}
            ]"#,
        );
        let graphs = TripleExtractor::new(llm).extract(&chunk()).unwrap();

        assert_eq!(graphs.len(), 1);
        let graph = &graphs[0];
        assert_eq!(graph.nodes.len(), 3);
        assert!(graph.nodes.iter().all(|n| n.label == NodeLabel::Entity));
        assert_eq!(graph.node("Acme").and_then(|n| n.property("source")), Some("c:chunk:0"));

        // Same endpoints, different predicates stay distinct
        assert_eq!(graph.edges.len(), 3);
        assert!(graph.edges.iter().all(|e| e.label == EdgeLabel::Relation));
        assert_eq!(graph.edges[2].properties["predicate"], "ceo");
    }

    #[test]
    fn test_empty_answer_yields_no_graph() {
        let graphs = TripleExtractor::new(MockProvider::new("[]")).extract(&chunk()).unwrap();
        assert!(graphs.is_empty());
    }

    #[test]
    fn test_llm_failure_propagates() {
        let mut llm = MockProvider::new("[]");
        llm.add_error("task: table_triples");
        let result = TripleExtractor::new(llm).extract(&chunk());
        assert!(matches!(result, Err(ExtractorError::Llm(_))));
    }

    #[test]
    fn test_prompt_carries_chunk_text() {
        let llm = MockProvider::new("[]");
        let recorder = llm.clone();
        TripleExtractor::new(llm).extract(&chunk()).unwrap();
        assert!(recorder.prompts()[0].contains("| x | 1 |"));
    }
}
