//! Table extractor: classifies a table and routes it to the right pipeline

use crate::assembler::GraphAssembler;
use crate::chunking::TableChunker;
use crate::config::{ExtractorConfig, FailurePolicy};
use crate::describer::{describe_cells, DescribeContext};
use crate::error::ExtractorError;
use crate::keywords::{KeywordEnricher, EXPANSION_SCHEMA};
use crate::normalizer;
use crate::prompt::PromptBuilder;
use crate::subitem;
use crate::types::{CellInfo, NormalizedTable};
use std::fmt::Display;
use std::sync::Arc;
use tablegraph_domain::traits::{GenericExtractor, TextGenerator};
use tablegraph_domain::{Graph, TableChunk, TableKind};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Converts table chunks into property graphs
///
/// Metric tables go through normalization, cell description, sub-item
/// detection, keyword enrichment and assembly, yielding exactly one graph.
/// Every other table is split into bounded chunks and handed to the generic
/// extractor, yielding one graph per successful chunk.
///
/// Each call to [`TableExtractor::extract`] owns its grid, registry and graph
/// builder; one extractor can serve concurrent calls.
pub struct TableExtractor<L, G> {
    llm: Arc<L>,
    generic: Arc<G>,
    config: ExtractorConfig,
    prompts: PromptBuilder,
}

impl<L, G> TableExtractor<L, G>
where
    L: TextGenerator + Send + Sync + 'static,
    L::Error: Display,
    G: GenericExtractor + Send + Sync + 'static,
    G::Error: Display,
{
    /// Create a new TableExtractor
    pub fn new(llm: L, generic: G, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        Ok(Self {
            llm: Arc::new(llm),
            generic: Arc::new(generic),
            prompts: PromptBuilder::new(config.language),
            config,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract the graphs of one table
    pub async fn extract(&self, chunk: TableChunk) -> Result<Vec<Graph>, ExtractorError> {
        let kind = chunk.metadata.kind();
        info!(
            "Extracting table '{}' ({}) as {}",
            chunk.metadata.table_name, chunk.id, kind
        );

        match kind {
            TableKind::Metric => self.extract_metric(chunk).await,
            TableKind::Simple | TableKind::Other => self.extract_generic(chunk).await,
        }
    }

    /// Metric pipeline; returns one graph, or none when the table cannot be parsed
    async fn extract_metric(&self, chunk: TableChunk) -> Result<Vec<Graph>, ExtractorError> {
        let Some(table) = self.normalize(&chunk).await else {
            warn!(
                "Abandoning table '{}' ({}): markup could not be parsed",
                chunk.metadata.table_name, chunk.id
            );
            return Ok(Vec::new());
        };
        let chunk = normalizer::canonicalize(chunk, &table)?;

        let table_info = chunk.metadata.table_info.as_ref();
        let ctx = DescribeContext {
            table_name: &chunk.metadata.table_name,
            scale: table_info.and_then(|t| t.scale.as_deref()),
            unit: table_info.and_then(|t| t.units.as_deref()),
        };
        let mut info = describe_cells(&table, &ctx);
        let relations = subitem::reconcile(&table, &info);
        info!(
            "Described {} cells and {} sub-item relations",
            info.cells.len(),
            relations.len()
        );

        if self.config.enable_keyword_enrichment {
            self.enrich(&mut info).await?;
        }

        let graph = GraphAssembler::new(&chunk, &info).assemble(&relations)?;
        info!(
            "Metric graph for '{}': {} nodes, {} edges",
            info.table_name,
            graph.nodes.len(),
            graph.edges.len()
        );
        Ok(vec![graph])
    }

    /// Reformat with the LLM, falling back to the heuristic parse
    async fn normalize(&self, chunk: &TableChunk) -> Option<NormalizedTable> {
        if self.config.use_llm_reformat {
            let prompt = self.prompts.reformat(&chunk.metadata.table_name, &chunk.content);
            let reformatted = match self.call_llm(prompt, None).await {
                Ok(output) => normalizer::from_reformatted(&output),
                Err(e) => Err(e),
            };
            match reformatted {
                Ok(table) => {
                    debug!("Normalized table {} from LLM reformat", chunk.id);
                    return Some(table);
                }
                Err(e) => warn!("LLM reformat failed, using heuristic parse: {}", e),
            }
        }

        match normalizer::heuristic(chunk) {
            Ok(table) => {
                debug!("Normalized table {} heuristically", chunk.id);
                Some(table)
            }
            Err(e) => {
                warn!("Heuristic parse failed for table {}: {}", chunk.id, e);
                None
            }
        }
    }

    /// Expand keywords into colloquial phrasings per the failure policy
    async fn enrich(&self, info: &mut CellInfo) -> Result<(), ExtractorError> {
        let enricher = KeywordEnricher::new(self.config.language);
        let keyword_count = KeywordEnricher::keyword_set(info).len();
        debug!("Requesting expansions for {} keywords", keyword_count);

        let parsed = match self.call_llm(enricher.prompt(info), Some(EXPANSION_SCHEMA)).await {
            Ok(response) => enricher.parse(&response, info),
            Err(e) => Err(e),
        };

        match (parsed, self.config.enrichment_failure) {
            (Ok(expansions), _) => {
                KeywordEnricher::apply(info, expansions);
                Ok(())
            }
            (Err(e), FailurePolicy::FailOpen) => {
                warn!("Keyword enrichment failed, continuing without colloquial keywords: {}", e);
                Ok(())
            }
            (Err(e), FailurePolicy::FailClosed) => Err(e),
        }
    }

    /// Generic pipeline; returns one graph per successful chunk
    async fn extract_generic(&self, mut chunk: TableChunk) -> Result<Vec<Graph>, ExtractorError> {
        let has_hints = chunk
            .metadata
            .table_info
            .as_ref()
            .is_some_and(|t| !t.header.is_empty() && !t.index_col.is_empty());
        if has_hints {
            match normalizer::heuristic(&chunk) {
                Ok(table) => chunk = normalizer::canonicalize(chunk, &table)?,
                Err(e) => debug!("Keeping original markup of {}: {}", chunk.id, e),
            }
        }

        let texts = TableChunker::new(self.config.chunk_budget).chunk(&chunk.content);
        info!("Split table {} into {} chunks", chunk.id, texts.len());

        let mut graphs = Vec::new();
        for (idx, text) in texts.into_iter().enumerate() {
            let piece = TableChunk {
                id: format!("{}:chunk:{}", chunk.id, idx),
                name: chunk.name.clone(),
                content: text,
                html: None,
                csv: None,
                metadata: chunk.metadata.clone(),
            };

            match self.call_generic(piece).await {
                Ok(found) => graphs.extend(found),
                Err(e) => warn!("Chunk {} of table {} failed: {}", idx, chunk.id, e),
            }
        }

        info!("Generic extraction of {} produced {} graphs", chunk.id, graphs.len());
        Ok(graphs)
    }

    /// Call the text generator off the async runtime, bounded by the timeout
    ///
    /// With a schema the call goes through `generate_structured`.
    async fn call_llm(
        &self,
        prompt: String,
        schema: Option<&'static str>,
    ) -> Result<String, ExtractorError> {
        let llm = Arc::clone(&self.llm);
        let task = tokio::task::spawn_blocking(move || {
            match schema {
                Some(schema) => llm.generate_structured(&prompt, schema),
                None => llm.generate(&prompt),
            }
            .map_err(|e| ExtractorError::Llm(e.to_string()))
        });

        timeout(self.config.llm_timeout(), task)
            .await
            .map_err(|_| ExtractorError::Timeout)?
            .map_err(|e| ExtractorError::Llm(format!("Task join error: {}", e)))?
    }

    /// Call the generic extractor off the async runtime, bounded by the timeout
    async fn call_generic(&self, chunk: TableChunk) -> Result<Vec<Graph>, ExtractorError> {
        let generic = Arc::clone(&self.generic);
        let task = tokio::task::spawn_blocking(move || {
            generic
                .extract(&chunk)
                .map_err(|e| ExtractorError::GenericExtraction(e.to_string()))
        });

        timeout(self.config.llm_timeout(), task)
            .await
            .map_err(|_| ExtractorError::Timeout)?
            .map_err(|e| ExtractorError::GenericExtraction(format!("Task join error: {}", e)))?
    }
}
