//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::{Formatter, Outcome};
use std::fmt::Display;
use tablegraph_domain::traits::{GenericExtractor, TextGenerator};
use tablegraph_domain::{Graph, TableChunk, TableKind};
use tablegraph_extractor::{TableExtractor, TripleExtractor};
use tablegraph_llm::OllamaProvider;
use tracing::{info, warn};

/// Execute the extract command.
pub fn execute_extract(args: ExtractArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let chunks = super::read_chunks(&args.file)?;

    let mut extractor_config = config.extractor.clone();
    if args.offline {
        extractor_config.use_llm_reformat = false;
        extractor_config.enable_keyword_enrichment = false;
    }

    let provider = || -> Result<OllamaProvider> {
        Ok(OllamaProvider::new(&config.llm.endpoint, &config.llm.model)?
            .with_max_retries(config.llm.max_retries))
    };
    let generic = TripleExtractor::with_language(provider()?, extractor_config.language);
    let extractor = TableExtractor::new(provider()?, generic, extractor_config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let outcomes = runtime.block_on(extract_all(&extractor, chunks, args.offline));
    // Shut down before the extractor (and its HTTP clients) is dropped
    drop(runtime);

    println!("{}", formatter.format_extraction(&outcomes)?);

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    let summary = format!("Processed {} table(s), {} failed", outcomes.len(), failed);
    if failed == 0 {
        eprintln!("{}", formatter.success(&summary));
    } else {
        eprintln!("{}", formatter.warning(&summary));
    }
    Ok(())
}

/// Extract every chunk in order; a failing table is recorded and the batch continues.
pub async fn extract_all<L, G>(
    extractor: &TableExtractor<L, G>,
    chunks: Vec<TableChunk>,
    offline: bool,
) -> Vec<Outcome<Vec<Graph>>>
where
    L: TextGenerator + Send + Sync + 'static,
    L::Error: Display,
    G: GenericExtractor + Send + Sync + 'static,
    G::Error: Display,
{
    let mut outcomes = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let table = chunk.id.clone();

        if offline && chunk.metadata.kind() != TableKind::Metric {
            warn!("Skipping {} table {} in offline mode", chunk.metadata.kind(), table);
            outcomes.push(Outcome {
                table,
                result: Err("skipped: non-metric tables need a model".to_string()),
            });
            continue;
        }

        let result = extractor.extract(chunk).await.map_err(|e| {
            warn!("Extraction of table {} failed: {}", table, e);
            e.to_string()
        });
        if let Ok(graphs) = &result {
            info!("Table {} produced {} graph(s)", table, graphs.len());
        }
        outcomes.push(Outcome { table, result });
    }
    outcomes
}
