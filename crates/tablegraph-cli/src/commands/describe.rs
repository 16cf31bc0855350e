//! Describe command implementation.

use crate::cli::DescribeArgs;
use crate::error::Result;
use crate::output::{Formatter, Outcome};
use tablegraph_domain::TableChunk;
use tablegraph_extractor::{describe_cells, heuristic, CellInfo, DescribeContext};
use tracing::warn;

/// Execute the describe command.
pub fn execute_describe(args: DescribeArgs, formatter: &Formatter) -> Result<()> {
    let chunks = super::read_chunks(&args.file)?;

    let outcomes: Vec<Outcome<CellInfo>> = chunks
        .iter()
        .map(|chunk| Outcome {
            table: chunk.id.clone(),
            result: describe_chunk(chunk).map_err(|e| {
                warn!("Could not describe table {}: {}", chunk.id, e);
                e.to_string()
            }),
        })
        .collect();

    println!("{}", formatter.format_descriptions(&outcomes)?);
    Ok(())
}

/// Heuristically normalize a chunk and describe its cells.
pub fn describe_chunk(chunk: &TableChunk) -> Result<CellInfo> {
    let table = heuristic(chunk)?;
    let table_info = chunk.metadata.table_info.as_ref();
    let ctx = DescribeContext {
        table_name: &chunk.metadata.table_name,
        scale: table_info.and_then(|t| t.scale.as_deref()),
        unit: table_info.and_then(|t| t.units.as_deref()),
    };
    Ok(describe_cells(&table, &ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use tablegraph_domain::{TableInfo, TableMetadata};

    #[test]
    fn test_describe_chunk() {
        let metadata = TableMetadata {
            table_type: "metric".to_string(),
            table_info: Some(TableInfo {
                header: vec![0],
                index_col: vec![0],
                scale: Some("万".to_string()),
                units: Some("元".to_string()),
            }),
            table_name: "Income".to_string(),
            ..Default::default()
        };
        let chunk = TableChunk::new("| | 2024 |\n|---|---|\n| Revenue | 12 |", metadata);

        let info = describe_chunk(&chunk).unwrap();
        assert_eq!(info.cells.len(), 1);
        assert_eq!(
            info.cells[0].description,
            "[Income]cell[1-1] shows Revenue of 2024 is 12(万,元)"
        );
    }

    #[test]
    fn test_describe_unparseable_chunk() {
        let chunk = TableChunk::new("no table", TableMetadata::default());
        assert!(matches!(describe_chunk(&chunk), Err(CliError::Extractor(_))));
    }
}
