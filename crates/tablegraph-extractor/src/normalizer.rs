//! Table normalization: raw markup → grid with resolved headers and index
//!
//! Two entry points mirror the two strategies the extractor tries for metric
//! tables: [`from_reformatted`] for clean markdown returned by the reformat
//! prompt (header = first row, index = first column) and [`heuristic`] for the
//! original markup with the detector's header/index hints. Neither touches the
//! chunk; [`canonicalize`] swaps in the canonical renderings once a grid exists.

use crate::error::ExtractorError;
use crate::markup::{self, RawGrid};
use crate::types::NormalizedTable;
use tablegraph_domain::{TableChunk, TableInfo};
use tracing::debug;

/// Build a grid from LLM-reformatted markdown
pub fn from_reformatted(llm_output: &str) -> Result<NormalizedTable, ExtractorError> {
    let grid = markup::parse_table(markup::strip_code_fence(llm_output))?;
    normalize_grid(&grid, &[0], &[0])
}

/// Build a grid from the chunk's original markup using the detector hints
///
/// Missing hints mean "no header row" and "no index column".
pub fn heuristic(chunk: &TableChunk) -> Result<NormalizedTable, ExtractorError> {
    let (header, index_col) = match chunk.metadata.table_info.as_ref() {
        Some(TableInfo { header, index_col, .. }) => (header.as_slice(), index_col.as_slice()),
        None => (&[][..], &[][..]),
    };
    let grid = markup::parse_table(chunk.raw_markup())?;
    normalize_grid(&grid, header, index_col)
}

/// Replace the chunk's markup with the canonical markdown and CSV renderings
pub fn canonicalize(
    mut chunk: TableChunk,
    table: &NormalizedTable,
) -> Result<TableChunk, ExtractorError> {
    chunk.csv = Some(table.to_csv()?);
    chunk.content = table.to_markdown();
    chunk.html = None;
    Ok(chunk)
}

/// Resolve header rows and index columns of a raw grid
///
/// Every row must be as wide as the first; a ragged grid is a `TableParse` error.
pub fn normalize_grid(
    grid: &RawGrid,
    header: &[usize],
    index_col: &[usize],
) -> Result<NormalizedTable, ExtractorError> {
    let width = grid.first().map(Vec::len).unwrap_or(0);
    if width == 0 {
        return Err(ExtractorError::TableParse("empty table".to_string()));
    }
    if let Some((r, row)) = grid.iter().enumerate().find(|(_, row)| row.len() != width) {
        return Err(ExtractorError::TableParse(format!(
            "row {} has {} columns, expected {}",
            r,
            row.len(),
            width
        )));
    }

    let header = sorted_unique(header);
    if let Some(&h) = header.iter().find(|&&h| h >= grid.len()) {
        return Err(ExtractorError::TableParse(format!(
            "header row {} out of range ({} rows)",
            h,
            grid.len()
        )));
    }

    let index_col = sorted_unique(index_col);
    if let Some(&c) = index_col.iter().find(|&&c| c >= width) {
        return Err(ExtractorError::TableParse(format!(
            "index column {} out of range ({} columns)",
            c, width
        )));
    }

    let data_columns: Vec<usize> = (0..width).filter(|c| !index_col.contains(c)).collect();
    if data_columns.is_empty() {
        return Err(ExtractorError::TableParse("table has no data columns".to_string()));
    }

    let columns = data_columns
        .iter()
        .map(|&c| header.iter().map(|&h| grid[h][c].clone()).collect())
        .collect();

    let index_header = header
        .iter()
        .map(|&h| join_labels(index_col.iter().map(|&c| grid[h][c].as_str())))
        .collect();

    // Rows above the last header row that are not header rows are dropped
    let data_start = header.last().map(|h| h + 1).unwrap_or(0);
    let data_rows = &grid[data_start.min(grid.len())..];

    let row_labels = data_rows
        .iter()
        .enumerate()
        .map(|(ordinal, row)| {
            if index_col.is_empty() {
                return Some(ordinal.to_string());
            }
            let label = join_labels(index_col.iter().map(|&c| row[c].as_str()));
            (!label.is_empty()).then_some(label)
        })
        .collect();

    let rows = data_rows
        .iter()
        .map(|row| data_columns.iter().map(|&c| row[c].clone()).collect())
        .collect();

    let table = NormalizedTable {
        header_levels: header.len(),
        index_header,
        columns,
        row_labels,
        rows,
    };
    debug!(
        "Normalized table: {} header level(s), {} rows x {} columns",
        table.header_levels,
        table.row_count(),
        table.column_count()
    );
    Ok(table)
}

fn sorted_unique(values: &[usize]) -> Vec<usize> {
    let mut values = values.to_vec();
    values.sort_unstable();
    values.dedup();
    values
}

fn join_labels<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
