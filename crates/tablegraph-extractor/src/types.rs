//! Intermediate types flowing between pipeline stages

use crate::error::ExtractorError;
use std::collections::{BTreeMap, BTreeSet};

/// Row context label used when a row has no label
pub const TOTAL_LABEL: &str = "total";

/// Relation name emitted for nested row labels
pub const CONTAINS: &str = "contains";

/// Split keyword → colloquial variants (at most two after enrichment)
pub type SplitKeywords = BTreeMap<String, Vec<String>>;

/// A table grid with resolved header levels and index column
///
/// Immutable once produced by the normalizer. `columns[j][level]` is the label
/// of data column `j` at header `level`; `rows[i][j]` is the cell text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedTable {
    /// Number of stacked header rows
    pub header_levels: usize,

    /// Header labels of the index column, one per level
    pub index_header: Vec<String>,

    /// Data column labels, one vector of levels per column
    pub columns: Vec<Vec<String>>,

    /// Row label per data row; `None` when the index cell was blank
    pub row_labels: Vec<Option<String>>,

    /// Data cells, already trimmed with blanks as ""
    pub rows: Vec<Vec<String>>,
}

impl NormalizedTable {
    /// Number of data rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of data columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Cell text
    pub fn value(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Column label at a header level ("" when absent)
    pub fn column_label(&self, column: usize, level: usize) -> &str {
        self.columns
            .get(column)
            .and_then(|levels| levels.get(level))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Row label rendered as text, `total` when blank
    pub fn row_label_text(&self, row: usize) -> &str {
        self.row_labels
            .get(row)
            .and_then(|l| l.as_deref())
            .unwrap_or(TOTAL_LABEL)
    }

    /// Whether every cell of the row is empty
    pub fn is_blank_row(&self, row: usize) -> bool {
        self.rows
            .get(row)
            .map(|r| r.iter().all(|v| v.is_empty()))
            .unwrap_or(false)
    }

    /// Column label with all non-empty levels joined
    fn joined_column_label(&self, column: usize) -> String {
        let mut parts: Vec<&str> = Vec::new();
        for level in 0..self.header_levels {
            let label = self.column_label(column, level);
            if !label.is_empty() && parts.last() != Some(&label) {
                parts.push(label);
            }
        }
        parts.join(" / ")
    }

    /// Canonical markdown rendering (index column first)
    pub fn to_markdown(&self) -> String {
        let index_header = self
            .index_header
            .iter()
            .filter(|s| !s.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(" / ");

        let mut header = vec![escape_cell(&index_header)];
        header.extend((0..self.column_count()).map(|j| escape_cell(&self.joined_column_label(j))));

        let mut out = String::new();
        out.push_str(&format!("| {} |\n", header.join(" | ")));
        out.push_str(&format!("|{}\n", ":---|".repeat(header.len())));

        for (i, row) in self.rows.iter().enumerate() {
            let label = self.row_labels[i].as_deref().unwrap_or("");
            let mut cells = vec![escape_cell(label)];
            cells.extend(row.iter().map(|v| escape_cell(v)));
            out.push_str(&format!("| {} |\n", cells.join(" | ")));
        }
        out
    }

    /// Delimited-text export, one header record per header level
    pub fn to_csv(&self) -> Result<String, ExtractorError> {
        let mut writer = csv::Writer::from_writer(vec![]);

        for level in 0..self.header_levels {
            let mut record = vec![self.index_header.get(level).cloned().unwrap_or_default()];
            record.extend((0..self.column_count()).map(|j| self.column_label(j, level).to_string()));
            writer.write_record(&record)?;
        }

        for (i, row) in self.rows.iter().enumerate() {
            let mut record = vec![self.row_labels[i].clone().unwrap_or_default()];
            record.extend(row.iter().cloned());
            writer.write_record(&record)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ExtractorError::TableParse(format!("CSV export failed: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| ExtractorError::TableParse(format!("CSV export failed: {}", e)))
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// One described cell of a metric table
#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    /// Coordinate key `"{x}-{y}"`
    pub key: String,

    /// Raw cell text
    pub value: String,

    /// Human-readable sentence combining row and column context
    pub description: String,

    /// Context label → split keywords, filled in by enrichment
    pub row_keywords: BTreeMap<String, SplitKeywords>,
}

/// All described cells of one table plus table-level context
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellInfo {
    /// Table display name
    pub table_name: String,

    /// Described cells in grid order
    pub cells: Vec<TableCell>,

    /// Section header → row labels found beneath it
    pub section_children: BTreeMap<String, BTreeSet<String>>,

    /// Magnitude of the values
    pub scale: Option<String>,

    /// Measurement unit of the values
    pub unit: Option<String>,

    /// Informal name of the table, from enrichment
    pub table_name_colloquial: Option<String>,
}

impl CellInfo {
    /// Every distinct context label used by any cell
    pub fn context_labels(&self) -> BTreeSet<String> {
        self.cells
            .iter()
            .flat_map(|c| c.row_keywords.keys().cloned())
            .collect()
    }
}

/// A parent/child relation between two row labels
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubItemRelation {
    /// Enclosing row label
    pub parent: String,

    /// Relation name, always [`CONTAINS`]
    pub relation: &'static str,

    /// Nested row label
    pub child: String,
}

impl SubItemRelation {
    /// Create a `contains` relation
    pub fn contains(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            relation: CONTAINS,
            child: child.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NormalizedTable {
        NormalizedTable {
            header_levels: 1,
            index_header: vec!["Item".to_string()],
            columns: vec![vec!["2023".to_string()], vec!["2024".to_string()]],
            row_labels: vec![Some("Revenue".to_string()), None],
            rows: vec![
                vec!["10".to_string(), "12".to_string()],
                vec!["".to_string(), "".to_string()],
            ],
        }
    }

    #[test]
    fn test_accessors() {
        let table = sample();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.value(0, 1), "12");
        assert_eq!(table.value(5, 5), "");
        assert_eq!(table.row_label_text(1), TOTAL_LABEL);
        assert!(table.is_blank_row(1));
        assert!(!table.is_blank_row(0));
    }

    #[test]
    fn test_markdown_export() {
        let markdown = sample().to_markdown();
        let lines: Vec<&str> = markdown.lines().collect();
        assert_eq!(lines[0], "| Item | 2023 | 2024 |");
        assert_eq!(lines[2], "| Revenue | 10 | 12 |");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_csv_export() {
        let csv = sample().to_csv().unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Item,2023,2024");
        assert_eq!(lines[1], "Revenue,10,12");
        assert_eq!(lines[2], ",,");
    }

    #[test]
    fn test_markdown_escapes_pipes() {
        let mut table = sample();
        table.rows[0][0] = "a|b".to_string();
        assert!(table.to_markdown().contains("a\\|b"));
    }
}
