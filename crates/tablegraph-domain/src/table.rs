//! Table module - the input unit handed over by the document splitter

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Classification of a table, resolved once from free-text metadata
///
/// Upstream classifiers emit bilingual labels; [`TableKind::from_classification`]
/// maps every accepted synonym onto this closed set. Unknown labels are never
/// an error and resolve to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// Cells are quantitative measurements under row/column dimensions
    Metric,

    /// Plain lookup table, handled by the generic extractor
    Simple,

    /// Anything else
    Other,
}

/// Accepted classification labels for metric tables
const METRIC_SYNONYMS: &[&str] = &[
    "指标型表格",
    "metric_based_table",
    "metric-based table",
    "metric based table",
    "metric-based",
    "metric_based",
    "metric",
];

/// Accepted classification labels for simple tables
const SIMPLE_SYNONYMS: &[&str] = &["简单表格", "simple_table", "simple table", "simple"];

impl TableKind {
    /// Resolve a free-text classification tag
    ///
    /// # Examples
    ///
    /// ```
    /// use tablegraph_domain::TableKind;
    ///
    /// assert_eq!(TableKind::from_classification("指标型表格"), TableKind::Metric);
    /// assert_eq!(TableKind::from_classification("Simple_Table"), TableKind::Simple);
    /// assert_eq!(TableKind::from_classification("chart"), TableKind::Other);
    /// ```
    pub fn from_classification(tag: &str) -> Self {
        let normalized = tag.trim().to_ascii_lowercase();
        if METRIC_SYNONYMS.contains(&normalized.as_str()) {
            TableKind::Metric
        } else if SIMPLE_SYNONYMS.contains(&normalized.as_str()) {
            TableKind::Simple
        } else {
            TableKind::Other
        }
    }

    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Metric => "metric",
            TableKind::Simple => "simple",
            TableKind::Other => "other",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural hints produced by the upstream table detector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    /// Row indices (0-based, in the raw markup) that form the header levels
    #[serde(default)]
    pub header: Vec<usize>,

    /// Column indices (0-based) that hold the row labels
    #[serde(default)]
    pub index_col: Vec<usize>,

    /// Magnitude of the cell values, e.g. "thousands" or "万"
    #[serde(default, deserialize_with = "string_or_number")]
    pub scale: Option<String>,

    /// Measurement unit of the cell values
    #[serde(default, deserialize_with = "string_or_number")]
    pub units: Option<String>,
}

/// Metadata attached to a table chunk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Free-text classification, see [`TableKind::from_classification`]
    #[serde(default)]
    pub table_type: String,

    /// Structural hints; absent for most non-metric tables
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_info: Option<TableInfo>,

    /// Display name of the table
    #[serde(default)]
    pub table_name: String,

    /// Table-level keywords shared by every cell
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Free-text description of the surrounding document context
    #[serde(default)]
    pub context: String,
}

impl TableMetadata {
    /// Resolved classification of this table
    pub fn kind(&self) -> TableKind {
        TableKind::from_classification(&self.table_type)
    }
}

/// One table extracted from a larger document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableChunk {
    /// Stable identifier; becomes the Table node id
    #[serde(default = "generate_chunk_id")]
    pub id: String,

    /// Chunk name (usually the section title it was cut from)
    #[serde(default)]
    pub name: String,

    /// Table text, markdown or HTML
    pub content: String,

    /// Raw HTML of the table when the splitter kept it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,

    /// Delimited-text export, filled in by normalization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv: Option<String>,

    /// Classification and hints
    #[serde(default)]
    pub metadata: TableMetadata,
}

impl TableChunk {
    /// Create a chunk with a fresh UUIDv7 id
    pub fn new(content: impl Into<String>, metadata: TableMetadata) -> Self {
        Self {
            id: generate_chunk_id(),
            name: metadata.table_name.clone(),
            content: content.into(),
            html: None,
            csv: None,
            metadata,
        }
    }

    /// Replace the generated id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Attach raw HTML markup
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Markup the heuristic parser should read: the raw HTML if kept, else the content
    pub fn raw_markup(&self) -> &str {
        self.html.as_deref().unwrap_or(&self.content)
    }
}

fn generate_chunk_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

/// Accept `"万"`, `1000` or `null` for scale/unit fields
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    let raw = Option::<Raw>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Raw::Text(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Raw::Text(_)) | None => None,
        Some(Raw::Int(n)) => Some(n.to_string()),
        Some(Raw::Float(n)) => Some(n.to_string()),
    })
}
