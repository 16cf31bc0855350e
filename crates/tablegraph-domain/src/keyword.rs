//! Keyword module - scoped semantic labels that become constraint nodes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix shared by every globally scoped keyword key
pub const GLOBAL_KEY_PREFIX: &str = "global_keywords";

/// Where a keyword came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordScope {
    /// Document-level keyword shared across tables
    Global,

    /// Row or column context label of a cell
    Row,

    /// Sub-keyword split out of a row keyword by enrichment
    Split,

    /// Informal phrasing of a split keyword
    Colloquial,

    /// The table's display name
    TableName,
}

impl KeywordScope {
    /// Get the scope name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            KeywordScope::Global => "global",
            KeywordScope::Row => "row",
            KeywordScope::Split => "split",
            KeywordScope::Colloquial => "colloquial",
            KeywordScope::TableName => "table_name",
        }
    }
}

impl fmt::Display for KeywordScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A deduplicated semantic label
///
/// Two keywords with the same [`Keyword::scoped_key`] must map to exactly one
/// graph node. Global keywords share one namespace across tables; every other
/// scope is qualified by the table name, so a row label and a split label with
/// the same text collapse into one node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Keyword {
    /// Label text as it appears in the table
    pub label: String,

    /// Origin of the label
    pub scope: KeywordScope,
}

impl Keyword {
    /// Create a keyword
    pub fn new(label: impl Into<String>, scope: KeywordScope) -> Self {
        Self {
            label: label.into(),
            scope,
        }
    }

    /// Scope-qualified identity key
    ///
    /// # Examples
    ///
    /// ```
    /// use tablegraph_domain::{Keyword, KeywordScope};
    ///
    /// let global = Keyword::new("FY2024", KeywordScope::Global);
    /// assert_eq!(global.scoped_key("Income"), "global_keywords_FY2024");
    ///
    /// let row = Keyword::new("Revenue", KeywordScope::Row);
    /// assert_eq!(row.scoped_key("Income"), "Income_Revenue");
    /// ```
    pub fn scoped_key(&self, table_name: &str) -> String {
        match self.scope {
            KeywordScope::Global => format!("{}_{}", GLOBAL_KEY_PREFIX, self.label),
            _ => format!("{}_{}", table_name, self.label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_scopes_share_a_namespace() {
        let row = Keyword::new("Revenue", KeywordScope::Row);
        let split = Keyword::new("Revenue", KeywordScope::Split);
        let colloquial = Keyword::new("Revenue", KeywordScope::Colloquial);
        assert_eq!(row.scoped_key("t"), split.scoped_key("t"));
        assert_eq!(split.scoped_key("t"), colloquial.scoped_key("t"));
    }

    #[test]
    fn test_global_scope_ignores_table_name() {
        let kw = Keyword::new("2024", KeywordScope::Global);
        assert_eq!(kw.scoped_key("a"), kw.scoped_key("b"));
        assert_ne!(kw.scoped_key("a"), Keyword::new("2024", KeywordScope::Row).scoped_key("a"));
    }

    #[test]
    fn test_scope_names() {
        assert_eq!(KeywordScope::TableName.as_str(), "table_name");
        assert_eq!(KeywordScope::Split.to_string(), "split");
    }
}
