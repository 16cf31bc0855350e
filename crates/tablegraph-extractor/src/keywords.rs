//! Keyword deduplication and colloquial enrichment
//!
//! [`KeywordRegistry`] is the single place keyword nodes are created: every
//! label goes through [`KeywordRegistry::get_or_create`], which maps the
//! label's scope-qualified key to exactly one node in the graph being built.
//! A registry lives for one table's extraction and is never shared.
//!
//! [`KeywordEnricher`] prepares the one expansion request per table and folds
//! the parsed answer back into the described cells.

use crate::config::PromptLanguage;
use crate::error::ExtractorError;
use crate::parser::{self, KeywordExpansions};
use crate::prompt::PromptBuilder;
use crate::types::CellInfo;
use std::collections::BTreeSet;
use tablegraph_domain::{GraphBuilder, Keyword, KeywordScope, Node, NodeLabel};
use tracing::debug;

/// JSON schema of the expansion answer: label → split map, list or string
pub(crate) const EXPANSION_SCHEMA: &str = r#"{"type":"object","additionalProperties":{"anyOf":[{"type":"string"},{"type":"array","items":{"type":"string"}},{"type":"object","additionalProperties":{"type":"array","items":{"type":"string"}}}]}}"#;

/// Per-table registry of keyword nodes
#[derive(Debug)]
pub struct KeywordRegistry {
    table_name: String,
    // scoped keys with a node in the graph
    entries: BTreeSet<String>,
}

impl KeywordRegistry {
    /// Create an empty registry for one table
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            entries: BTreeSet::new(),
        }
    }

    /// Node id of `keyword`, creating the node on first sight
    ///
    /// A key seen before is never re-inserted; the returned id refers to the
    /// existing node so callers can attach new edges to it.
    pub fn get_or_create(&mut self, keyword: &Keyword, builder: &mut GraphBuilder) -> String {
        let key = keyword.scoped_key(&self.table_name);
        if !self.entries.contains(&key) {
            let node = Node::new(key.clone(), keyword.label.clone(), NodeLabel::MetricConstraint)
                .with_property("type", keyword.scope.as_str());
            builder.add_node(node);
            self.entries.insert(key.clone());
        }
        key
    }

    /// Node id of a table-scoped label, if registered under any scope
    pub fn lookup(&self, label: &str) -> Option<String> {
        let key = Keyword::new(label, KeywordScope::Row).scoped_key(&self.table_name);
        self.entries.contains(&key).then_some(key)
    }

    /// Number of distinct keyword nodes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds the keyword expansion request and applies its answer
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordEnricher {
    prompts: PromptBuilder,
}

impl KeywordEnricher {
    /// Create an enricher writing prompts in `language`
    pub fn new(language: PromptLanguage) -> Self {
        Self {
            prompts: PromptBuilder::new(language),
        }
    }

    /// Every distinct label to expand, table name included, sorted
    pub fn keyword_set(info: &CellInfo) -> BTreeSet<String> {
        let mut keys = info.context_labels();
        if !info.table_name.is_empty() {
            keys.insert(info.table_name.clone());
        }
        keys
    }

    /// Expansion prompt for the table
    pub fn prompt(&self, info: &CellInfo) -> String {
        self.prompts
            .keywords(&info.table_name, &Self::keyword_set(info))
    }

    /// Parse the expansion response for the table
    pub fn parse(&self, response: &str, info: &CellInfo) -> Result<KeywordExpansions, ExtractorError> {
        parser::parse_keyword_expansions(response, &Self::keyword_set(info), &info.table_name)
    }

    /// Fold parsed expansions into the cells' row keywords
    pub fn apply(info: &mut CellInfo, expansions: KeywordExpansions) {
        if let Some(name) = expansions.table_name_colloquial {
            info.table_name_colloquial = Some(name);
        }

        let mut applied = 0;
        for cell in &mut info.cells {
            for (label, splits) in cell.row_keywords.iter_mut() {
                if let Some(found) = expansions.splits.get(label) {
                    *splits = found.clone();
                    applied += 1;
                }
            }
        }
        debug!(
            "Applied {} keyword expansions to {} cells",
            applied,
            info.cells.len()
        );
    }
}
