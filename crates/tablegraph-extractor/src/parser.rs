//! Parse LLM output into keyword expansions and triples

use crate::error::ExtractorError;
use crate::types::SplitKeywords;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Maximum colloquial phrasings kept per split keyword
pub const MAX_COLLOQUIAL: usize = 2;

/// Parsed keyword expansion response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordExpansions {
    /// Informal name of the table
    pub table_name_colloquial: Option<String>,

    /// Requested label → split keywords with their colloquial phrasings
    pub splits: BTreeMap<String, SplitKeywords>,
}

/// A subject/predicate/object statement from generic extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triple {
    /// Subject entity
    pub subject: String,
    /// Relationship
    pub predicate: String,
    /// Object entity or literal
    pub object: String,
}

/// Parse a keyword expansion response
///
/// Only labels in `requested` are kept. A string answer for `table_name`
/// becomes the colloquial table name; every list is cut to
/// [`MAX_COLLOQUIAL`] entries.
pub fn parse_keyword_expansions(
    response: &str,
    requested: &BTreeSet<String>,
    table_name: &str,
) -> Result<KeywordExpansions, ExtractorError> {
    let json_str = extract_json(response)?;
    let json: Value = serde_json::from_str(&json_str)?;
    let map = json
        .as_object()
        .ok_or_else(|| ExtractorError::InvalidFormat("Expected JSON object".to_string()))?;

    let mut expansions = KeywordExpansions::default();
    for (label, value) in map {
        if !requested.contains(label) {
            warn!("Ignoring expansion for unrequested keyword '{}'", label);
            continue;
        }
        match value {
            Value::String(s) if label == table_name => {
                let s = s.trim();
                if !s.is_empty() {
                    expansions.table_name_colloquial = Some(s.to_string());
                }
            }
            Value::String(_) | Value::Array(_) => {
                let colloquial = string_list(value);
                expansions
                    .splits
                    .insert(label.clone(), SplitKeywords::from([(label.clone(), colloquial)]));
            }
            Value::Object(splits) => {
                let splits = splits
                    .iter()
                    .filter(|(split, _)| !split.trim().is_empty())
                    .map(|(split, v)| (split.clone(), string_list(v)))
                    .collect();
                expansions.splits.insert(label.clone(), splits);
            }
            other => warn!("Unexpected expansion for '{}': {}", label, other),
        }
    }
    Ok(expansions)
}

/// Strings of a JSON string or array, first [`MAX_COLLOQUIAL`] non-empty ones
fn string_list(value: &Value) -> Vec<String> {
    let items: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    items
        .into_iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(MAX_COLLOQUIAL)
        .map(str::to_string)
        .collect()
}

/// Parse a triple extraction response
pub fn parse_triples(response: &str) -> Result<Vec<Triple>, ExtractorError> {
    let json_str = extract_json(response)?;
    let json: Value = serde_json::from_str(&json_str)
        .map_err(|e| ExtractorError::InvalidFormat(format!("JSON parse error: {}", e)))?;

    let items = json
        .as_array()
        .ok_or_else(|| ExtractorError::InvalidFormat("Expected JSON array".to_string()))?;

    let mut triples = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        match parse_triple_json(item) {
            Ok(triple) => triples.push(triple),
            Err(e) => warn!("Failed to parse triple {}: {}", idx, e),
        }
    }
    Ok(triples)
}

/// Extract JSON from response, handling markdown code blocks
pub fn extract_json(response: &str) -> Result<String, ExtractorError> {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(ExtractorError::InvalidFormat("Empty code block".to_string()));
        }
        let end = if lines[lines.len() - 1].trim_start().starts_with("```") {
            lines.len() - 1
        } else {
            lines.len()
        };
        Ok(lines[1..end].join("\n"))
    } else {
        Ok(trimmed.to_string())
    }
}

fn parse_triple_json(json: &Value) -> Result<Triple, String> {
    let obj = json
        .as_object()
        .ok_or_else(|| "Triple is not a JSON object".to_string())?;

    let field = |name: &str| -> Result<String, String> {
        let value = match obj.get(name) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(format!("Missing or invalid '{}'", name)),
        };
        if value.is_empty() {
            return Err(format!("Empty '{}'", name));
        }
        Ok(value)
    };

    Ok(Triple {
        subject: field("subject")?,
        predicate: field("predicate")?,
        object: field("object")?,
    })
}
