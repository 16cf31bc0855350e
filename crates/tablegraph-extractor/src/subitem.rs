//! Sub-item relations inferred from hyphen indentation of row labels

use crate::types::{CellInfo, NormalizedTable, SubItemRelation, TOTAL_LABEL};
use tracing::debug;

/// Nesting level of a row label: the number of leading hyphens after trimming
pub fn indent_level(label: &str) -> usize {
    label.trim().chars().take_while(|&c| c == '-').count()
}

/// Find parent/child relations among row labels
///
/// Each label with level > 0 is attached to the nearest preceding label whose
/// level is exactly one less. Labels without such an ancestor produce nothing.
///
/// # Examples
///
/// ```
/// use tablegraph_extractor::extract_subitems;
///
/// let labels = ["A", "-B", "--C", "-D"].map(|s| Some(s.to_string()));
/// let relations = extract_subitems(&labels);
///
/// let pairs: Vec<(&str, &str)> = relations
///     .iter()
///     .map(|r| (r.parent.as_str(), r.child.as_str()))
///     .collect();
/// assert_eq!(pairs, vec![("A", "-B"), ("-B", "--C"), ("A", "-D")]);
/// ```
pub fn extract_subitems(row_labels: &[Option<String>]) -> Vec<SubItemRelation> {
    let labels: Vec<&str> = row_labels
        .iter()
        .map(|l| l.as_deref().unwrap_or(TOTAL_LABEL))
        .collect();
    let levels: Vec<usize> = labels.iter().map(|l| indent_level(l)).collect();

    let mut relations = Vec::new();
    for (i, &level) in levels.iter().enumerate() {
        if level == 0 {
            continue;
        }
        if let Some(p) = (0..i).rev().find(|&p| levels[p] + 1 == level) {
            relations.push(SubItemRelation::contains(labels[p], labels[i]));
        }
    }
    relations
}

/// Sub-item relations of a table, merged with section-header candidates
///
/// Section pairs recorded by the describer that indentation did not already
/// produce are appended after the indentation relations.
pub fn reconcile(table: &NormalizedTable, info: &CellInfo) -> Vec<SubItemRelation> {
    let mut relations = extract_subitems(&table.row_labels);
    let indented = relations.len();

    for (section, children) in &info.section_children {
        for child in children {
            let candidate = SubItemRelation::contains(section.clone(), child.clone());
            if !relations.contains(&candidate) {
                relations.push(candidate);
            }
        }
    }

    debug!(
        "Sub-item relations: {} from indentation, {} from section headers",
        indented,
        relations.len() - indented
    );
    relations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CONTAINS;
    use std::collections::BTreeSet;

    fn labels(items: &[&str]) -> Vec<Option<String>> {
        items.iter().map(|s| Some(s.to_string())).collect()
    }

    fn pairs(relations: &[SubItemRelation]) -> Vec<(String, String)> {
        relations
            .iter()
            .map(|r| (r.parent.clone(), r.child.clone()))
            .collect()
    }

    #[test]
    fn test_indent_level() {
        assert_eq!(indent_level("Revenue"), 0);
        assert_eq!(indent_level("  -Sub"), 1);
        assert_eq!(indent_level("---Deep"), 3);
        assert_eq!(indent_level("a-b"), 0);
    }

    #[test]
    fn test_nested_example() {
        let relations = extract_subitems(&labels(&["A", "-B", "--C", "-D"]));
        assert_eq!(relations.len(), 3);
        assert!(relations.iter().all(|r| r.relation == CONTAINS));
        assert_eq!(
            pairs(&relations),
            vec![
                ("A".to_string(), "-B".to_string()),
                ("-B".to_string(), "--C".to_string()),
                ("A".to_string(), "-D".to_string()),
            ]
        );
    }

    #[test]
    fn test_orphans_produce_nothing() {
        // No level-0 row before "-A"; "---C" skips a level
        let relations = extract_subitems(&labels(&["-A", "B", "---C"]));
        assert!(relations.is_empty());
    }

    #[test]
    fn test_nearest_ancestor_wins() {
        let relations = extract_subitems(&labels(&["A", "B", "-C"]));
        assert_eq!(pairs(&relations), vec![("B".to_string(), "-C".to_string())]);
    }

    #[test]
    fn test_null_label_can_parent() {
        let relations = extract_subitems(&[None, Some("-x".to_string())]);
        assert_eq!(pairs(&relations), vec![("total".to_string(), "-x".to_string())]);
    }

    #[test]
    fn test_reconcile_appends_section_pairs_once() {
        let table = NormalizedTable {
            header_levels: 1,
            index_header: vec![String::new()],
            columns: vec![vec!["v".to_string()]],
            row_labels: labels(&["Costs", "-Rent"]),
            rows: vec![vec![String::new()], vec!["1".to_string()]],
        };
        let mut info = CellInfo::default();
        info.section_children
            .insert("Costs".to_string(), BTreeSet::from(["-Rent".to_string()]));
        info.section_children
            .insert("Other".to_string(), BTreeSet::from(["Misc".to_string()]));

        let relations = reconcile(&table, &info);
        assert_eq!(
            pairs(&relations),
            vec![
                ("Costs".to_string(), "-Rent".to_string()),
                ("Other".to_string(), "Misc".to_string()),
            ]
        );
    }
}
