//! Cell descriptions: attach row and column context to every populated cell

use crate::types::{CellInfo, NormalizedTable, SplitKeywords, TableCell};
use std::collections::BTreeMap;
use tracing::debug;

/// Table-level context needed to describe cells
#[derive(Debug, Clone, Default)]
pub struct DescribeContext<'a> {
    /// Table display name
    pub table_name: &'a str,
    /// Magnitude of the values
    pub scale: Option<&'a str>,
    /// Measurement unit of the values
    pub unit: Option<&'a str>,
}

/// Whether a cell value carries no data
pub fn is_placeholder_value(value: &str) -> bool {
    value.is_empty() || value == "-" || value == "\u{2014}" || value.starts_with("Unnamed")
}

/// Whether a header label carries no text
fn is_placeholder_label(label: &str) -> bool {
    label.is_empty() || label.starts_with("Unnamed")
}

/// `(scale,unit)` suffix, present iff either is supplied
pub fn value_suffix(scale: Option<&str>, unit: Option<&str>) -> String {
    let parts: Vec<&str> = [scale, unit]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        String::new()
    } else {
        format!("({})", parts.join(","))
    }
}

/// Describe every eligible cell of the table
///
/// # Examples
///
/// ```
/// use tablegraph_extractor::{describe_cells, normalize_grid, DescribeContext};
///
/// let grid = vec![
///     vec!["".to_string(), "2024".to_string()],
///     vec!["Revenue".to_string(), "12".to_string()],
/// ];
/// let table = normalize_grid(&grid, &[0], &[0]).unwrap();
/// let info = describe_cells(&table, &DescribeContext { table_name: "Income", ..Default::default() });
///
/// assert_eq!(info.cells[0].description, "[Income]cell[1-1] shows Revenue of 2024 is 12");
/// ```
pub fn describe_cells(table: &NormalizedTable, ctx: &DescribeContext<'_>) -> CellInfo {
    let suffix = value_suffix(ctx.scale, ctx.unit);
    let mut info = CellInfo {
        table_name: ctx.table_name.to_string(),
        scale: ctx.scale.map(str::to_string),
        unit: ctx.unit.map(str::to_string),
        ..CellInfo::default()
    };

    for i in 0..table.row_count() {
        for j in 0..table.column_count() {
            let value = table.value(i, j);
            if is_placeholder_value(value) {
                continue;
            }

            let key = format!("{}-{}", i + table.header_levels, j + 1);
            let mut row_keywords: BTreeMap<String, SplitKeywords> = BTreeMap::new();

            let row_label = table.row_label_text(i).to_string();
            let mut describe = row_label.clone();
            row_keywords.insert(row_label, SplitKeywords::new());

            if let Some(section) = section_header(table, i) {
                describe.push_str(&format!(" in {}", section));
                row_keywords.insert(section.clone(), SplitKeywords::new());
                if let Some(label) = table.row_labels[i].as_ref() {
                    info.section_children
                        .entry(section)
                        .or_default()
                        .insert(label.clone());
                }
            }

            describe.push_str(" of");
            for label in column_context(table, j) {
                describe.push(' ');
                describe.push_str(&label);
                row_keywords.insert(label, SplitKeywords::new());
            }

            describe.push_str(&format!(" is {}{}", value, suffix));
            let description = format!("[{}]cell[{}] shows {}", ctx.table_name, key, describe);

            info.cells.push(TableCell {
                key,
                value: value.to_string(),
                description,
                row_keywords,
            });
        }
    }

    debug!("Described {} cells of '{}'", info.cells.len(), ctx.table_name);
    info
}

/// Nearest blank row above `row`, rendered as a section label
fn section_header(table: &NormalizedTable, row: usize) -> Option<String> {
    (0..row).rev().find(|&r| table.is_blank_row(r)).map(|r| {
        table
            .row_label_text(r)
            .trim()
            .trim_end_matches([':', '\u{ff1a}'])
            .to_string()
    })
}

/// Column context labels for column `j`, outermost level first
fn column_context(table: &NormalizedTable, j: usize) -> Vec<String> {
    match table.header_levels {
        0 => Vec::new(),
        1 => vec![resolve_top_label(table, j)],
        levels => {
            let top = resolve_top_label(table, j);
            let mut labels = vec![top.clone()];
            let mut prev = top;
            for level in 1..levels {
                let label = table.column_label(j, level);
                if is_placeholder_label(label) || label == prev {
                    continue;
                }
                labels.push(label.to_string());
                prev = label.to_string();
            }
            labels
        }
    }
}

/// Top-level label of column `j`, borrowing a neighbor's when blank
///
/// Scans forward for the first labelled column, then backward, and finally
/// synthesizes `data {j}`.
fn resolve_top_label(table: &NormalizedTable, j: usize) -> String {
    let n = table.column_count();
    let forward = (j..n).find(|&c| !is_placeholder_label(table.column_label(c, 0)));
    let backward = || (0..=j).rev().find(|&c| !is_placeholder_label(table.column_label(c, 0)));
    match forward.or_else(backward) {
        Some(c) => table.column_label(c, 0).to_string(),
        None => format!("data {}", j),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::normalize_grid;

    fn table(rows: &[&[&str]], header: &[usize]) -> NormalizedTable {
        let grid: Vec<Vec<String>> = rows
            .iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect();
        normalize_grid(&grid, header, &[0]).unwrap()
    }

    fn ctx(name: &str) -> DescribeContext<'_> {
        DescribeContext {
            table_name: name,
            ..Default::default()
        }
    }

    #[test]
    fn test_two_by_two_grid() {
        let t = table(
            &[&["", "2023", "2024"], &["Revenue", "10", "12"], &["Cost", "3", "4"]],
            &[0],
        );
        let info = describe_cells(&t, &ctx("Income"));

        assert_eq!(info.cells.len(), 4);
        let keys: Vec<&str> = info.cells.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["1-1", "1-2", "2-1", "2-2"]);
        assert_eq!(
            info.cells[3].description,
            "[Income]cell[2-2] shows Cost of 2024 is 4"
        );
        let labels: Vec<&String> = info.cells[3].row_keywords.keys().collect();
        assert_eq!(labels, vec!["2024", "Cost"]);
    }

    #[test]
    fn test_placeholders_skipped() {
        let t = table(&[&["", "a", "b", "c", "d"], &["r", "", "-", "\u{2014}", "7"]], &[0]);
        let info = describe_cells(&t, &ctx("t"));
        assert_eq!(info.cells.len(), 1);
        assert_eq!(info.cells[0].value, "7");
    }

    #[test]
    fn test_suffix_iff_scale_or_unit() {
        let t = table(&[&["", "v"], &["r", "5"]], &[0]);

        let plain = describe_cells(&t, &ctx("t"));
        assert!(plain.cells[0].description.ends_with("is 5"));

        let scaled = describe_cells(
            &t,
            &DescribeContext {
                table_name: "t",
                scale: Some("thousands"),
                unit: Some("USD"),
            },
        );
        assert!(scaled.cells[0].description.ends_with("is 5(thousands,USD)"));

        let unit_only = describe_cells(
            &t,
            &DescribeContext {
                table_name: "t",
                scale: None,
                unit: Some("%"),
            },
        );
        assert!(unit_only.cells[0].description.ends_with("is 5(%)"));
    }

    #[test]
    fn test_null_row_label_is_total() {
        let t = table(&[&["", "v"], &["", "9"]], &[0]);
        let info = describe_cells(&t, &ctx("t"));
        assert!(info.cells[0].description.contains("shows total of v is 9"));
        assert!(info.cells[0].row_keywords.contains_key("total"));
    }

    #[test]
    fn test_section_header_context() {
        let t = table(
            &[
                &["", "2024"],
                &["Operating costs：", ""],
                &["Rent", "5"],
                &["Salaries", "7"],
            ],
            &[0],
        );
        let info = describe_cells(&t, &ctx("t"));

        assert_eq!(info.cells.len(), 2);
        assert!(info.cells[0]
            .description
            .contains("shows Rent in Operating costs of 2024 is 5"));
        assert!(info.cells[1].row_keywords.contains_key("Operating costs"));

        let children = &info.section_children["Operating costs"];
        assert!(children.contains("Rent"));
        assert!(children.contains("Salaries"));
    }

    #[test]
    fn test_blank_header_resolves_forward_then_backward() {
        let t = table(&[&["", "", "Q1", ""], &["r", "1", "2", "3"]], &[0]);
        let info = describe_cells(&t, &ctx("t"));

        // Forward to Q1
        assert!(info.cells[0].description.contains(" of Q1 is 1"));
        // Backward to Q1
        assert!(info.cells[2].description.contains(" of Q1 is 3"));
    }

    #[test]
    fn test_fully_blank_header_synthesizes_label() {
        let t = table(&[&["", ""], &["r", "1"]], &[0]);
        let info = describe_cells(&t, &ctx("t"));
        assert!(info.cells[0].description.contains(" of data 0 is 1"));
    }

    #[test]
    fn test_multi_level_header_suppresses_duplicates() {
        let t = table(
            &[
                &["", "Revenue", "Revenue", "Cost"],
                &["", "2023", "2023", ""],
                &["Total", "1", "2", "3"],
            ],
            &[0, 1],
        );
        let info = describe_cells(&t, &ctx("t"));

        assert!(info.cells[0].description.contains(" of Revenue 2023 is 1"));
        assert!(info.cells[2].description.contains(" of Cost is 3"));
        // Second header level offsets the row coordinate
        assert_eq!(info.cells[0].key, "2-1");
    }

    #[test]
    fn test_multi_level_header_same_label_twice() {
        let t = table(&[&["", "Sales"], &["", "Sales"], &["r", "1"]], &[0, 1]);
        let info = describe_cells(&t, &ctx("t"));
        assert!(info.cells[0].description.contains(" of Sales is 1"));
    }
}
