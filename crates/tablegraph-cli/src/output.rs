//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use tablegraph_domain::Graph;
use tablegraph_extractor::CellInfo;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Result of processing one table of a batch.
#[derive(Debug)]
pub struct Outcome<T> {
    /// Table chunk id
    pub table: String,
    /// What the table produced, or why it failed
    pub result: std::result::Result<T, String>,
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the graphs extracted from a batch of tables.
    pub fn format_extraction(&self, outcomes: &[Outcome<Vec<Graph>>]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let json: Vec<serde_json::Value> = outcomes
                    .iter()
                    .map(|o| match &o.result {
                        Ok(graphs) => serde_json::json!({ "table": o.table, "graphs": graphs }),
                        Err(e) => serde_json::json!({ "table": o.table, "error": e }),
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Table => {
                let mut sections = Vec::new();
                for outcome in outcomes {
                    match &outcome.result {
                        Ok(graphs) => {
                            sections.push(self.info(&format!(
                                "Table {}: {} graph(s)",
                                outcome.table,
                                graphs.len()
                            )));
                            sections.extend(graphs.iter().map(|g| self.graph_table(g)));
                        }
                        Err(e) => sections.push(self.error(&format!("Table {}: {}", outcome.table, e))),
                    }
                }
                Ok(sections.join("\n"))
            }
            OutputFormat::Quiet => {
                let ids: Vec<&str> = outcomes
                    .iter()
                    .filter_map(|o| o.result.as_ref().ok())
                    .flatten()
                    .flat_map(|g| g.nodes.iter().map(|n| n.id.as_str()))
                    .collect();
                Ok(ids.join("\n"))
            }
        }
    }

    /// Format cell descriptions of a batch of tables.
    pub fn format_descriptions(&self, outcomes: &[Outcome<CellInfo>]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let json: Vec<serde_json::Value> = outcomes
                    .iter()
                    .map(|o| match &o.result {
                        Ok(info) => {
                            let cells: Vec<serde_json::Value> = info
                                .cells
                                .iter()
                                .map(|c| {
                                    serde_json::json!({
                                        "key": c.key,
                                        "value": c.value,
                                        "description": c.description,
                                        "keywords": c.row_keywords.keys().collect::<Vec<_>>(),
                                    })
                                })
                                .collect();
                            serde_json::json!({
                                "table": o.table,
                                "table_name": info.table_name,
                                "cells": cells,
                            })
                        }
                        Err(e) => serde_json::json!({ "table": o.table, "error": e }),
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Table => {
                let mut sections = Vec::new();
                for outcome in outcomes {
                    match &outcome.result {
                        Ok(info) => sections.push(self.cells_table(&outcome.table, info)),
                        Err(e) => sections.push(self.error(&format!("Table {}: {}", outcome.table, e))),
                    }
                }
                Ok(sections.join("\n"))
            }
            OutputFormat::Quiet => {
                let lines: Vec<&str> = outcomes
                    .iter()
                    .filter_map(|o| o.result.as_ref().ok())
                    .flat_map(|info| info.cells.iter().map(|c| c.description.as_str()))
                    .collect();
                Ok(lines.join("\n"))
            }
        }
    }

    fn graph_table(&self, graph: &Graph) -> String {
        if graph.is_empty() {
            return self.colorize("Empty graph.", "yellow");
        }

        let mut nodes = Builder::default();
        nodes.push_record(["ID", "Label", "Name"]);
        for node in &graph.nodes {
            nodes.push_record([node.id.as_str(), node.label.as_str(), node.name.as_str()]);
        }

        let mut edges = Builder::default();
        edges.push_record(["Label", "From", "To"]);
        for edge in &graph.edges {
            edges.push_record([edge.label.as_str(), edge.from.as_str(), edge.to.as_str()]);
        }

        format!("{}\n{}", styled(nodes), styled(edges))
    }

    fn cells_table(&self, table_id: &str, info: &CellInfo) -> String {
        if info.cells.is_empty() {
            return self.warning(&format!("Table {}: no cells to describe", table_id));
        }

        let mut builder = Builder::default();
        builder.push_record(["Cell", "Value", "Description"]);
        for cell in &info.cells {
            builder.push_record([cell.key.as_str(), cell.value.as_str(), cell.description.as_str()]);
        }

        format!(
            "{}\n{}",
            self.info(&format!("Table {} ({})", table_id, info.table_name)),
            styled(builder)
        )
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn styled(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablegraph_domain::{EdgeLabel, GraphBuilder, Node, NodeLabel};
    use tablegraph_extractor::{describe_cells, normalize_grid, DescribeContext};

    fn graph() -> Graph {
        let mut builder = GraphBuilder::new();
        builder.add_node(Node::new("income", "Income", NodeLabel::Table));
        builder.add_node(Node::new("income_1-1", "Revenue of 2024 is 12", NodeLabel::TableMetric));
        builder.add_edge("income_1-1", "income", EdgeLabel::Source).unwrap();
        builder.build()
    }

    fn extraction() -> Vec<Outcome<Vec<Graph>>> {
        vec![
            Outcome {
                table: "income".to_string(),
                result: Ok(vec![graph()]),
            },
            Outcome {
                table: "broken".to_string(),
                result: Err("timed out".to_string()),
            },
        ]
    }

    fn cells() -> CellInfo {
        let grid = vec![
            vec![String::new(), "2024".to_string()],
            vec!["Revenue".to_string(), "12".to_string()],
        ];
        let table = normalize_grid(&grid, &[0], &[0]).unwrap();
        describe_cells(
            &table,
            &DescribeContext {
                table_name: "Income",
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_json_extraction() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_extraction(&extraction()).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["table"], "income");
        assert_eq!(parsed[0]["graphs"][0]["nodes"].as_array().unwrap().len(), 2);
        assert_eq!(parsed[1]["error"], "timed out");
    }

    #[test]
    fn test_table_extraction() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_extraction(&extraction()).unwrap();
        assert!(output.contains("Table income: 1 graph(s)"));
        assert!(output.contains("income_1-1"));
        assert!(output.contains("source"));
        assert!(output.contains("✗ Table broken: timed out"));
    }

    #[test]
    fn test_quiet_extraction() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter.format_extraction(&extraction()).unwrap();
        assert_eq!(output, "income\nincome_1-1");
    }

    #[test]
    fn test_descriptions() {
        let outcomes = vec![Outcome {
            table: "income".to_string(),
            result: Ok(cells()),
        }];

        let table = Formatter::new(OutputFormat::Table, false)
            .format_descriptions(&outcomes)
            .unwrap();
        assert!(table.contains("Description"));
        assert!(table.contains("Revenue of 2024 is 12"));

        let quiet = Formatter::new(OutputFormat::Quiet, false)
            .format_descriptions(&outcomes)
            .unwrap();
        assert_eq!(quiet, "[Income]cell[1-1] shows Revenue of 2024 is 12");

        let json = Formatter::new(OutputFormat::Json, false)
            .format_descriptions(&outcomes)
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["cells"][0]["keywords"], serde_json::json!(["2024", "Revenue"]));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("done"), "✓ done");
        assert_eq!(formatter.warning("careful"), "⚠ careful");
    }
}
