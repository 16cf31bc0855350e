//! Graph assembly for metric tables
//!
//! Node and edge directions:
//!
//! | edge | from | to |
//! |---|---|---|
//! | `dimension` | table name keyword | Table |
//! | `colloquial` | colloquial table name | table name keyword |
//! | `source` | TableMetric | Table |
//! | `dimension` | global or row keyword | TableMetric |
//! | `parent` | split keyword | row keyword |
//! | `colloquial` | colloquial keyword | split keyword |
//! | `subitem` | parent row keyword | child row keyword |

use crate::error::ExtractorError;
use crate::keywords::KeywordRegistry;
use crate::parser::MAX_COLLOQUIAL;
use crate::types::{CellInfo, SubItemRelation, TableCell};
use tablegraph_domain::{
    EdgeLabel, Graph, GraphBuilder, Keyword, KeywordScope, Node, NodeLabel, TableChunk,
};
use tracing::debug;

/// Builds one table's graph from its described cells
pub struct GraphAssembler<'a> {
    chunk: &'a TableChunk,
    info: &'a CellInfo,
    registry: KeywordRegistry,
    builder: GraphBuilder,
}

impl<'a> GraphAssembler<'a> {
    /// Create an assembler with a fresh registry
    pub fn new(chunk: &'a TableChunk, info: &'a CellInfo) -> Self {
        Self {
            chunk,
            info,
            registry: KeywordRegistry::new(info.table_name.clone()),
            builder: GraphBuilder::new(),
        }
    }

    /// Assemble the graph
    ///
    /// Sub-item relations whose endpoints were never registered as keywords
    /// of this table are dropped.
    pub fn assemble(mut self, relations: &[SubItemRelation]) -> Result<Graph, ExtractorError> {
        let table_id = self.add_table_node();
        let table_name_id = self.add_table_name(&table_id)?;
        self.add_table_name_colloquial(&table_name_id)?;

        let info = self.info;
        for cell in &info.cells {
            let metric_id = self.add_metric(cell, &table_id)?;
            self.add_global_keywords(&metric_id)?;
            self.add_row_keywords(cell, &metric_id)?;
        }

        let subitems = self.add_subitems(relations)?;

        debug!(
            "Assembled graph for '{}': {} nodes, {} edges, {} keywords, {} subitem edges",
            self.info.table_name,
            self.builder.node_count(),
            self.builder.edge_count(),
            self.registry.len(),
            subitems
        );
        Ok(self.builder.build())
    }

    fn add_table_node(&mut self) -> String {
        let chunk = self.chunk;
        let node = Node::new(chunk.id.clone(), self.info.table_name.clone(), NodeLabel::Table)
            .with_property("content", chunk.content.clone())
            .with_optional_property("csv", chunk.csv.as_deref())
            .with_property("desc", chunk.metadata.context.clone());
        self.builder.add_node(node);
        chunk.id.clone()
    }

    fn add_table_name(&mut self, table_id: &str) -> Result<String, ExtractorError> {
        let keyword = Keyword::new(self.info.table_name.clone(), KeywordScope::TableName);
        let id = self.registry.get_or_create(&keyword, &mut self.builder);
        self.builder.add_edge(&id, table_id, EdgeLabel::Dimension)?;
        Ok(id)
    }

    fn add_table_name_colloquial(&mut self, table_name_id: &str) -> Result<(), ExtractorError> {
        let Some(name) = self.info.table_name_colloquial.as_deref() else {
            return Ok(());
        };
        let keyword = Keyword::new(name, KeywordScope::Colloquial);
        let id = self.registry.get_or_create(&keyword, &mut self.builder);
        if id != table_name_id {
            self.builder.add_edge(&id, table_name_id, EdgeLabel::Colloquial)?;
        }
        Ok(())
    }

    fn add_metric(&mut self, cell: &TableCell, table_id: &str) -> Result<String, ExtractorError> {
        let id = format!("{}_{}", self.chunk.id, cell.key);
        let node = Node::new(id.clone(), cell.description.clone(), NodeLabel::TableMetric)
            .with_property("value", cell.value.clone())
            .with_optional_property("scale", self.info.scale.as_deref())
            .with_optional_property("unit", self.info.unit.as_deref());
        self.builder.add_node(node);
        self.builder.add_edge(&id, table_id, EdgeLabel::Source)?;
        Ok(id)
    }

    fn add_global_keywords(&mut self, metric_id: &str) -> Result<(), ExtractorError> {
        let chunk = self.chunk;
        for label in chunk.metadata.keywords.iter().map(|k| k.trim()) {
            if label.is_empty() {
                continue;
            }
            let id = self
                .registry
                .get_or_create(&Keyword::new(label, KeywordScope::Global), &mut self.builder);
            self.builder.add_edge(&id, metric_id, EdgeLabel::Dimension)?;
        }
        Ok(())
    }

    fn add_row_keywords(&mut self, cell: &TableCell, metric_id: &str) -> Result<(), ExtractorError> {
        for (label, splits) in &cell.row_keywords {
            let row_id = self
                .registry
                .get_or_create(&Keyword::new(label.clone(), KeywordScope::Row), &mut self.builder);
            self.builder.add_edge(&row_id, metric_id, EdgeLabel::Dimension)?;

            for (split, colloquials) in splits {
                let split_id = self
                    .registry
                    .get_or_create(&Keyword::new(split.clone(), KeywordScope::Split), &mut self.builder);
                if split_id != row_id {
                    self.builder.add_edge(&split_id, &row_id, EdgeLabel::Parent)?;
                }

                for colloquial in colloquials.iter().take(MAX_COLLOQUIAL) {
                    let id = self.registry.get_or_create(
                        &Keyword::new(colloquial.clone(), KeywordScope::Colloquial),
                        &mut self.builder,
                    );
                    if id != split_id {
                        self.builder.add_edge(&id, &split_id, EdgeLabel::Colloquial)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn add_subitems(&mut self, relations: &[SubItemRelation]) -> Result<usize, ExtractorError> {
        let mut added = 0;
        for relation in relations {
            let (Some(parent), Some(child)) = (
                self.registry.lookup(&relation.parent),
                self.registry.lookup(&relation.child),
            ) else {
                continue;
            };
            if parent != child && self.builder.add_edge(&parent, &child, EdgeLabel::Subitem)? {
                added += 1;
            }
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SplitKeywords;
    use std::collections::BTreeMap;
    use tablegraph_domain::TableMetadata;

    fn chunk(keywords: &[&str]) -> TableChunk {
        let metadata = TableMetadata {
            table_name: "Income".to_string(),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            context: "Annual figures".to_string(),
            ..TableMetadata::default()
        };
        TableChunk::new("| | 2023 |", metadata).with_id("c1")
    }

    fn cell(key: &str, labels: &[&str]) -> TableCell {
        TableCell {
            key: key.to_string(),
            value: "10".to_string(),
            description: format!("[Income]cell[{}] shows something", key),
            row_keywords: labels
                .iter()
                .map(|l| (l.to_string(), SplitKeywords::new()))
                .collect(),
        }
    }

    fn info(cells: Vec<TableCell>) -> CellInfo {
        CellInfo {
            table_name: "Income".to_string(),
            cells,
            ..CellInfo::default()
        }
    }

    #[test]
    fn test_table_and_table_name_nodes() {
        let chunk = chunk(&[]);
        let info = info(vec![]);
        let graph = GraphAssembler::new(&chunk, &info).assemble(&[]).unwrap();

        assert_eq!(graph.nodes.len(), 2);
        let table = graph.node("c1").unwrap();
        assert_eq!(table.label, NodeLabel::Table);
        assert_eq!(table.property("desc"), Some("Annual figures"));
        assert_eq!(table.property("content"), Some("| | 2023 |"));

        let name = graph.node("Income_Income").unwrap();
        assert_eq!(name.property("type"), Some("table_name"));
        assert_eq!(graph.edges[0].id, "dimension:Income_Income->c1");
    }

    #[test]
    fn test_metric_nodes_and_global_keywords() {
        let chunk = chunk(&["FY", " ", "FY"]);
        let mut info = info(vec![cell("1-1", &["Revenue"]), cell("1-2", &["Revenue"])]);
        info.unit = Some("USD".to_string());
        let graph = GraphAssembler::new(&chunk, &info).assemble(&[]).unwrap();

        let metric = graph.node("c1_1-1").unwrap();
        assert_eq!(metric.label, NodeLabel::TableMetric);
        assert_eq!(metric.property("value"), Some("10"));
        assert_eq!(metric.property("unit"), Some("USD"));
        assert_eq!(metric.property("scale"), None);

        // One global node, one edge to each metric
        assert!(graph.node("global_keywords_FY").is_some());
        let global_edges = graph
            .edges_with_label(EdgeLabel::Dimension)
            .filter(|e| e.from == "global_keywords_FY")
            .count();
        assert_eq!(global_edges, 2);

        // Shared row keyword reused for both metrics
        let row_edges: Vec<_> = graph
            .edges_with_label(EdgeLabel::Dimension)
            .filter(|e| e.from == "Income_Revenue")
            .collect();
        assert_eq!(row_edges.len(), 2);
        assert_eq!(graph.nodes.len(), 6);
    }

    #[test]
    fn test_split_and_colloquial_edges() {
        let chunk = chunk(&[]);
        let mut c = cell("1-1", &["Net profit attributable"]);
        let mut splits = SplitKeywords::new();
        splits.insert(
            "Net profit".to_string(),
            vec!["profit".to_string(), "earnings".to_string(), "bottom line".to_string()],
        );
        c.row_keywords.insert("Net profit attributable".to_string(), splits);
        let mut info = info(vec![c]);
        info.table_name_colloquial = Some("P&L".to_string());

        let graph = GraphAssembler::new(&chunk, &info).assemble(&[]).unwrap();

        let parent: Vec<_> = graph.edges_with_label(EdgeLabel::Parent).collect();
        assert_eq!(parent.len(), 1);
        assert_eq!(parent[0].from, "Income_Net profit");
        assert_eq!(parent[0].to, "Income_Net profit attributable");

        let colloquial: Vec<(&str, &str)> = graph
            .edges_with_label(EdgeLabel::Colloquial)
            .map(|e| (e.from.as_str(), e.to.as_str()))
            .collect();
        assert_eq!(
            colloquial,
            vec![
                ("Income_P&L", "Income_Income"),
                ("Income_profit", "Income_Net profit"),
                ("Income_earnings", "Income_Net profit"),
            ]
        );
        assert!(graph.node("Income_bottom line").is_none());
        assert_eq!(
            graph.node("Income_earnings").and_then(|n| n.property("type")),
            Some("colloquial")
        );
    }

    #[test]
    fn test_split_equal_to_row_has_no_self_loop() {
        let chunk = chunk(&[]);
        let mut c = cell("1-1", &["Revenue"]);
        c.row_keywords.insert(
            "Revenue".to_string(),
            BTreeMap::from([("Revenue".to_string(), vec!["Revenue".to_string(), "sales".to_string()])]),
        );
        let info = info(vec![c]);
        let graph = GraphAssembler::new(&chunk, &info).assemble(&[]).unwrap();

        assert!(graph.edges.iter().all(|e| e.from != e.to));
        assert_eq!(graph.edges_with_label(EdgeLabel::Parent).count(), 0);
        assert_eq!(graph.edges_with_label(EdgeLabel::Colloquial).count(), 1);
    }

    #[test]
    fn test_subitems_need_registered_endpoints() {
        let chunk = chunk(&[]);
        let info = info(vec![cell("1-1", &["A"]), cell("2-1", &["-B"])]);
        let relations = vec![
            SubItemRelation::contains("A", "-B"),
            SubItemRelation::contains("A", "-Missing"),
        ];
        let graph = GraphAssembler::new(&chunk, &info).assemble(&relations).unwrap();

        let subitems: Vec<_> = graph.edges_with_label(EdgeLabel::Subitem).collect();
        assert_eq!(subitems.len(), 1);
        assert_eq!(subitems[0].from, "Income_A");
        assert_eq!(subitems[0].to, "Income_-B");
        assert!(graph.dangling_edges().is_empty());
    }
}
