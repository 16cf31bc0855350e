//! Graph module - the node/edge unit handed to the knowledge store

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use thiserror::Error;

/// Property map carried by nodes and edges
pub type Properties = BTreeMap<String, String>;

/// Node label
///
/// The metric pipeline only emits `Table`, `TableMetric` and `MetricConstraint`.
/// `Entity` is reserved for graphs produced by a generic extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeLabel {
    /// The table itself
    Table,

    /// One measured cell value
    TableMetric,

    /// A keyword constraining metrics (dimension, table name, synonym)
    MetricConstraint,

    /// Free entity from generic extraction
    Entity,
}

impl NodeLabel {
    /// Get the label name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeLabel::Table => "Table",
            NodeLabel::TableMetric => "TableMetric",
            NodeLabel::MetricConstraint => "MetricConstraint",
            NodeLabel::Entity => "Entity",
        }
    }
}

impl fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Edge relation label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeLabel {
    /// Keyword constrains a metric, or the table name names the table
    Dimension,

    /// Metric was read from a table
    Source,

    /// Split keyword belongs to a row keyword
    Parent,

    /// Informal phrasing of a split keyword
    Colloquial,

    /// Row label nests under another row label
    Subitem,

    /// Free relation from generic extraction (predicate in properties)
    Relation,
}

impl EdgeLabel {
    /// Get the label name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeLabel::Dimension => "dimension",
            EdgeLabel::Source => "source",
            EdgeLabel::Parent => "parent",
            EdgeLabel::Colloquial => "colloquial",
            EdgeLabel::Subitem => "subitem",
            EdgeLabel::Relation => "relation",
        }
    }
}

impl fmt::Display for EdgeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A graph node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Identifier, unique within one graph
    pub id: String,

    /// Display name
    pub name: String,

    /// Node label
    pub label: NodeLabel,

    /// Arbitrary properties
    #[serde(default)]
    pub properties: Properties,
}

impl Node {
    /// Create a node without properties
    pub fn new(id: impl Into<String>, name: impl Into<String>, label: NodeLabel) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            label,
            properties: Properties::new(),
        }
    }

    /// Add a property
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Add a property when the value is present
    pub fn with_optional_property(self, key: impl Into<String>, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.with_property(key, v),
            None => self,
        }
    }

    /// Look up a property
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

/// A directed graph edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Identifier derived from `(label, from, to)`
    pub id: String,

    /// Source node id
    pub from: String,

    /// Target node id
    pub to: String,

    /// Relation label
    pub label: EdgeLabel,

    /// Arbitrary properties
    #[serde(default)]
    pub properties: Properties,
}

impl Edge {
    /// Deterministic id for an edge
    pub fn make_id(label: EdgeLabel, from: &str, to: &str) -> String {
        format!("{}:{}->{}", label, from, to)
    }
}

/// One table's contribution to the knowledge store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    /// All nodes
    pub nodes: Vec<Node>,

    /// All edges; both endpoints of each are in `nodes`
    pub edges: Vec<Edge>,
}

impl Graph {
    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find a node by id
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Iterate nodes carrying `label`
    pub fn nodes_with_label(&self, label: NodeLabel) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.label == label)
    }

    /// Iterate edges carrying `label`
    pub fn edges_with_label(&self, label: EdgeLabel) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.label == label)
    }

    /// Ids of edges whose endpoints are missing from the node set
    pub fn dangling_edges(&self) -> Vec<&str> {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        self.edges
            .iter()
            .filter(|e| !ids.contains(e.from.as_str()) || !ids.contains(e.to.as_str()))
            .map(|e| e.id.as_str())
            .collect()
    }
}

/// Errors raised while building a graph
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// An edge referenced a node that was never added
    #[error("Edge {edge} references missing node {node}")]
    DanglingEndpoint {
        /// Edge id
        edge: String,
        /// Missing node id
        node: String,
    },
}

/// Accumulates nodes and edges while enforcing graph invariants
///
/// - node ids are unique; adding a known id again is a no-op
/// - an edge is only accepted once both endpoints exist
/// - an edge with the same `(label, from, to)` is only stored once
///
/// # Examples
///
/// ```
/// use tablegraph_domain::{EdgeLabel, GraphBuilder, Node, NodeLabel};
///
/// let mut builder = GraphBuilder::new();
/// builder.add_node(Node::new("t", "Income", NodeLabel::Table));
/// builder.add_node(Node::new("m", "cell", NodeLabel::TableMetric));
/// builder.add_edge("m", "t", EdgeLabel::Source).unwrap();
/// assert!(builder.add_edge("m", "missing", EdgeLabel::Source).is_err());
///
/// let graph = builder.build();
/// assert_eq!(graph.nodes.len(), 2);
/// assert_eq!(graph.edges.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: Graph,
    node_ids: HashSet<String>,
    edge_ids: HashSet<String>,
}

impl GraphBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node; returns `false` when the id already exists
    pub fn add_node(&mut self, node: Node) -> bool {
        if !self.node_ids.insert(node.id.clone()) {
            return false;
        }
        self.graph.nodes.push(node);
        true
    }

    /// Add an edge without properties
    pub fn add_edge(&mut self, from: &str, to: &str, label: EdgeLabel) -> Result<bool, GraphError> {
        self.add_edge_with_properties(from, to, label, Properties::new())
    }

    /// Add an edge; returns `false` when the same edge already exists
    pub fn add_edge_with_properties(
        &mut self,
        from: &str,
        to: &str,
        label: EdgeLabel,
        properties: Properties,
    ) -> Result<bool, GraphError> {
        let id = Edge::make_id(label, from, to);
        self.add_edge_with_id(id, from, to, label, properties)
    }

    /// Add an edge under a caller-chosen id
    ///
    /// Used when several edges of one label may join the same endpoints.
    pub fn add_edge_with_id(
        &mut self,
        id: String,
        from: &str,
        to: &str,
        label: EdgeLabel,
        properties: Properties,
    ) -> Result<bool, GraphError> {
        for endpoint in [from, to] {
            if !self.node_ids.contains(endpoint) {
                return Err(GraphError::DanglingEndpoint {
                    edge: id,
                    node: endpoint.to_string(),
                });
            }
        }
        if !self.edge_ids.insert(id.clone()) {
            return Ok(false);
        }
        self.graph.edges.push(Edge {
            id,
            from: from.to_string(),
            to: to.to_string(),
            label,
            properties,
        });
        Ok(true)
    }

    /// Number of nodes added so far
    pub fn node_count(&self) -> usize {
        self.graph.nodes.len()
    }

    /// Number of edges added so far
    pub fn edge_count(&self) -> usize {
        self.graph.edges.len()
    }

    /// Finish building
    pub fn build(self) -> Graph {
        self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_node_is_ignored() {
        let mut builder = GraphBuilder::new();
        assert!(builder.add_node(Node::new("a", "first", NodeLabel::MetricConstraint)));
        assert!(!builder.add_node(Node::new("a", "second", NodeLabel::MetricConstraint)));

        let graph = builder.build();
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].name, "first");
    }

    #[test]
    fn test_duplicate_edge_is_ignored() {
        let mut builder = GraphBuilder::new();
        builder.add_node(Node::new("a", "a", NodeLabel::MetricConstraint));
        builder.add_node(Node::new("b", "b", NodeLabel::TableMetric));

        assert!(builder.add_edge("a", "b", EdgeLabel::Dimension).unwrap());
        assert!(!builder.add_edge("a", "b", EdgeLabel::Dimension).unwrap());
        // Same endpoints, different relation
        assert!(builder.add_edge("a", "b", EdgeLabel::Parent).unwrap());
        assert_eq!(builder.edge_count(), 2);
    }

    #[test]
    fn test_dangling_edge_rejected() {
        let mut builder = GraphBuilder::new();
        builder.add_node(Node::new("a", "a", NodeLabel::Table));

        let err = builder.add_edge("a", "ghost", EdgeLabel::Source).unwrap_err();
        assert_eq!(
            err,
            GraphError::DanglingEndpoint {
                edge: "source:a->ghost".to_string(),
                node: "ghost".to_string(),
            }
        );
        assert!(builder.build().dangling_edges().is_empty());
    }

    #[test]
    fn test_graph_queries() {
        let mut builder = GraphBuilder::new();
        builder.add_node(Node::new("t", "t", NodeLabel::Table));
        builder.add_node(Node::new("m", "m", NodeLabel::TableMetric).with_property("value", "10"));
        builder.add_edge("m", "t", EdgeLabel::Source).unwrap();
        let graph = builder.build();

        assert_eq!(graph.nodes_with_label(NodeLabel::TableMetric).count(), 1);
        assert_eq!(graph.edges_with_label(EdgeLabel::Source).count(), 1);
        assert_eq!(graph.node("m").and_then(|n| n.property("value")), Some("10"));
    }

    #[test]
    fn test_serialized_labels() {
        let edge = Edge {
            id: Edge::make_id(EdgeLabel::Subitem, "a", "b"),
            from: "a".into(),
            to: "b".into(),
            label: EdgeLabel::Subitem,
            properties: Properties::new(),
        };
        let json = serde_json::to_string(&edge).unwrap();
        assert!(json.contains(r#""label":"subitem""#));

        let node = Node::new("n", "n", NodeLabel::MetricConstraint);
        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains(r#""label":"MetricConstraint""#));
    }
}
