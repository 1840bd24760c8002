//! In-memory pattern graph built from a MATCH clause.
//!
//! Nodes and edges live in two arenas owned by [`PatternGraph`]; everything
//! else refers to them by [`NodeId`] / [`EdgeId`]. Arena order is discovery
//! order: FROM aliases first, then MATCH aliases as the paths are walked.
//! Lookups by alias go through a side index keyed by the lower-cased alias, so
//! iteration never depends on hash-map ordering.
//!
//! An edge is stored once. Its reverse direction is a borrowed
//! [`ReverseEdge`] view, so both directions always see the same predicates.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::errors::PatternGraphError;
use super::logical_expr::{Literal, LogicalExpr};

/// Key of the single component built in collapsed mode.
pub const MAIN_COMPONENT_KEY: &str = "main";

/// Suffix of the edge-column index entry for edges written right-to-left.
pub const REVERSED_COLUMN_SUFFIX: &str = "_REV";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternElement {
    Node(NodeId),
    Edge(EdgeId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatternNode {
    /// Alias as first written; identity is case-insensitive.
    pub alias: String,
    /// Table from the FROM clause, if the alias was declared there.
    pub table: Option<String>,
    /// True when the alias first appeared in MATCH rather than FROM.
    pub external: bool,
    pub outgoing: Vec<EdgeId>,
    pub incoming: Vec<EdgeId>,
    pub predicates: Vec<LogicalExpr>,
    /// Native fragment; empty until the synthesizer runs.
    pub query_segment: String,
}

impl PatternNode {
    pub fn new(alias: &str, table: Option<&str>, external: bool) -> Self {
        PatternNode {
            alias: alias.to_string(),
            table: table.map(str::to_string),
            external,
            outgoing: vec![],
            incoming: vec![],
            predicates: vec![],
            query_segment: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathBounds {
    pub min_hops: u32,
    pub max_hops: u32,
    pub attribute_constraints: Vec<(String, Literal)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EdgeKind {
    Fixed,
    VariableLength(PathBounds),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatternEdge {
    pub alias: String,
    /// Document property holding the adjacency list.
    pub edge_column: String,
    pub source: NodeId,
    pub sink: NodeId,
    /// Written right-to-left (`a<-[col]-b`): the stored record lives on the sink.
    pub reversed: bool,
    pub kind: EdgeKind,
    pub predicates: Vec<LogicalExpr>,
}

impl PatternEdge {
    pub fn hop_bounds(&self) -> (u32, u32) {
        match &self.kind {
            EdgeKind::Fixed => (1, 1),
            EdgeKind::VariableLength(bounds) => (bounds.min_hops, bounds.max_hops),
        }
    }

    /// Property the sink joins on to reach this edge's record.
    pub fn sink_adjacency_property(&self) -> &'static str {
        if self.reversed {
            "_edge"
        } else {
            "_reverse_edge"
        }
    }
}

/// Read-only view of an edge seen from its sink.
#[derive(Debug, Clone, Copy)]
pub struct ReverseEdge<'g> {
    pub id: EdgeId,
    edge: &'g PatternEdge,
}

impl<'g> ReverseEdge<'g> {
    pub fn alias(&self) -> &'g str {
        &self.edge.alias
    }

    pub fn source(&self) -> NodeId {
        self.edge.sink
    }

    pub fn sink(&self) -> NodeId {
        self.edge.source
    }

    pub fn predicates(&self) -> &'g [LogicalExpr] {
        &self.edge.predicates
    }

    pub fn forward(&self) -> &'g PatternEdge {
        self.edge
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectedComponent {
    pub key: String,
    /// Discovery order.
    pub nodes: Vec<NodeId>,
    pub edges: Vec<EdgeId>,
    pub tail_nodes: Vec<NodeId>,
}

impl ConnectedComponent {
    pub fn new(key: &str) -> Self {
        ConnectedComponent {
            key: key.to_string(),
            nodes: vec![],
            edges: vec![],
            tail_nodes: vec![],
        }
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }
}

#[derive(Debug, Default, Clone)]
pub struct PatternGraph {
    nodes: Vec<PatternNode>,
    edges: Vec<PatternEdge>,
    aliases: HashMap<String, PatternElement>,
    edge_columns: HashMap<String, Vec<String>>,
    components: Vec<ConnectedComponent>,
}

impl PatternGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: PatternNode) -> Result<NodeId, PatternGraphError> {
        let key = alias_key(&node.alias)?;
        if self.aliases.contains_key(&key) {
            return Err(PatternGraphError::DuplicateAlias(node.alias));
        }
        let id = NodeId(self.nodes.len());
        self.aliases.insert(key, PatternElement::Node(id));
        self.nodes.push(node);
        Ok(id)
    }

    /// Add an edge and wire it into its endpoints' adjacency lists.
    pub fn add_edge(&mut self, edge: PatternEdge) -> Result<EdgeId, PatternGraphError> {
        let key = alias_key(&edge.alias)?;
        if self.aliases.contains_key(&key) {
            return Err(PatternGraphError::DuplicateAlias(edge.alias));
        }
        if edge.source.0 >= self.nodes.len() || edge.sink.0 >= self.nodes.len() {
            return Err(PatternGraphError::UnregisteredAlias(edge.alias));
        }

        let id = EdgeId(self.edges.len());
        let index_key = if edge.reversed {
            format!("{}{}", edge.edge_column, REVERSED_COLUMN_SUFFIX)
        } else {
            edge.edge_column.clone()
        };
        self.edge_columns
            .entry(index_key)
            .or_default()
            .push(edge.alias.clone());
        self.aliases.insert(key, PatternElement::Edge(id));
        self.nodes[edge.source.0].outgoing.push(id);
        self.nodes[edge.sink.0].incoming.push(id);
        self.edges.push(edge);
        Ok(id)
    }

    pub fn element_for(&self, alias: &str) -> Option<PatternElement> {
        self.aliases.get(&alias.to_lowercase()).copied()
    }

    pub fn contains_alias(&self, alias: &str) -> bool {
        self.element_for(alias).is_some()
    }

    pub fn node_id(&self, alias: &str) -> Option<NodeId> {
        match self.element_for(alias)? {
            PatternElement::Node(id) => Some(id),
            PatternElement::Edge(_) => None,
        }
    }

    pub fn node_by_alias(&self, alias: &str) -> Option<&PatternNode> {
        self.node_id(alias).map(|id| self.node(id))
    }

    pub fn node(&self, id: NodeId) -> &PatternNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut PatternNode {
        &mut self.nodes[id.0]
    }

    pub fn edge(&self, id: EdgeId) -> &PatternEdge {
        &self.edges[id.0]
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> &mut PatternEdge {
        &mut self.edges[id.0]
    }

    /// Nodes in discovery order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &PatternNode)> + '_ {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &PatternEdge)> + '_ {
        self.edges.iter().enumerate().map(|(i, e)| (EdgeId(i), e))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn outgoing_edges(&self, id: NodeId) -> impl Iterator<Item = &PatternEdge> + '_ {
        self.node(id).outgoing.iter().map(|e| self.edge(*e))
    }

    /// Incoming edges of `id` in encounter order, seen from `id`.
    pub fn reverse_edges(&self, id: NodeId) -> impl Iterator<Item = ReverseEdge<'_>> + '_ {
        self.node(id).incoming.iter().map(|e| ReverseEdge {
            id: *e,
            edge: self.edge(*e),
        })
    }

    /// Edge aliases registered under an adjacency column, in traversal order.
    /// Edges from reversed paths are indexed under `{column}_REV`.
    pub fn edge_aliases_for_column(&self, column: &str) -> &[String] {
        self.edge_columns
            .get(column)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn components(&self) -> &[ConnectedComponent] {
        &self.components
    }

    /// The first discovered component.
    pub fn main_component(&self) -> Option<&ConnectedComponent> {
        self.components.first()
    }

    pub(crate) fn set_components(&mut self, components: Vec<ConnectedComponent>) {
        self.components = components;
    }
}

fn alias_key(alias: &str) -> Result<String, PatternGraphError> {
    if alias.trim().is_empty() {
        return Err(PatternGraphError::EmptyAlias);
    }
    Ok(alias.to_lowercase())
}
