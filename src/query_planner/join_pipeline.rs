//! Left-deep join pipeline over one connected component.
//!
//! Each [`JoinStage`] owns its predecessor, so the last stage built is the
//! root of the whole chain and the seed stage sits at the bottom. Stages
//! share one [`OutputHeader`] through an `Arc`.
//!
//! Only linear chains are produced. Out-trees (chains, stars) linearize to
//! exactly one stage per node; other shapes get extra bridging stages and are
//! not faithfully represented.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use super::errors::PatternGraphError;
use super::logical_expr::Literal;
use super::output_header::OutputHeader;
use super::pattern_graph::{ConnectedComponent, EdgeKind, PatternEdge, PatternGraph};
use crate::config::CompilerConfig;

/// The edge a stage walks from its source to its sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeTraversal {
    pub edge_alias: String,
    pub edge_column: String,
    pub reversed: bool,
    pub min_hops: u32,
    pub max_hops: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attribute_constraints: Vec<(String, Literal)>,
}

impl From<&PatternEdge> for EdgeTraversal {
    fn from(edge: &PatternEdge) -> Self {
        let (min_hops, max_hops) = edge.hop_bounds();
        let attribute_constraints = match &edge.kind {
            EdgeKind::Fixed => vec![],
            EdgeKind::VariableLength(bounds) => bounds.attribute_constraints.clone(),
        };
        EdgeTraversal {
            edge_alias: edge.alias.clone(),
            edge_column: edge.edge_column.clone(),
            reversed: edge.reversed,
            min_hops,
            max_hops,
            attribute_constraints,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinStage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predecessor: Option<Box<JoinStage>>,
    /// Empty for the seed stage.
    pub source_alias: String,
    pub sink_alias: String,
    /// `None` when the stage only brings a new node into scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traversal: Option<EdgeTraversal>,
    /// Shared by every stage of a chain. Not serialized; a deserialized
    /// [`CompiledPlan`](super::CompiledPlan) re-links it to the plan's header.
    #[serde(skip)]
    pub header: Arc<OutputHeader>,
    pub start_of_result_index: usize,
    pub input_batch_size: u32,
    pub output_batch_size: u32,
}

impl JoinStage {
    pub fn is_seed(&self) -> bool {
        self.predecessor.is_none()
    }

    /// Walks from this stage back to the seed.
    pub fn iter(&self) -> JoinStageIter<'_> {
        JoinStageIter { next: Some(self) }
    }

    /// Seed first, this stage last.
    pub fn stages_in_order(&self) -> Vec<&JoinStage> {
        let mut stages: Vec<_> = self.iter().collect();
        stages.reverse();
        stages
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Point this stage and all its predecessors at `header`.
    pub fn share_header(&mut self, header: Arc<OutputHeader>) {
        let mut next = Some(self);
        while let Some(stage) = next {
            stage.header = Arc::clone(&header);
            next = stage.predecessor.as_deref_mut();
        }
    }
}

pub struct JoinStageIter<'a> {
    next: Option<&'a JoinStage>,
}

impl<'a> Iterator for JoinStageIter<'a> {
    type Item = &'a JoinStage;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.predecessor.as_deref();
        Some(current)
    }
}

/// Initial row fed to the seed stage: one slot per header column, with each
/// node's query segment in its `{alias}_SEG` slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordZero(pub Vec<Option<String>>);

impl RecordZero {
    pub fn build(graph: &PatternGraph, component: &ConnectedComponent, header: &OutputHeader) -> Self {
        let mut slots = vec![None; header.len()];
        for id in &component.nodes {
            let node = graph.node(*id);
            if let Some(index) = header.segment_index(&node.alias) {
                slots[index] = Some(node.query_segment.clone());
            }
        }
        RecordZero(slots)
    }

    pub fn slots(&self) -> &[Option<String>] {
        &self.0
    }
}

/// Linearize `component` into a left-deep chain and return its root stage.
pub fn linearize(
    graph: &PatternGraph,
    component: &ConnectedComponent,
    header: Arc<OutputHeader>,
    config: &CompilerConfig,
) -> Result<JoinStage, PatternGraphError> {
    let start_of_result_index = 3 * component.nodes.len();
    let stage = |predecessor: Option<JoinStage>,
                 source_alias: String,
                 sink_alias: String,
                 traversal: Option<EdgeTraversal>| {
        debug!(
            "join_pipeline: stage `{}` -> `{}` via {:?}",
            source_alias,
            sink_alias,
            traversal.as_ref().map(|t| t.edge_alias.as_str())
        );
        JoinStage {
            predecessor: predecessor.map(Box::new),
            source_alias,
            sink_alias,
            traversal,
            header: Arc::clone(&header),
            start_of_result_index,
            input_batch_size: config.input_batch_size,
            output_batch_size: config.output_batch_size,
        }
    };

    let mut visited_as_sink = HashSet::new();
    let mut current: Option<JoinStage> = None;

    for id in &component.nodes {
        let alias = graph.node(*id).alias.clone();

        if !visited_as_sink.contains(id) {
            let source = current
                .as_ref()
                .map(|s| s.sink_alias.clone())
                .unwrap_or_default();
            current = Some(stage(current.take(), source, alias.clone(), None));
        }

        for edge in graph.outgoing_edges(*id) {
            let sink = graph.node(edge.sink).alias.clone();
            current = Some(stage(
                current.take(),
                alias.clone(),
                sink,
                Some(EdgeTraversal::from(edge)),
            ));
            visited_as_sink.insert(edge.sink);
        }
    }

    current.ok_or_else(|| PatternGraphError::EmptyComponent(component.key.clone()))
}
