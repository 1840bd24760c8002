//! Per-node query segments.
//!
//! A segment fetches one node's documents together with its adjacency data:
//!
//! ```text
//! SELECT {"id":b.id, "edge":b._edge, "reverse":b._reverse_edge} AS NodeInfo, b.name AS b_name
//! FROM b JOIN e IN b._reverse_edge WHERE b.age > 20 AND (e.since > 2010)
//! ```
//!
//! (printed on one line). Each incoming edge becomes a `JOIN` over the sink's
//! adjacency property so its predicates can be evaluated where the edge is
//! stored.

use log::debug;

use super::errors::QueryGeneratorError;
use crate::query_planner::logical_expr::{LogicalExpr, Operator};
use crate::query_planner::output_header::OutputHeader;
use crate::query_planner::pattern_graph::{NodeId, PatternGraph};

/// Generate the segment for `alias`, projecting the header's result columns
/// that belong to it.
pub fn generate_query_segment(
    graph: &PatternGraph,
    alias: &str,
    header: &OutputHeader,
) -> Result<String, QueryGeneratorError> {
    let id = graph
        .node_id(alias)
        .ok_or_else(|| QueryGeneratorError::NodeNotFound(alias.to_string()))?;
    Ok(render_segment(graph, id, header))
}

/// Fill in `query_segment` for every node of a component, in discovery order,
/// and return `(alias, segment)` pairs in that order.
pub fn synthesize_component_segments(
    graph: &mut PatternGraph,
    component_index: usize,
    header: &OutputHeader,
) -> Result<Vec<(String, String)>, QueryGeneratorError> {
    let nodes = graph
        .components()
        .get(component_index)
        .ok_or(QueryGeneratorError::ComponentNotFound(component_index))?
        .nodes
        .clone();

    let mut segments = Vec::with_capacity(nodes.len());
    for id in nodes {
        let segment = render_segment(graph, id, header);
        let node = graph.node_mut(id);
        debug!("query_segment: {} => {}", node.alias, segment);
        node.query_segment = segment.clone();
        segments.push((node.alias.clone(), segment));
    }
    Ok(segments)
}

/// True when `segment` ends in a `WHERE` keyword with no condition after it.
pub fn ends_with_dangling_where(segment: &str) -> bool {
    let trimmed = segment.trim_end();
    let len = trimmed.len();
    len >= 5
        && trimmed.is_char_boundary(len - 5)
        && trimmed[len - 5..].eq_ignore_ascii_case("WHERE")
        && trimmed[..len - 5]
            .chars()
            .next_back()
            .is_none_or(char::is_whitespace)
}

fn render_segment(graph: &PatternGraph, id: NodeId, header: &OutputHeader) -> String {
    let node = graph.node(id);
    let alias = node.alias.as_str();

    let mut segment = format!(
        "SELECT {{\"id\":{alias}.id, \"edge\":{alias}._edge, \"reverse\":{alias}._reverse_edge}} AS NodeInfo"
    );

    for column in header.result_columns() {
        let owned = column
            .split_once('.')
            .is_some_and(|(prefix, _)| prefix.eq_ignore_ascii_case(alias));
        if owned {
            segment.push_str(&format!(", {} AS {}", column, column.replace('.', "_")));
        }
    }

    segment.push_str(&format!(" FROM {}", alias));

    let mut edge_groups = vec![];
    for reverse in graph.reverse_edges(id) {
        segment.push_str(&format!(
            " JOIN {} IN {}.{}",
            reverse.alias(),
            alias,
            reverse.forward().sink_adjacency_property()
        ));
        if !reverse.predicates().is_empty() {
            edge_groups.push(format!("({})", join_and(reverse.predicates())));
        }
    }

    let mut conditions = join_and(&node.predicates);
    for group in edge_groups {
        if !conditions.is_empty() {
            conditions.push_str(" AND ");
        }
        conditions.push_str(&group);
    }

    debug_assert!(
        !ends_with_dangling_where(&segment),
        "segment already ends in WHERE: {segment}"
    );
    if !conditions.is_empty() {
        segment.push_str(" WHERE ");
        segment.push_str(&conditions);
    }
    segment
}

/// `AND`-join conjuncts, parenthesizing any that bind looser than `AND`.
fn join_and(predicates: &[LogicalExpr]) -> String {
    predicates
        .iter()
        .map(|p| {
            if p.binds_looser_than(Operator::And) {
                format!("({})", p)
            } else {
                p.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" AND ")
}
