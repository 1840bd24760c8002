//! Column layout shared by every join stage of one pipeline.
//!
//! The first `3 × nodeCount` columns are one triad per node, in discovery
//! order: `{alias}` (document id), `{alias}_ADJ` (adjacency) and `{alias}_SEG`
//! (query segment). Selected plain columns follow in SELECT order.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::errors::{BindingError, PatternGraphError};
use super::logical_expr::{Column, LogicalExpr};
use super::pattern_graph::{ConnectedComponent, PatternElement, PatternGraph};
use super::predicate_distribution::resolve_column;
use crate::graph_catalog::ColumnAliasMap;
use crate::sql_parser::ast::{Expression, SelectClause, SelectItem};

pub const ADJACENCY_SUFFIX: &str = "_ADJ";
pub const SEGMENT_SUFFIX: &str = "_SEG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputHeader {
    columns: Vec<String>,
    node_count: usize,
}

impl OutputHeader {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Index of the first selected column, right after the node triads.
    pub fn start_of_result_index(&self) -> usize {
        3 * self.node_count
    }

    /// Selected columns, excluding the node triads.
    pub fn result_columns(&self) -> &[String] {
        &self.columns[self.start_of_result_index().min(self.columns.len())..]
    }

    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn segment_index(&self, alias: &str) -> Option<usize> {
        self.index_of(&format!("{}{}", alias, SEGMENT_SUFFIX))
    }
}

/// A plain column from the SELECT list, qualified and bound to its owner.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectColumn {
    pub column: Column,
    pub owner: PatternElement,
}

/// Bind the SELECT list's plain column references, in order. Wildcards,
/// literals and computed expressions are skipped.
pub fn resolve_select_columns(
    graph: &PatternGraph,
    select: &SelectClause<'_>,
    columns: &ColumnAliasMap,
) -> Result<Vec<SelectColumn>, BindingError> {
    let mut resolved = vec![];
    for item in &select.select_items {
        let SelectItem::Expression {
            expression: Expression::Column(column_ref),
            ..
        } = item
        else {
            continue;
        };
        let mut column = Column::from(column_ref.clone());
        let owner = resolve_column(graph, columns, &mut column)?;
        resolved.push(SelectColumn { column, owner });
    }
    Ok(resolved)
}

/// Header for `graph.components()[component_index]`.
///
/// Selected columns go to the component owning their alias; columns whose
/// owner is in no component fall to the main component (index 0). Triad
/// names must be distinct (case-insensitively): an alias such as `a_ADJ`
/// next to a node `a` is a [`PatternGraphError::HeaderCollision`].
pub fn allocate_output_header(
    graph: &PatternGraph,
    component_index: usize,
    select_columns: &[SelectColumn],
) -> Result<OutputHeader, PatternGraphError> {
    let Some(component) = graph.components().get(component_index) else {
        return Ok(OutputHeader::default());
    };

    let mut columns = Vec::with_capacity(3 * component.nodes.len() + select_columns.len());
    let mut triads = HashSet::new();

    for id in &component.nodes {
        let alias = &graph.node(*id).alias;
        for name in [
            alias.clone(),
            format!("{}{}", alias, ADJACENCY_SUFFIX),
            format!("{}{}", alias, SEGMENT_SUFFIX),
        ] {
            if !triads.insert(name.to_lowercase()) {
                return Err(PatternGraphError::HeaderCollision {
                    alias: alias.clone(),
                    column: name,
                });
            }
            columns.push(name);
        }
    }

    let mut selected = HashSet::new();
    for select_column in select_columns {
        let owner_index = owning_component(graph, select_column.owner).unwrap_or(0);
        if owner_index != component_index {
            continue;
        }
        let name = LogicalExpr::Column(select_column.column.clone()).to_string();
        if selected.insert(name.clone()) {
            columns.push(name);
        }
    }

    Ok(OutputHeader {
        columns,
        node_count: component.nodes.len(),
    })
}

fn owning_component(graph: &PatternGraph, element: PatternElement) -> Option<usize> {
    let node = match element {
        PatternElement::Node(id) => id,
        PatternElement::Edge(id) => graph.edge(id).source,
    };
    graph
        .components()
        .iter()
        .position(|c: &ConnectedComponent| c.contains_node(node))
}
