//! Builds a [`PatternGraph`] from the FROM list and MATCH paths.

use log::{debug, warn};

use super::errors::PatternGraphError;
use super::logical_expr::{Column, Literal, LogicalExpr, Operator};
use super::pattern_graph::{
    ConnectedComponent, EdgeKind, NodeId, PathBounds, PatternEdge, PatternElement,
    PatternGraph, PatternNode, MAIN_COMPONENT_KEY,
};
use super::union_find::UnionFind;
use crate::config::{CompilerConfig, ComponentMode};
use crate::graph_catalog::SchemaCatalog;
use crate::sql_parser::ast::{EdgeReference, FromClause, MatchClause, MatchPath};

pub fn build_pattern_graph(
    from: &FromClause<'_>,
    match_clause: Option<&MatchClause<'_>>,
    catalog: &dyn SchemaCatalog,
    config: &CompilerConfig,
) -> Result<PatternGraph, PatternGraphError> {
    let mut builder = GraphBuilder {
        graph: PatternGraph::new(),
        union_find: UnionFind::new(),
        tails: vec![],
        catalog,
        config,
    };

    for table_ref in &from.table_references {
        builder
            .graph
            .add_node(PatternNode::new(table_ref.alias, Some(table_ref.table_name), false))?;
        builder.union_find.register(table_ref.alias);
    }

    if let Some(match_clause) = match_clause {
        for path in &match_clause.paths {
            builder.add_path(path)?;
        }
    }

    builder.finish()
}

struct GraphBuilder<'c> {
    graph: PatternGraph,
    union_find: UnionFind,
    tails: Vec<NodeId>,
    catalog: &'c dyn SchemaCatalog,
    config: &'c CompilerConfig,
}

impl GraphBuilder<'_> {
    fn add_path(&mut self, path: &MatchPath<'_>) -> Result<(), PatternGraphError> {
        let Some(first) = path.steps.first() else {
            let tail = self.resolve_node(path.tail)?;
            self.mark_tail(tail);
            return Ok(());
        };

        let mut source = self.resolve_node(first.node_alias)?;
        for (i, step) in path.steps.iter().enumerate() {
            let sink_alias = path
                .steps
                .get(i + 1)
                .map(|next| next.node_alias)
                .unwrap_or(path.tail);
            let sink = self.resolve_node(sink_alias)?;
            self.add_edge(source, sink, &step.edge, path.is_reversed)?;
            source = sink;
        }
        self.mark_tail(source);
        Ok(())
    }

    /// Get-or-create by alias. Aliases first seen here are external to FROM.
    fn resolve_node(&mut self, alias: &str) -> Result<NodeId, PatternGraphError> {
        match self.graph.element_for(alias) {
            Some(PatternElement::Node(id)) => Ok(id),
            Some(PatternElement::Edge(_)) => Err(PatternGraphError::DuplicateAlias(alias.to_string())),
            None if self.config.strict_from => {
                Err(PatternGraphError::UnresolvedAlias(alias.to_string()))
            }
            None => {
                let id = self.graph.add_node(PatternNode::new(alias, None, true))?;
                self.union_find.register(alias);
                debug!("graph_builder: registered external node `{}`", alias);
                Ok(id)
            }
        }
    }

    fn add_edge(
        &mut self,
        source: NodeId,
        sink: NodeId,
        edge_ref: &EdgeReference<'_>,
        reversed: bool,
    ) -> Result<(), PatternGraphError> {
        let source_alias = self.graph.node(source).alias.clone();
        let sink_alias = self.graph.node(sink).alias.clone();

        if edge_ref.edge_column.trim().is_empty() {
            return Err(PatternGraphError::MissingEdgeColumn {
                from: source_alias,
                to: sink_alias,
            });
        }

        let alias = match edge_ref.alias {
            Some(alias) => alias.to_string(),
            None => self.synthesize_edge_alias(&source_alias, edge_ref.edge_column, &sink_alias),
        };

        if edge_ref.min_hops == 0 || edge_ref.max_hops < edge_ref.min_hops {
            return Err(PatternGraphError::InvalidHopRange {
                edge: alias,
                min: edge_ref.min_hops,
                max: edge_ref.max_hops,
            });
        }

        // the adjacency list lives on whichever end the arrow leaves
        let owner = if reversed { sink } else { source };
        if let Some(table) = self.graph.node(owner).table.as_deref() {
            if self.catalog.edge_columns(table).is_some()
                && !self.catalog.has_edge_column(table, edge_ref.edge_column)
            {
                return Err(PatternGraphError::UnknownEdgeColumn {
                    table: table.to_string(),
                    column: edge_ref.edge_column.to_string(),
                });
            }
        }

        let constraints: Vec<(String, Literal)> = edge_ref
            .attributes
            .iter()
            .map(|(key, value)| (key.to_string(), Literal::from(value.clone())))
            .collect();

        let (kind, predicates) = if edge_ref.is_single_hop() {
            // a single hop has no path to constrain; attributes filter the edge itself
            let predicates = constraints
                .into_iter()
                .map(|(key, value)| {
                    LogicalExpr::binary(
                        Operator::Equal,
                        LogicalExpr::Column(Column::qualified(&alias, &key)),
                        LogicalExpr::Literal(value),
                    )
                })
                .collect();
            (EdgeKind::Fixed, predicates)
        } else {
            (
                EdgeKind::VariableLength(PathBounds {
                    min_hops: edge_ref.min_hops,
                    max_hops: edge_ref.max_hops,
                    attribute_constraints: constraints,
                }),
                vec![],
            )
        };

        debug!(
            "graph_builder: edge `{}` {} -[{}]-> {} ({:?}, reversed={})",
            alias, source_alias, edge_ref.edge_column, sink_alias, kind, reversed
        );

        self.graph.add_edge(PatternEdge {
            alias,
            edge_column: edge_ref.edge_column.to_string(),
            source,
            sink,
            reversed,
            kind,
            predicates,
        })?;
        self.union_find.union(&source_alias, &sink_alias)
    }

    fn synthesize_edge_alias(&self, source: &str, column: &str, sink: &str) -> String {
        let base = format!("{}_{}_{}", source, column, sink);
        if !self.graph.contains_alias(&base) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}_{}", base, n);
            if !self.graph.contains_alias(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    fn mark_tail(&mut self, id: NodeId) {
        if !self.tails.contains(&id) {
            self.tails.push(id);
        }
    }

    fn finish(mut self) -> Result<PatternGraph, PatternGraphError> {
        let components = match self.config.component_mode {
            ComponentMode::Collapsed => self.collapsed_component(),
            ComponentMode::Connected => self.connected_components()?,
        };
        debug!(
            "graph_builder: {} node(s), {} edge(s), {} component(s)",
            self.graph.node_count(),
            self.graph.edge_count(),
            components.len()
        );
        self.graph.set_components(components);
        Ok(self.graph)
    }

    fn collapsed_component(&self) -> Vec<ConnectedComponent> {
        if self.graph.node_count() == 0 {
            return vec![];
        }
        let groups = self.union_find.set_count();
        if groups > 1 {
            warn!(
                "pattern has {} disconnected groups; compiling them as a single component",
                groups
            );
        }
        let mut component = ConnectedComponent::new(MAIN_COMPONENT_KEY);
        component.nodes = self.graph.nodes().map(|(id, _)| id).collect();
        component.edges = self.graph.edges().map(|(id, _)| id).collect();
        component.tail_nodes = self.tails.clone();
        vec![component]
    }

    fn connected_components(&mut self) -> Result<Vec<ConnectedComponent>, PatternGraphError> {
        let mut components: Vec<ConnectedComponent> = vec![];
        let mut owner = Vec::with_capacity(self.graph.node_count());

        let aliases: Vec<String> = self.graph.nodes().map(|(_, n)| n.alias.clone()).collect();
        for (i, alias) in aliases.iter().enumerate() {
            let key = self.union_find.find(alias)?;
            let index = match components.iter().position(|c| c.key == key) {
                Some(index) => index,
                None => {
                    components.push(ConnectedComponent::new(&key));
                    components.len() - 1
                }
            };
            components[index].nodes.push(NodeId(i));
            owner.push(index);
        }

        for (id, edge) in self.graph.edges() {
            components[owner[edge.source.0]].edges.push(id);
        }
        for tail in &self.tails {
            components[owner[tail.0]].tail_nodes.push(*tail);
        }
        Ok(components)
    }
}
