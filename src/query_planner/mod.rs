//! Compiles a parsed SELECT/MATCH statement into per-component join pipelines.
//!
//! The passes run in a fixed order over one [`PatternGraph`]:
//!
//! 1. [`graph_builder`] turns FROM aliases and MATCH paths into nodes, edges
//!    and components.
//! 2. [`predicate_distribution`] pushes WHERE conjuncts onto the single node
//!    or edge each one references.
//! 3. [`output_header`] lays out the columns shared by the pipeline.
//! 4. The segment synthesizer writes each node's native query fragment.
//! 5. [`join_pipeline`] linearizes the component into a chain of stages.
//!
//! Steps 1, 2 and 4 take the graph mutably; 3 and 5 only read it.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use log::debug;

use crate::config::CompilerConfig;
use crate::docdb_query_generator::synthesize_component_segments;
use crate::graph_catalog::{ColumnAliasMap, SchemaCatalog};
use crate::sql_parser::ast::SelectStatement;

#[path = "../utils/serde_arc.rs"]
mod serde_arc;

pub mod errors;
pub mod graph_builder;
pub mod join_pipeline;
pub mod logical_expr;
pub mod output_header;
pub mod pattern_graph;
pub mod predicate_distribution;
pub mod union_find;

pub use errors::{BindingError, PatternGraphError, QueryPlannerError};
use join_pipeline::{JoinStage, RecordZero};
use logical_expr::LogicalExpr;
use output_header::OutputHeader;
use pattern_graph::PatternGraph;

/// Everything an engine needs to run one component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PlanFields")]
pub struct CompiledPlan {
    pub component: String,
    #[serde(with = "serde_arc")]
    pub header: Arc<OutputHeader>,
    pub record_zero: RecordZero,
    /// `(alias, segment)` in discovery order.
    pub segments: Vec<(String, String)>,
    pub root: JoinStage,
}

/// Deserialized form of [`CompiledPlan`] before the stages share its header.
#[derive(Deserialize)]
struct PlanFields {
    component: String,
    #[serde(with = "serde_arc")]
    header: Arc<OutputHeader>,
    record_zero: RecordZero,
    segments: Vec<(String, String)>,
    root: JoinStage,
}

impl From<PlanFields> for CompiledPlan {
    fn from(fields: PlanFields) -> Self {
        let mut root = fields.root;
        root.share_header(Arc::clone(&fields.header));
        CompiledPlan {
            component: fields.component,
            header: fields.header,
            record_zero: fields.record_zero,
            segments: fields.segments,
            root,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledQuery {
    pub plans: Vec<CompiledPlan>,
    /// Conjuncts the engine must apply after joining.
    pub residual_predicates: Vec<LogicalExpr>,
}

impl CompiledQuery {
    /// Plan for the first discovered component.
    pub fn main_plan(&self) -> Option<&CompiledPlan> {
        self.plans.first()
    }
}

pub fn compile(
    statement: &SelectStatement<'_>,
    catalog: &dyn SchemaCatalog,
    config: &CompilerConfig,
) -> Result<CompiledQuery, QueryPlannerError> {
    let mut graph = graph_builder::build_pattern_graph(
        &statement.from_clause,
        statement.match_clause.as_ref(),
        catalog,
        config,
    )?;

    let columns = ColumnAliasMap::build(
        statement
            .from_clause
            .table_references
            .iter()
            .map(|t| (t.table_name, t.alias)),
        catalog,
    );

    let where_expr = statement
        .where_clause
        .as_ref()
        .map(|w| LogicalExpr::from(w.conditions.clone()));
    let residual_predicates = predicate_distribution::distribute_predicates(
        &mut graph,
        where_expr,
        &columns,
        config.cross_predicate_policy,
    )?;

    let select_columns =
        output_header::resolve_select_columns(&graph, &statement.select_clause, &columns)?;

    let mut plans = Vec::with_capacity(graph.components().len());
    for index in 0..graph.components().len() {
        let header = Arc::new(output_header::allocate_output_header(
            &graph,
            index,
            &select_columns,
        )?);
        let segments = synthesize_component_segments(&mut graph, index, &header)?;
        plans.push(build_plan(&graph, index, header, segments, config)?);
    }

    debug!(
        "compile: {} plan(s), {} residual predicate(s)",
        plans.len(),
        residual_predicates.len()
    );

    Ok(CompiledQuery {
        plans,
        residual_predicates,
    })
}

fn build_plan(
    graph: &PatternGraph,
    index: usize,
    header: Arc<OutputHeader>,
    segments: Vec<(String, String)>,
    config: &CompilerConfig,
) -> Result<CompiledPlan, QueryPlannerError> {
    let component = &graph.components()[index];
    let record_zero = RecordZero::build(graph, component, &header);
    let root = join_pipeline::linearize(graph, component, Arc::clone(&header), config)?;
    Ok(CompiledPlan {
        component: component.key.clone(),
        header,
        record_zero,
        segments,
        root,
    })
}
