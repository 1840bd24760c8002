//! DocGraph - graph-pattern query compiler for document stores
//!
//! This crate compiles `SELECT ... FROM ... MATCH ... WHERE ...` statements
//! into plans an external engine runs against adjacency lists stored inside
//! documents:
//! - a pattern graph of aliased nodes and edges
//! - per-node native query segments with pushed-down predicates
//! - a left-deep pipeline of join stages sharing one output header

pub mod config;
pub mod docdb_query_generator;
pub mod graph_catalog;
pub mod query_planner;
pub mod sql_parser;

use config::CompilerConfig;
use graph_catalog::SchemaCatalog;
use query_planner::{CompiledQuery, QueryPlannerError};

/// Parse and compile `query` in one step.
pub fn compile_query(
    query: &str,
    catalog: &dyn SchemaCatalog,
    config: &CompilerConfig,
) -> Result<CompiledQuery, QueryPlannerError> {
    let statement =
        sql_parser::parse_query(query).map_err(|e| QueryPlannerError::Parse(e.to_report()))?;
    log::debug!("compile_query: parsed statement\n{}", statement);
    query_planner::compile(&statement, catalog, config)
}
