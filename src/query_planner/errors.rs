use thiserror::Error;

use crate::docdb_query_generator::errors::QueryGeneratorError;

/// Structural problems in the MATCH pattern. Any of these aborts the compile.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PatternGraphError {
    #[error("Alias `{0}` was used before it was registered")]
    UnregisteredAlias(String),
    #[error("Alias `{0}` is not declared in the FROM clause")]
    UnresolvedAlias(String),
    #[error("Alias `{0}` is already bound to another node or edge")]
    DuplicateAlias(String),
    #[error("Empty alias in pattern")]
    EmptyAlias,
    #[error("Edge between `{from}` and `{to}` has no adjacency column")]
    MissingEdgeColumn { from: String, to: String },
    #[error("Invalid hop range {min}..{max} on edge `{edge}`")]
    InvalidHopRange { edge: String, min: u32, max: u32 },
    #[error("Table `{table}` has no edge column `{column}`")]
    UnknownEdgeColumn { table: String, column: String },
    #[error("Component `{0}` has no nodes to linearize")]
    EmptyComponent(String),
    #[error("Header column `{column}` of alias `{alias}` collides with an earlier node's column")]
    HeaderCollision { alias: String, column: String },
}

/// Failures while binding WHERE predicates to pattern aliases.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BindingError {
    #[error("Column `{0}` does not belong to any table in the FROM clause")]
    UnresolvedColumn(String),
    #[error("Column `{column}` is ambiguous; it is declared by {aliases:?}")]
    AmbiguousColumn {
        column: String,
        aliases: Vec<String>,
    },
    #[error("Unknown alias `{0}` in predicate")]
    UnknownAlias(String),
    #[error("Predicate `{predicate}` spans several aliases ({aliases:?}) and cannot be pushed down")]
    CrossAliasPredicate {
        predicate: String,
        aliases: Vec<String>,
    },
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryPlannerError {
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("PatternGraphError: {0}")]
    PatternGraph(#[from] PatternGraphError),
    #[error("BindingError: {0}")]
    Binding(#[from] BindingError),
    #[error("QueryGeneratorError: {0}")]
    QueryGenerator(#[from] QueryGeneratorError),
}
