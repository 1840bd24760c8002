//! Pushes WHERE conjuncts down onto the node or edge they constrain.

use log::{debug, warn};

use super::errors::BindingError;
use super::logical_expr::{Column, LogicalExpr};
use super::pattern_graph::{PatternElement, PatternGraph};
use crate::config::CrossPredicatePolicy;
use crate::graph_catalog::ColumnAliasMap;

/// Qualify `column` with its owning pattern alias and return that element.
///
/// Qualified references are normalized to the alias's first spelling.
/// Bare references go through the catalogue and must have exactly one owner.
pub(crate) fn resolve_column(
    graph: &PatternGraph,
    columns: &ColumnAliasMap,
    column: &mut Column,
) -> Result<PatternElement, BindingError> {
    let alias = match &column.table_alias {
        Some(alias) => alias.clone(),
        None => match columns.owners(&column.column) {
            [] => return Err(BindingError::UnresolvedColumn(column.column.clone())),
            [owner] => owner.clone(),
            owners => {
                return Err(BindingError::AmbiguousColumn {
                    column: column.column.clone(),
                    aliases: owners.to_vec(),
                })
            }
        },
    };

    let element = graph
        .element_for(&alias)
        .ok_or_else(|| BindingError::UnknownAlias(alias.clone()))?;
    let canonical = match element {
        PatternElement::Node(id) => &graph.node(id).alias,
        PatternElement::Edge(id) => &graph.edge(id).alias,
    };
    column.table_alias = Some(canonical.clone());
    Ok(element)
}

/// Attach each conjunct of `where_expr` to the single node or edge it
/// references. Returns the conjuncts that could not be pushed down: constant
/// predicates, and cross-alias predicates under [`CrossPredicatePolicy::Residual`].
pub fn distribute_predicates(
    graph: &mut PatternGraph,
    where_expr: Option<LogicalExpr>,
    columns: &ColumnAliasMap,
    policy: CrossPredicatePolicy,
) -> Result<Vec<LogicalExpr>, BindingError> {
    let Some(where_expr) = where_expr else {
        return Ok(vec![]);
    };

    let mut residual = vec![];
    for mut conjunct in where_expr.split_conjunction() {
        let mut owners: Vec<PatternElement> = vec![];
        conjunct.try_for_each_column_mut(&mut |column| {
            let element = resolve_column(graph, columns, column)?;
            if !owners.contains(&element) {
                owners.push(element);
            }
            Ok::<(), BindingError>(())
        })?;

        match owners.as_slice() {
            [] => {
                debug!("predicate_distribution: constant predicate `{}` kept residual", conjunct);
                residual.push(conjunct);
            }
            [PatternElement::Node(id)] => {
                debug!(
                    "predicate_distribution: `{}` -> node `{}`",
                    conjunct,
                    graph.node(*id).alias
                );
                graph.node_mut(*id).predicates.push(conjunct);
            }
            [PatternElement::Edge(id)] => {
                debug!(
                    "predicate_distribution: `{}` -> edge `{}`",
                    conjunct,
                    graph.edge(*id).alias
                );
                graph.edge_mut(*id).predicates.push(conjunct);
            }
            many => {
                let aliases: Vec<String> = many
                    .iter()
                    .map(|element| match element {
                        PatternElement::Node(id) => graph.node(*id).alias.clone(),
                        PatternElement::Edge(id) => graph.edge(*id).alias.clone(),
                    })
                    .collect();
                match policy {
                    CrossPredicatePolicy::Residual => {
                        warn!(
                            "predicate `{}` spans aliases {:?}; left for post-filtering",
                            conjunct, aliases
                        );
                        residual.push(conjunct);
                    }
                    CrossPredicatePolicy::Reject => {
                        return Err(BindingError::CrossAliasPredicate {
                            predicate: conjunct.to_string(),
                            aliases,
                        })
                    }
                }
            }
        }
    }
    Ok(residual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompilerConfig;
    use crate::graph_catalog::CatalogConfig;
    use crate::query_planner::graph_builder::build_pattern_graph;
    use crate::sql_parser::parse_query;

    fn distribute(
        query: &str,
        policy: CrossPredicatePolicy,
    ) -> Result<(PatternGraph, Vec<LogicalExpr>), BindingError> {
        let catalog = CatalogConfig::default()
            .with_table("Person", &["name", "age"], &["knows"])
            .with_table("City", &["name", "population"], &[]);
        let statement = parse_query(query).unwrap();
        let mut graph = build_pattern_graph(
            &statement.from_clause,
            statement.match_clause.as_ref(),
            &catalog,
            &CompilerConfig::default(),
        )
        .unwrap();
        let columns = ColumnAliasMap::build(
            statement
                .from_clause
                .table_references
                .iter()
                .map(|t| (t.table_name, t.alias)),
            &catalog,
        );
        let where_expr = statement.where_clause.map(|w| LogicalExpr::from(w.conditions));
        let residual = distribute_predicates(&mut graph, where_expr, &columns, policy)?;
        Ok((graph, residual))
    }

    fn node_predicates(graph: &PatternGraph, alias: &str) -> Vec<String> {
        graph
            .node_by_alias(alias)
            .unwrap()
            .predicates
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_conjuncts_go_to_their_alias_in_order() {
        let (graph, residual) = distribute(
            "SELECT * FROM Person a, Person b MATCH a-[knows AS e]->b \
             WHERE a.age > 20 AND e.since > 2010 AND b.name = 'x' AND a.name != 'y'",
            CrossPredicatePolicy::Residual,
        )
        .unwrap();
        assert!(residual.is_empty());
        assert_eq!(node_predicates(&graph, "a"), vec!["a.age > 20", "a.name != 'y'"]);
        assert_eq!(node_predicates(&graph, "b"), vec!["b.name = 'x'"]);
        let (_, edge) = graph.edges().next().unwrap();
        assert_eq!(edge.predicates[0].to_string(), "e.since > 2010");
    }

    #[test]
    fn test_disjunction_is_one_conjunct() {
        let (graph, _) = distribute(
            "SELECT * FROM Person a WHERE a.age < 10 OR a.age > 90",
            CrossPredicatePolicy::Residual,
        )
        .unwrap();
        assert_eq!(node_predicates(&graph, "a"), vec!["a.age < 10 OR a.age > 90"]);
    }

    #[test]
    fn test_bare_columns_are_qualified_through_catalog() {
        let (graph, _) = distribute(
            "SELECT * FROM Person a, City c WHERE age > 20 AND population > 1000",
            CrossPredicatePolicy::Residual,
        )
        .unwrap();
        assert_eq!(node_predicates(&graph, "a"), vec!["a.age > 20"]);
        assert_eq!(node_predicates(&graph, "c"), vec!["c.population > 1000"]);
    }

    #[test]
    fn test_qualifier_normalized_to_first_spelling() {
        let (graph, _) = distribute(
            "SELECT * FROM Person Alice WHERE ALICE.age > 20",
            CrossPredicatePolicy::Residual,
        )
        .unwrap();
        assert_eq!(node_predicates(&graph, "alice"), vec!["Alice.age > 20"]);
    }

    #[test]
    fn test_cross_alias_and_constant_predicates_are_residual() {
        let (graph, residual) = distribute(
            "SELECT * FROM Person a, Person b WHERE a.age > b.age AND 1 = 1",
            CrossPredicatePolicy::Residual,
        )
        .unwrap();
        let residual: Vec<_> = residual.iter().map(ToString::to_string).collect();
        assert_eq!(residual, vec!["a.age > b.age", "1 = 1"]);
        assert!(node_predicates(&graph, "a").is_empty());
        assert!(node_predicates(&graph, "b").is_empty());
    }

    #[test]
    fn test_cross_alias_rejected_under_reject_policy() {
        let err = distribute(
            "SELECT * FROM Person a, Person b WHERE a.age > b.age",
            CrossPredicatePolicy::Reject,
        )
        .unwrap_err();
        assert_eq!(
            err,
            BindingError::CrossAliasPredicate {
                predicate: "a.age > b.age".to_string(),
                aliases: vec!["a".to_string(), "b".to_string()],
            }
        );
    }

    #[test]
    fn test_binding_errors() {
        assert_eq!(
            distribute("SELECT * FROM Person a WHERE z.age > 1", CrossPredicatePolicy::Residual)
                .unwrap_err(),
            BindingError::UnknownAlias("z".to_string())
        );
        assert_eq!(
            distribute("SELECT * FROM Person a WHERE height > 1", CrossPredicatePolicy::Residual)
                .unwrap_err(),
            BindingError::UnresolvedColumn("height".to_string())
        );
        assert!(matches!(
            distribute(
                "SELECT * FROM Person a, City c WHERE name = 'x'",
                CrossPredicatePolicy::Residual
            ),
            Err(BindingError::AmbiguousColumn { .. })
        ));
    }
}
