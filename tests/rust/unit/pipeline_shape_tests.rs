//! Unit tests for join pipeline shape and header layout
//!
//! Every out-tree pattern (chain or star) must linearize to exactly one stage
//! per node, and the header must hold one triad per node plus the selected
//! plain columns.

#[cfg(test)]
mod pipeline_shape_tests {
    use docgraph::compile_query;
    use docgraph::config::CompilerConfig;
    use docgraph::graph_catalog::CatalogConfig;
    use test_case::test_case;

    #[test_case("SELECT * FROM T a MATCH a-[r]->b", 2 ; "single hop")]
    #[test_case("SELECT * FROM T a MATCH a-[r]->b-[r]->c-[r]->d-[r]->e", 5 ; "chain")]
    #[test_case("SELECT * FROM T a MATCH a-[r]->b, a-[r]->c, a-[r]->d", 4 ; "star")]
    #[test_case("SELECT * FROM T a MATCH a-[r]->b-[r]->c, b-[r]->d", 4 ; "branching tree")]
    #[test_case("SELECT * FROM T a MATCH a<-[r]-b<-[r]-c", 3 ; "reversed chain")]
    fn test_out_tree_has_one_stage_per_node(query: &str, nodes: usize) {
        let compiled =
            compile_query(query, &CatalogConfig::default(), &CompilerConfig::default()).unwrap();
        let plan = compiled.main_plan().unwrap();

        assert_eq!(plan.header.node_count(), nodes);
        assert_eq!(plan.root.len(), nodes);

        let stages = plan.root.stages_in_order();
        assert!(stages[0].is_seed());
        assert_eq!(stages[0].source_alias, "");
        assert!(stages[1..].iter().all(|s| s.traversal.is_some()));

        // every later stage starts from a node an earlier stage produced
        for (i, stage) in stages.iter().enumerate().skip(1) {
            assert!(
                stages[..i]
                    .iter()
                    .any(|earlier| earlier.sink_alias == stage.source_alias),
                "stage {} starts at `{}`, which no earlier stage reached",
                i,
                stage.source_alias
            );
        }
    }

    #[test_case("SELECT a.name FROM T a MATCH a-[r]->b", 1 ; "one column")]
    #[test_case("SELECT a.name, b.name, a.name FROM T a MATCH a-[r]->b", 2 ; "duplicate column")]
    #[test_case("SELECT *, a.*, 'x', 42 FROM T a MATCH a-[r]->b", 0 ; "wildcards and literals")]
    #[test_case("SELECT a.x + 1, UPPER(b.name), b.id FROM T a MATCH a-[r]->b", 1 ; "computed expressions")]
    fn test_header_length_is_triads_plus_plain_columns(query: &str, selected: usize) {
        let compiled =
            compile_query(query, &CatalogConfig::default(), &CompilerConfig::default()).unwrap();
        let header = &compiled.main_plan().unwrap().header;

        assert_eq!(header.len(), 3 * 2 + selected);
        for (i, alias) in ["a", "b"].iter().enumerate() {
            assert_eq!(header.columns()[3 * i], *alias);
            assert_eq!(header.columns()[3 * i + 1], format!("{}_ADJ", alias));
            assert_eq!(header.columns()[3 * i + 2], format!("{}_SEG", alias));
        }
    }
}
