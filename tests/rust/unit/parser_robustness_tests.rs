//! Unit tests for query parsing edge cases and error handling
//!
//! Tests malformed queries, edge cases, and error conditions to ensure
//! robust parsing without panics.

#[cfg(test)]
mod parser_robustness_tests {
    use docgraph::sql_parser::ast::{Expression, SelectItem};
    use docgraph::sql_parser::parse_query;
    use test_case::test_case;

    /// Test that malformed queries don't cause panics
    #[test]
    fn test_malformed_queries_no_panic() {
        let malformed_queries = vec![
            "",
            "SELECT",
            "SELECT * FROM",
            "SELECT * FROM Person a MATCH",
            "SELECT * FROM Person a MATCH a-",
            "SELECT * FROM Person a MATCH a-[",
            "SELECT * FROM Person a MATCH a-[knows",
            "SELECT * FROM Person a MATCH a-[knows]",
            "SELECT * FROM Person a MATCH a-[knows]-",
            "SELECT * FROM Person a MATCH a-[knows]->",
            "SELECT * FROM Person a WHERE",
            "SELECT * FROM Person a WHERE a.age >",
            "SELECT * FROM Person a WHERE (a.age > 1",
            "SELECT * FROM Person a MATCH a-[knows*]->b",
            "SELECT * FROM Person a MATCH a-[knows*3..]->b",
            "SELECT * FROM Person a MATCH a-[knows]->b<-[knows]-c",
            "SELECT * FROM Person a MATCH a-[e:knows AS f]->b",
            "SELECT * FROM Person a ORDER BY a.name",
            "SELECT * FROM Person a WHERE a.name = 'unterminated",
        ];

        for query in malformed_queries {
            assert!(parse_query(query).is_err(), "expected error for {:?}", query);
        }
    }

    #[test_case("select * from Person a" ; "lowercase keywords")]
    #[test_case("SeLeCt * FrOm Person a MaTcH a-[knows]->b WhErE a.age > 1" ; "mixed case keywords")]
    #[test_case("SELECT * FROM Person AS a;" ; "explicit AS and semicolon")]
    #[test_case("  SELECT *\n  FROM Person a\n  MATCH a -[ knows ]-> b\n" ; "extra whitespace")]
    fn test_accepts_keyword_and_spacing_variants(query: &str) {
        assert!(parse_query(query).is_ok(), "failed to parse {:?}", query);
    }

    #[test]
    fn test_error_report_points_at_failure() {
        let err = parse_query("SELECT * FROM Person a LIMIT 3").unwrap_err();
        let report = err.to_report();
        assert!(report.contains("LIMIT 3"), "report was {}", report);
    }

    #[test]
    fn test_keyword_prefixed_identifiers_are_columns() {
        let statement =
            parse_query("SELECT a.origin, a.order_count FROM Person a WHERE a.notes IS NULL")
                .unwrap();
        assert_eq!(statement.select_clause.select_items.len(), 2);
        assert!(matches!(
            &statement.select_clause.select_items[0],
            SelectItem::Expression {
                expression: Expression::Column(c),
                ..
            } if c.column == "origin"
        ));
    }
}
