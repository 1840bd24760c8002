//! Conversions from the borrowed parser AST into owned logical expressions.

use super::{Column, Literal, LogicalExpr, Operator, OperatorApplication, ScalarFnCall};
use crate::sql_parser::ast;

impl<'a> From<ast::Literal<'a>> for Literal {
    fn from(value: ast::Literal<'a>) -> Self {
        match value {
            ast::Literal::Integer(i) => Literal::Integer(i),
            ast::Literal::Float(f) => Literal::Float(f),
            ast::Literal::Boolean(b) => Literal::Boolean(b),
            ast::Literal::String(s) => Literal::String(s.to_string()),
            ast::Literal::Null => Literal::Null,
        }
    }
}

impl From<ast::Operator> for Operator {
    fn from(value: ast::Operator) -> Self {
        match value {
            ast::Operator::Addition => Operator::Addition,
            ast::Operator::Subtraction => Operator::Subtraction,
            ast::Operator::Multiplication => Operator::Multiplication,
            ast::Operator::Division => Operator::Division,
            ast::Operator::ModuloDivision => Operator::ModuloDivision,
            ast::Operator::Equal => Operator::Equal,
            ast::Operator::NotEqual => Operator::NotEqual,
            ast::Operator::LessThan => Operator::LessThan,
            ast::Operator::GreaterThan => Operator::GreaterThan,
            ast::Operator::LessThanEqual => Operator::LessThanEqual,
            ast::Operator::GreaterThanEqual => Operator::GreaterThanEqual,
            ast::Operator::And => Operator::And,
            ast::Operator::Or => Operator::Or,
            ast::Operator::In => Operator::In,
            ast::Operator::NotIn => Operator::NotIn,
            ast::Operator::Not => Operator::Not,
            ast::Operator::Negation => Operator::Negation,
            ast::Operator::IsNull => Operator::IsNull,
            ast::Operator::IsNotNull => Operator::IsNotNull,
        }
    }
}

impl<'a> From<ast::ColumnReference<'a>> for Column {
    fn from(value: ast::ColumnReference<'a>) -> Self {
        Column {
            table_alias: value.qualifier.map(|q| q.to_string()),
            column: value.column.to_string(),
        }
    }
}

impl<'a> From<ast::OperatorApplication<'a>> for OperatorApplication {
    fn from(value: ast::OperatorApplication<'a>) -> Self {
        OperatorApplication {
            operator: value.operator.into(),
            operands: value.operands.into_iter().map(LogicalExpr::from).collect(),
        }
    }
}

impl<'a> From<ast::FunctionCall<'a>> for ScalarFnCall {
    fn from(value: ast::FunctionCall<'a>) -> Self {
        ScalarFnCall {
            name: value.name.to_string(),
            args: value.args.into_iter().map(LogicalExpr::from).collect(),
        }
    }
}

impl<'a> From<ast::Expression<'a>> for LogicalExpr {
    fn from(expr: ast::Expression<'a>) -> Self {
        match expr {
            ast::Expression::Literal(literal) => LogicalExpr::Literal(literal.into()),
            ast::Expression::Column(column) => LogicalExpr::Column(column.into()),
            ast::Expression::Parameter(name) => LogicalExpr::Parameter(name.to_string()),
            ast::Expression::List(items) => {
                LogicalExpr::List(items.into_iter().map(LogicalExpr::from).collect())
            }
            ast::Expression::FunctionCallExp(call) => LogicalExpr::ScalarFnCall(call.into()),
            ast::Expression::OperatorApplicationExp(op) => {
                LogicalExpr::OperatorApplicationExp(op.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_where_round_trips_through_display() {
        let statement = crate::sql_parser::parse_query(
            "SELECT * FROM Person a WHERE (a.x = 1 OR a.y != 'z') AND NOT a.w IN (1, 2)",
        )
        .unwrap();
        let expr = LogicalExpr::from(statement.where_clause.unwrap().conditions);
        assert_eq!(
            expr.to_string(),
            "(a.x = 1 OR a.y != 'z') AND NOT a.w IN (1, 2)"
        );
    }
}
