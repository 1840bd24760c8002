use nom::{combinator::cut, error::context, Parser};

use super::ast::WhereClause;
use super::common::{keyword, PResult};
use super::expression::parse_expression;

pub fn parse_where_clause(input: &'_ str) -> PResult<'_, WhereClause<'_>> {
    let (input, _) = keyword("WHERE").parse(input)?;

    let (input, conditions) =
        context("Error in where clause", cut(parse_expression)).parse(input)?;

    Ok((input, WhereClause { conditions }))
}
