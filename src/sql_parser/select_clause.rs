use nom::{
    branch::alt,
    character::complete::char,
    combinator::{cut, map, opt},
    error::context,
    multi::separated_list1,
    sequence::{preceded, terminated},
    Parser,
};

use super::ast::{SelectClause, SelectItem};
use super::common::{keyword, parse_identifier, ws, PResult};
use super::expression::parse_expression;

pub fn parse_select_clause(input: &'_ str) -> PResult<'_, SelectClause<'_>> {
    let (input, _) = keyword("SELECT").parse(input)?;

    let (input, select_items) = context(
        "Error in select clause",
        separated_list1(ws(char(',')), cut(parse_select_item)),
    )
    .parse(input)?;

    Ok((input, SelectClause { select_items }))
}

fn parse_select_item(input: &'_ str) -> PResult<'_, SelectItem<'_>> {
    ws(alt((
        map(char('*'), |_| SelectItem::Wildcard),
        map(
            terminated(parse_identifier, (char('.'), char('*'))),
            SelectItem::QualifiedWildcard,
        ),
        map(
            (parse_expression, opt(preceded(keyword("AS"), parse_identifier))),
            |(expression, alias)| SelectItem::Expression { expression, alias },
        ),
    )))
    .parse(input)
}
