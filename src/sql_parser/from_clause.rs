use nom::{
    character::complete::char,
    combinator::{cut, opt},
    error::context,
    multi::separated_list1,
    sequence::preceded,
    Parser,
};

use super::ast::{FromClause, TableReference};
use super::common::{keyword, parse_identifier, ws, PResult};

pub fn parse_from_clause(input: &'_ str) -> PResult<'_, FromClause<'_>> {
    let (input, _) = keyword("FROM").parse(input)?;

    let (input, table_references) = context(
        "Error in from clause",
        separated_list1(ws(char(',')), cut(parse_table_reference)),
    )
    .parse(input)?;

    Ok((input, FromClause { table_references }))
}

fn parse_table_reference(input: &'_ str) -> PResult<'_, TableReference<'_>> {
    let (input, table_name) = ws(parse_identifier).parse(input)?;
    let (input, alias) = opt(preceded(opt(keyword("AS")), ws(parse_identifier))).parse(input)?;
    Ok((
        input,
        TableReference {
            table_name,
            alias: alias.unwrap_or(table_name),
        },
    ))
}
