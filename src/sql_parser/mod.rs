//! Parser for the graph-pattern SELECT dialect.
//!
//! ```text
//! SELECT a.name, b.name
//! FROM Person AS a, Person AS b
//! MATCH a-[knows AS e]->b
//! WHERE a.age > 20 AND e.since > 2010
//! ```
//!
//! Only the subset needed by the pattern compiler is recognised: a select
//! list, a FROM list of aliased tables, comma-separated MATCH paths and a
//! WHERE expression.

use ast::SelectStatement;
use common::ws;
use errors::SqlParsingError;
use nom::{
    character::complete::{char, multispace0},
    combinator::opt,
    Parser,
};

pub mod ast;
mod common;
pub mod errors;
mod expression;
mod from_clause;
mod match_clause;
mod select_clause;
mod where_clause;

pub use common::PResult;

pub fn parse_statement(input: &'_ str) -> PResult<'_, SelectStatement<'_>> {
    let (input, _) = multispace0(input)?;
    let (input, select_clause) = select_clause::parse_select_clause(input)?;
    let (input, from_clause) = from_clause::parse_from_clause(input)?;
    let (input, match_clause) = opt(match_clause::parse_match_clause).parse(input)?;
    let (input, where_clause) = opt(where_clause::parse_where_clause).parse(input)?;
    let (input, _) = opt(ws(char(';'))).parse(input)?;

    Ok((
        input,
        SelectStatement {
            select_clause,
            from_clause,
            match_clause,
            where_clause,
        },
    ))
}

/// Parse a whole query; anything left unconsumed is an error.
pub fn parse_query(input: &'_ str) -> Result<SelectStatement<'_>, SqlParsingError<'_>> {
    match parse_statement(input) {
        Ok((rest, statement)) => {
            if rest.trim().is_empty() {
                Ok(statement)
            } else {
                Err(SqlParsingError::new(rest, "Unexpected trailing input"))
            }
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(e),
        Err(nom::Err::Incomplete(_)) => Err(SqlParsingError::new(input, "Incomplete query")),
    }
}
