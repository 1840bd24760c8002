use nom::{
    branch::alt,
    character::complete::{char, digit1, multispace0},
    combinator::{cut, map, opt},
    error::context,
    multi::separated_list1,
    sequence::{delimited, preceded, separated_pair},
    Parser,
};

use super::ast::{EdgeReference, Literal, MatchClause, MatchPath, PathStep};
use super::common::{keyword, parse_identifier, ws, PResult};
use super::errors::SqlParsingError;
use super::expression::parse_literal;

/// Upper bound on hops written in one path. Guards the recursive-descent
/// parser against adversarial inputs; real patterns stay far below it.
const MAX_PATH_LENGTH: usize = 50;

pub fn parse_match_clause(input: &'_ str) -> PResult<'_, MatchClause<'_>> {
    let (input, _) = keyword("MATCH").parse(input)?;

    let (input, paths) = context(
        "Error in match clause",
        separated_list1(ws(char(',')), cut(parse_match_path)),
    )
    .parse(input)?;

    Ok((input, MatchClause { paths }))
}

/// `a`, `(a)`
fn parse_node_alias(input: &str) -> PResult<'_, &str> {
    ws(alt((
        delimited(ws(char('(')), parse_identifier, ws(char(')'))),
        parse_identifier,
    )))
    .parse(input)
}

#[derive(Debug, PartialEq, Clone, Copy)]
enum Arrow {
    Forward,
    Reverse,
}

/// `-[ ... ]->` or `<-[ ... ]-`
fn parse_hop(input: &'_ str) -> PResult<'_, (Arrow, EdgeReference<'_>)> {
    alt((
        map(
            delimited(
                (char('-'), multispace0, char('[')),
                cut(parse_edge_body),
                (char(']'), multispace0, char('-'), multispace0, char('>')),
            ),
            |edge| (Arrow::Forward, edge),
        ),
        map(
            delimited(
                (char('<'), multispace0, char('-'), multispace0, char('[')),
                cut(parse_edge_body),
                (char(']'), multispace0, char('-')),
            ),
            |edge| (Arrow::Reverse, edge),
        ),
    ))
    .parse(input)
}

pub fn parse_match_path(input: &'_ str) -> PResult<'_, MatchPath<'_>> {
    let (mut input, first) = parse_node_alias(input)?;

    let mut hops: Vec<(&str, Arrow, EdgeReference)> = Vec::new();
    let mut current = first;
    loop {
        let (rest, _) = multispace0(input)?;
        match parse_hop(rest) {
            Ok((rest, (arrow, edge))) => {
                if hops.len() >= MAX_PATH_LENGTH {
                    return Err(nom::Err::Failure(SqlParsingError::new(
                        rest,
                        "MATCH path exceeds the maximum number of hops",
                    )));
                }
                let (rest, next) = context("Expected node after edge", cut(parse_node_alias))
                    .parse(rest)?;
                hops.push((current, arrow, edge));
                current = next;
                input = rest;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }

    let is_reversed = matches!(hops.first(), Some((_, Arrow::Reverse, _)));
    if hops
        .iter()
        .any(|(_, arrow, _)| (*arrow == Arrow::Reverse) != is_reversed)
    {
        return Err(nom::Err::Failure(SqlParsingError::new(
            input,
            "Mixed edge directions within one MATCH path are not supported. Split the path into separate comma-separated paths.",
        )));
    }

    let steps = hops
        .into_iter()
        .map(|(node_alias, _, edge)| PathStep { node_alias, edge })
        .collect();

    Ok((
        input,
        MatchPath {
            steps,
            tail: current,
            is_reversed,
        },
    ))
}

/// `knows`, `knows AS e`, `e:knows`, optionally followed by `*min..max` and an
/// attribute map `{key: literal, ...}`.
fn parse_edge_body(input: &'_ str) -> PResult<'_, EdgeReference<'_>> {
    let (input, _) = multispace0(input)?;
    let (input, (alias, edge_column)) = alt((
        map(
            separated_pair(parse_identifier, ws(char(':')), parse_identifier),
            |(alias, column)| (Some(alias), column),
        ),
        map(parse_identifier, |column| (None, column)),
    ))
    .parse(input)?;

    let (input, hops) = opt(preceded(ws(char('*')), parse_hop_range)).parse(input)?;
    let (min_hops, max_hops) = hops.unwrap_or((1, 1));

    let (input, as_alias) = opt(preceded(keyword("AS"), parse_identifier)).parse(input)?;
    let alias = match (alias, as_alias) {
        (Some(_), Some(_)) => {
            return Err(nom::Err::Failure(SqlParsingError::new(
                input,
                "Edge alias given twice (both `alias:` and `AS alias`)",
            )))
        }
        (alias, as_alias) => alias.or(as_alias),
    };

    let (input, attributes) = opt(parse_attribute_map).parse(input)?;
    let (input, _) = multispace0(input)?;

    Ok((
        input,
        EdgeReference {
            edge_column,
            alias,
            min_hops,
            max_hops,
            attributes: attributes.unwrap_or_default(),
        },
    ))
}

fn parse_hop_count(input: &str) -> PResult<'_, u32> {
    let (rest, digits) = digit1(input)?;
    match digits.parse::<u32>() {
        Ok(n) => Ok((rest, n)),
        Err(_) => Err(nom::Err::Failure(SqlParsingError::new(
            input,
            "Hop count out of range",
        ))),
    }
}

/// `2` (exactly two), `1..3`, `..3` (one to three). An open upper bound is
/// rejected: variable-length segments must be bounded.
fn parse_hop_range(input: &str) -> PResult<'_, (u32, u32)> {
    let (input, _) = multispace0(input)?;
    let (input, min) = opt(parse_hop_count).parse(input)?;
    let (input, range) = opt((char('.'), char('.'))).parse(input)?;
    match (min, range) {
        (Some(n), None) => Ok((input, (n, n))),
        (min, Some(_)) => {
            let (input, max) = context(
                "Variable-length edge requires an upper hop bound",
                cut(parse_hop_count),
            )
            .parse(input)?;
            Ok((input, (min.unwrap_or(1), max)))
        }
        (None, None) => Err(nom::Err::Failure(SqlParsingError::new(
            input,
            "Variable-length edge requires hop bounds such as *1..3",
        ))),
    }
}

fn parse_attribute_map(input: &'_ str) -> PResult<'_, Vec<(&'_ str, Literal<'_>)>> {
    delimited(
        ws(char('{')),
        separated_list1(
            ws(char(',')),
            separated_pair(ws(parse_identifier), char(':'), ws(parse_literal)),
        ),
        ws(char('}')),
    )
    .parse(input)
}
