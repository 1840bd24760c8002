use nom::{
    bytes::complete::{tag_no_case, take_while},
    character::complete::{multispace0, satisfy},
    combinator::{not, peek, recognize},
    error::ParseError,
    sequence::{delimited, pair, terminated},
    IResult, Parser,
};

use super::errors::SqlParsingError;

pub type PResult<'a, O> = IResult<&'a str, O, SqlParsingError<'a>>;

/// Words that can never be used as an alias, column or table name.
const RESERVED_KEYWORDS: &[&str] = &[
    "SELECT", "FROM", "MATCH", "WHERE", "AS", "AND", "OR", "NOT", "IN", "IS", "NULL", "TRUE",
    "FALSE",
];

pub fn ws<'a, O, E: ParseError<&'a str>, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
{
    delimited(multispace0, inner, multispace0)
}

pub fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

pub fn is_reserved_keyword(word: &str) -> bool {
    RESERVED_KEYWORDS
        .iter()
        .any(|keyword| keyword.eq_ignore_ascii_case(word))
}

/// Case-insensitive keyword that must not run into a following identifier
/// character, so `OR` never matches the front of `ORDER` or `ORIGIN`.
pub fn keyword<'a, E: ParseError<&'a str>>(
    kw: &'static str,
) -> impl Parser<&'a str, Output = &'a str, Error = E> {
    ws(terminated(
        tag_no_case(kw),
        not(peek(satisfy(is_identifier_char))),
    ))
}

/// A letter or underscore followed by letters, digits or underscores.
/// Reserved keywords are rejected.
pub fn parse_identifier(input: &str) -> PResult<'_, &str> {
    let (rest, ident) = recognize(pair(
        satisfy(|c: char| c.is_alphabetic() || c == '_'),
        take_while(is_identifier_char),
    ))
    .parse(input)?;

    if is_reserved_keyword(ident) {
        return Err(nom::Err::Error(SqlParsingError::new(
            input,
            "Reserved keyword cannot be used as an identifier",
        )));
    }
    Ok((rest, ident))
}
