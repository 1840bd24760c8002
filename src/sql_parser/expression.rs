use nom::{
    branch::alt,
    bytes::complete::take_until,
    character::complete::{char, digit1},
    combinator::{map, opt, recognize},
    multi::separated_list0,
    sequence::{delimited, pair, preceded},
    Parser,
};

use super::ast::{ColumnReference, Expression, FunctionCall, Literal, Operator};
use super::common::{keyword, parse_identifier, ws, PResult};
use super::errors::SqlParsingError;

pub fn parse_expression(input: &'_ str) -> PResult<'_, Expression<'_>> {
    parse_logical_or(input)
}

fn parse_logical_or(input: &'_ str) -> PResult<'_, Expression<'_>> {
    let (input, lhs) = parse_logical_and(input)?;

    let mut remaining_input = input;
    let mut final_expression = lhs;

    loop {
        let res = preceded(keyword("OR"), parse_logical_and).parse(remaining_input);
        match res {
            Ok((new_input, rhs)) => {
                final_expression = Expression::binary(Operator::Or, final_expression, rhs);
                remaining_input = new_input;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }
    Ok((remaining_input, final_expression))
}

fn parse_logical_and(input: &'_ str) -> PResult<'_, Expression<'_>> {
    let (input, lhs) = parse_not_expression(input)?;

    let mut remaining_input = input;
    let mut final_expression = lhs;

    loop {
        let res = preceded(keyword("AND"), parse_not_expression).parse(remaining_input);
        match res {
            Ok((new_input, rhs)) => {
                final_expression = Expression::binary(Operator::And, final_expression, rhs);
                remaining_input = new_input;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }
    Ok((remaining_input, final_expression))
}

fn parse_not_expression(input: &'_ str) -> PResult<'_, Expression<'_>> {
    if let Ok((rest, _)) = keyword::<SqlParsingError>("NOT").parse(input) {
        let (rest, operand) = parse_not_expression(rest)?;
        return Ok((rest, Expression::unary(Operator::Not, operand)));
    }
    parse_comparison_expression(input)
}

fn parse_comparison_operator(input: &str) -> PResult<'_, Operator> {
    ws(alt((
        map(pair(char('>'), char('=')), |_| Operator::GreaterThanEqual),
        map(pair(char('<'), char('=')), |_| Operator::LessThanEqual),
        map(pair(char('<'), char('>')), |_| Operator::NotEqual),
        map(pair(char('!'), char('=')), |_| Operator::NotEqual),
        map(char('='), |_| Operator::Equal),
        map(char('<'), |_| Operator::LessThan),
        map(char('>'), |_| Operator::GreaterThan),
    )))
    .parse(input)
}

/// Comparisons are non-associative: `a < b < c` is rejected by leaving the
/// second operator unconsumed.
fn parse_comparison_expression(input: &'_ str) -> PResult<'_, Expression<'_>> {
    let (input, lhs) = parse_additive_expression(input)?;

    // IS [NOT] NULL
    if let Ok((rest, _)) = keyword::<SqlParsingError>("IS").parse(input) {
        let (rest, negated) = opt(keyword("NOT")).parse(rest)?;
        let (rest, _) = keyword("NULL").parse(rest)?;
        let operator = if negated.is_some() {
            Operator::IsNotNull
        } else {
            Operator::IsNull
        };
        return Ok((rest, Expression::unary(operator, lhs)));
    }

    // [NOT] IN (v1, v2, ...)
    let in_operator = alt((
        map(pair(keyword("NOT"), keyword("IN")), |_| Operator::NotIn),
        map(keyword("IN"), |_| Operator::In),
    ))
    .parse(input);
    match in_operator {
        Ok((rest, operator)) => {
            let (rest, values) = parse_value_list(rest)?;
            return Ok((rest, Expression::binary(operator, lhs, values)));
        }
        Err(nom::Err::Error(_)) => {}
        Err(e) => return Err(e),
    }

    match parse_comparison_operator(input) {
        Ok((rest, operator)) => {
            let (rest, rhs) = parse_additive_expression(rest)?;
            Ok((rest, Expression::binary(operator, lhs, rhs)))
        }
        Err(nom::Err::Error(_)) => Ok((input, lhs)),
        Err(e) => Err(e),
    }
}

fn parse_value_list(input: &'_ str) -> PResult<'_, Expression<'_>> {
    map(
        delimited(
            ws(char('(')),
            separated_list0(ws(char(',')), parse_expression),
            ws(char(')')),
        ),
        Expression::List,
    )
    .parse(input)
}

fn parse_additive_expression(input: &'_ str) -> PResult<'_, Expression<'_>> {
    let (input, lhs) = parse_multiplicative_expression(input)?;

    let mut remaining_input = input;
    let mut final_expression = lhs;

    loop {
        let res = pair(
            ws(alt((
                map(char('+'), |_| Operator::Addition),
                map(char('-'), |_| Operator::Subtraction),
            ))),
            parse_multiplicative_expression,
        )
        .parse(remaining_input);
        match res {
            Ok((new_input, (operator, rhs))) => {
                final_expression = Expression::binary(operator, final_expression, rhs);
                remaining_input = new_input;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }
    Ok((remaining_input, final_expression))
}

fn parse_multiplicative_expression(input: &'_ str) -> PResult<'_, Expression<'_>> {
    let (input, lhs) = parse_unary_expression(input)?;

    let mut remaining_input = input;
    let mut final_expression = lhs;

    loop {
        let res = pair(
            ws(alt((
                map(char('*'), |_| Operator::Multiplication),
                map(char('/'), |_| Operator::Division),
                map(char('%'), |_| Operator::ModuloDivision),
            ))),
            parse_unary_expression,
        )
        .parse(remaining_input);
        match res {
            Ok((new_input, (operator, rhs))) => {
                final_expression = Expression::binary(operator, final_expression, rhs);
                remaining_input = new_input;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }
    Ok((remaining_input, final_expression))
}

fn parse_unary_expression(input: &'_ str) -> PResult<'_, Expression<'_>> {
    if let Ok((rest, _)) = ws(char::<&str, SqlParsingError>('-')).parse(input) {
        let (rest, operand) = parse_unary_expression(rest)?;
        // fold into the literal so `-5` prints back as `-5`
        let negated = match operand {
            Expression::Literal(Literal::Integer(i)) => Expression::Literal(Literal::Integer(-i)),
            Expression::Literal(Literal::Float(f)) => Expression::Literal(Literal::Float(-f)),
            other => Expression::unary(Operator::Negation, other),
        };
        return Ok((rest, negated));
    }
    parse_primary(input)
}

fn parse_primary(input: &'_ str) -> PResult<'_, Expression<'_>> {
    ws(alt((
        delimited(ws(char('(')), parse_expression, ws(char(')'))),
        map(parse_numeric_literal, Expression::Literal),
        map(parse_string_literal, Expression::Literal),
        map(parse_keyword_literal, Expression::Literal),
        parse_parameter,
        parse_function_call,
        parse_column_reference,
    )))
    .parse(input)
}

/// Matches: 42, 3.14
pub fn parse_numeric_literal(input: &'_ str) -> PResult<'_, Literal<'_>> {
    let (rest, text) = recognize(pair(digit1, opt(pair(char('.'), digit1)))).parse(input)?;
    if text.contains('.') {
        match text.parse::<f64>() {
            Ok(f) => Ok((rest, Literal::Float(f))),
            Err(_) => Err(nom::Err::Error(SqlParsingError::new(
                input,
                "Invalid float literal",
            ))),
        }
    } else {
        match text.parse::<i64>() {
            Ok(i) => Ok((rest, Literal::Integer(i))),
            Err(_) => Err(nom::Err::Failure(SqlParsingError::new(
                input,
                "Integer literal out of range",
            ))),
        }
    }
}

/// `'text'` or `"text"`; the literal holds the inner content
pub fn parse_string_literal(input: &'_ str) -> PResult<'_, Literal<'_>> {
    alt((
        delimited(char('\''), take_until("'"), char('\'')),
        delimited(char('"'), take_until("\""), char('"')),
    ))
    .parse(input)
    .map(|(rest, s)| (rest, Literal::String(s)))
}

fn parse_keyword_literal(input: &'_ str) -> PResult<'_, Literal<'_>> {
    alt((
        map(keyword("TRUE"), |_| Literal::Boolean(true)),
        map(keyword("FALSE"), |_| Literal::Boolean(false)),
        map(keyword("NULL"), |_| Literal::Null),
    ))
    .parse(input)
}

/// A literal as it may appear in an edge attribute map; allows a leading minus.
pub fn parse_literal(input: &'_ str) -> PResult<'_, Literal<'_>> {
    let (rest, negative) = opt(char('-')).parse(input)?;
    let (rest, literal) = ws(alt((
        parse_numeric_literal,
        parse_string_literal,
        parse_keyword_literal,
    )))
    .parse(rest)?;
    let literal = match (negative, literal) {
        (None, literal) => literal,
        (Some(_), Literal::Integer(i)) => Literal::Integer(-i),
        (Some(_), Literal::Float(f)) => Literal::Float(-f),
        (Some(_), _) => {
            return Err(nom::Err::Error(SqlParsingError::new(
                input,
                "Only numeric literals can be negated",
            )))
        }
    };
    Ok((rest, literal))
}

fn parse_parameter(input: &'_ str) -> PResult<'_, Expression<'_>> {
    map(preceded(char('@'), parse_identifier), Expression::Parameter).parse(input)
}

pub fn parse_function_call(input: &'_ str) -> PResult<'_, Expression<'_>> {
    let (input, name) = parse_identifier(input)?;
    let (input, args) = delimited(
        ws(char('(')),
        separated_list0(ws(char(',')), parse_expression),
        ws(char(')')),
    )
    .parse(input)?;
    Ok((input, Expression::FunctionCallExp(FunctionCall { name, args })))
}

/// `alias.column` or bare `column`
pub fn parse_column_reference(input: &'_ str) -> PResult<'_, Expression<'_>> {
    let (input, first) = parse_identifier(input)?;
    let (input, second) = opt(preceded(char('.'), parse_identifier)).parse(input)?;
    let column = match second {
        Some(column) => ColumnReference {
            qualifier: Some(first),
            column,
        },
        None => ColumnReference {
            qualifier: None,
            column: first,
        },
    };
    Ok((input, Expression::Column(column)))
}
