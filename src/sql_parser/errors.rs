use nom::error::{ContextError, ParseError};
use std::fmt;

#[derive(Debug, PartialEq)]
pub struct SqlParsingError<'a> {
    pub errors: Vec<(&'a str, &'static str)>,
}

impl<'a> SqlParsingError<'a> {
    pub fn new(input: &'a str, message: &'static str) -> Self {
        SqlParsingError {
            errors: vec![(input, message)],
        }
    }

    /// Owned rendering used once the input buffer is out of scope.
    pub fn to_report(&self) -> String {
        self.to_string().trim_end().to_string()
    }
}

impl<'a> ParseError<&'a str> for SqlParsingError<'a> {
    fn from_error_kind(input: &'a str, _kind: nom::error::ErrorKind) -> Self {
        SqlParsingError {
            errors: vec![(input, "unknown error")],
        }
    }

    fn append(input: &'a str, _kind: nom::error::ErrorKind, mut other: Self) -> Self {
        other.errors.push((input, "unknown error (appended)"));
        other
    }
}

impl<'a> ContextError<&'a str> for SqlParsingError<'a> {
    fn add_context(input: &'a str, ctx: &'static str, mut other: Self) -> Self {
        other.errors.push((input, ctx));
        other
    }
}

impl fmt::Display for SqlParsingError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (input, ctx) in &self.errors {
            // keep reports short for long queries
            let snippet: String = input.chars().take(40).collect();
            writeln!(f, "{}: {}", ctx, snippet)?;
        }
        Ok(())
    }
}

impl<'a> From<nom::error::Error<&'a str>> for SqlParsingError<'a> {
    fn from(err: nom::error::Error<&'a str>) -> Self {
        SqlParsingError {
            errors: vec![(err.input, "Unable to parse")],
        }
    }
}
