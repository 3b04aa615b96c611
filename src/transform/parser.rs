//! Statement parser using nom.
//!
//! Grammar:
//!
//! ```text
//! statement  := invocation [ "where" condition ]
//! invocation := IDENT "(" [ expr { "," expr } ] ")"
//! condition  := expr ( "==" | "!=" ) expr | invocation
//! expr       := STRING | NUMBER | "true" | "false" | invocation | path
//! path       := IDENT { "." IDENT } [ "[" STRING "]" ]
//! ```

use super::ast::*;
use crate::core::{Result, TransformError};
use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag},
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace0, multispace1, satisfy},
    combinator::{map, map_res, not, opt, peek, recognize, value as nom_value},
    error::{Error as NomError, ErrorKind},
    multi::{many0, separated_list0, separated_list1},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

/// Parse one statement string into an AST
pub fn parse_statement(input: &str) -> Result<Statement> {
    let input = input.trim();

    if input.is_empty() {
        return Err(TransformError::parse("Empty statement"));
    }

    match statement(input) {
        Ok((remaining, parsed)) => {
            if !remaining.trim().is_empty() {
                Err(TransformError::parse(format!(
                    "Unexpected input after statement: '{}'",
                    remaining
                )))
            } else {
                Ok(parsed)
            }
        },
        Err(e) => Err(TransformError::parse(format!("Failed to parse statement: {}", e))),
    }
}

/// Wrap a parser so surrounding whitespace is ignored
fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn statement(input: &str) -> IResult<&str, Statement> {
    map(
        pair(
            ws(invocation),
            opt(preceded(terminated(tag("where"), multispace1), condition)),
        ),
        |(invocation, condition)| Statement {
            invocation,
            condition,
        },
    )(input)
}

/// Parse the `where` clause
fn condition(input: &str) -> IResult<&str, Condition> {
    let (input, left) = ws(expr)(input)?;
    let (input, op) = opt(ws(compare_op))(input)?;

    match op {
        Some(op) => {
            let (input, right) = ws(expr)(input)?;
            Ok((input, Condition::Comparison { left, op, right }))
        },
        None => match left {
            Expr::Invocation(call) => Ok((input, Condition::Invocation(call))),
            _ => Err(nom::Err::Failure(NomError::new(input, ErrorKind::Verify))),
        },
    }
}

fn compare_op(input: &str) -> IResult<&str, CompareOp> {
    alt((
        nom_value(CompareOp::Eq, tag("==")),
        nom_value(CompareOp::NotEq, tag("!=")),
    ))(input)
}

/// Parse any operand
fn expr(input: &str) -> IResult<&str, Expr> {
    alt((
        map(string_literal, Expr::String),
        number,
        map(invocation, Expr::Invocation),
        map(boolean, Expr::Bool),
        map(path, Expr::Path),
    ))(input)
}

/// Parse `name(arg, ...)`
fn invocation(input: &str) -> IResult<&str, Invocation> {
    map(
        pair(
            identifier,
            preceded(
                multispace0,
                delimited(
                    char('('),
                    separated_list0(char(','), ws(expr)),
                    preceded(multispace0, char(')')),
                ),
            ),
        ),
        |(name, arguments)| Invocation {
            function: name.to_string(),
            arguments,
        },
    )(input)
}

/// Parse identifiers (letters, digits, underscores; not starting with a digit)
fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))(input)
}

/// Parse `a.b.c["key"]`
fn path(input: &str) -> IResult<&str, PathExpr> {
    map(
        pair(
            separated_list1(char('.'), identifier),
            opt(delimited(
                preceded(multispace0, char('[')),
                ws(string_literal),
                char(']'),
            )),
        ),
        |(fields, key)| PathExpr {
            fields: fields.into_iter().map(str::to_string).collect(),
            key,
        },
    )(input)
}

/// Parse boolean keywords, refusing identifiers that merely start with them
fn boolean(input: &str) -> IResult<&str, bool> {
    terminated(
        alt((nom_value(true, tag("true")), nom_value(false, tag("false")))),
        not(peek(satisfy(|c: char| {
            c.is_alphanumeric() || c == '_' || c == '.' || c == '['
        }))),
    )(input)
}

/// Parse integer or float literals; a `.` makes it a float
fn number(input: &str) -> IResult<&str, Expr> {
    map_res(
        recognize(tuple((
            opt(char('-')),
            digit1,
            opt(pair(char('.'), digit1)),
        ))),
        |text: &str| {
            if text.contains('.') {
                text.parse::<f64>().map(Expr::Float).map_err(|_| ErrorKind::Float)
            } else {
                text.parse::<i64>().map(Expr::Int).map_err(|_| ErrorKind::Digit)
            }
        },
    )(input)
}

/// Parse double-quoted strings with `\"`, `\\`, `\n` and `\t` escapes
fn string_literal(input: &str) -> IResult<&str, String> {
    map(
        delimited(
            char('"'),
            opt(escaped_transform(
                is_not("\\\""),
                '\\',
                alt((
                    nom_value("\\", tag("\\")),
                    nom_value("\"", tag("\"")),
                    nom_value("\n", tag("n")),
                    nom_value("\t", tag("t")),
                )),
            )),
            char('"'),
        ),
        Option::unwrap_or_default,
    )(input)
}
