/**************************************************************************/
/*  This file is part of KCLAUSEFMT.                                      */
/*                                                                        */
/*  Copyright (C) 2025                                                    */
/*    CEA (Commissariat à l'énergie atomique et aux énergies              */
/*         alternatives)                                                  */
/*                                                                        */
/*  you can redistribute it and/or modify it under the terms of the GNU   */
/*  Lesser General Public License as published by the Free Software       */
/*  Foundation, version 2.1.                                              */
/*                                                                        */
/*  It is distributed in the hope that it will be useful,                 */
/*  but WITHOUT ANY WARRANTY; without even the implied warranty of        */
/*  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the         */
/*  GNU Lesser General Public License for more details.                   */
/*                                                                        */
/*  See the GNU Lesser General Public License version 2.1                 */
/*  for more details (enclosed in the file licenses/LGPLv2.1).            */
/*                                                                        */
/**************************************************************************/

//! The kconfigreader infix grammar: `def(NAME)`, `(A&B&...)`, `(A|B|...)` and `!A`.

use crate::error::{excerpt, Error};
use crate::expr::Expr;
use crate::sexp::{Sexp, MAX_DEPTH};
use itertools::Itertools;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while1};
use nom::character::complete::{char, multispace0, one_of};
use nom::combinator::{eof, map};
use nom::multi::many0;
use nom::sequence::{delimited, pair, preceded, terminated};
use nom::IResult;
use std::convert::TryFrom;

/// Displays a formula in kconfigreader syntax.
/// # Example
/// ```
/// use kclausefmt::expr::Expr;
/// use kclausefmt::kconfigreader::KconfigReader;
/// let e = Expr::Not(Box::new(Expr::var("a")));
/// assert_eq!(KconfigReader(&e).to_string(), "!def(a)");
/// ```
pub struct KconfigReader<'a>(pub &'a Expr);

impl<'a> std::fmt::Display for KconfigReader<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.0 {
            Expr::Var(name) => write!(f, "def({})", name),
            Expr::And(operands) => {
                write!(f, "({})", operands.iter().map(KconfigReader).format("&"))
            }
            Expr::Or(operands) => {
                write!(f, "({})", operands.iter().map(KconfigReader).format("|"))
            }
            Expr::Not(operand) => write!(f, "!{}", KconfigReader(operand)),
        }
    }
}

/// Renders a parsed tree in kconfigreader syntax.
///
/// Fails with [`Error::UnknownOperator`] or [`Error::BadArity`] if the tree is not a formula.
pub fn render(tree: &Sexp) -> Result<String, Error> {
    let e = Expr::try_from(tree)?;
    Ok(KconfigReader(&e).to_string())
}

fn is_name_char(c: char) -> bool {
    !c.is_whitespace() && c != '(' && c != ')'
}

fn definition(input: &str) -> IResult<&str, Expr> {
    map(
        delimited(tag("def("), take_while1(is_name_char), char(')')),
        |name: &str| Expr::var(name),
    )(input)
}

fn too_deep(input: &str, depth: usize) -> IResult<&str, ()> {
    if depth >= MAX_DEPTH {
        Err(nom::Err::Failure(nom::error::Error::new(
            input,
            nom::error::ErrorKind::TooLarge,
        )))
    } else {
        Ok((input, ()))
    }
}

fn negation(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, _) = char('!')(input)?;
    let (input, _) = too_deep(input, depth)?;
    map(|i| formula(i, depth + 1), |e| Expr::Not(Box::new(e)))(input)
}

fn group(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, _) = char('(')(input)?;
    let (input, _) = too_deep(input, depth)?;
    let (input, first) = formula(input, depth + 1)?;
    let (input, rest) = many0(pair(preceded(multispace0, one_of("&|")), |i| {
        formula(i, depth + 1)
    }))(input)?;
    let (input, _) = preceded(multispace0, char(')'))(input)?;
    let separator = rest.first().map(|(c, _)| *c).unwrap_or('&');
    if rest.iter().any(|(c, _)| *c != separator) {
        // (a&b|c) has no meaning without precedence rules
        return Err(nom::Err::Failure(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        )));
    }
    let operands = std::iter::once(first)
        .chain(rest.into_iter().map(|(_, e)| e))
        .collect();
    Ok((
        input,
        if separator == '&' {
            Expr::And(operands)
        } else {
            Expr::Or(operands)
        },
    ))
}

/// `depth` is the number of enclosing operators
fn formula(input: &str, depth: usize) -> IResult<&str, Expr> {
    preceded(
        multispace0,
        alt((
            definition,
            |i| negation(i, depth),
            |i| group(i, depth),
        )),
    )(input)
}

/// Parses one formula in kconfigreader syntax.
///
/// `(A)` reads as a conjunction of one operand. Operators nested deeper than [`MAX_DEPTH`] fail
/// with [`Error::TooDeep`].
/// # Example
/// ```
/// use kclausefmt::expr::Expr;
/// use kclausefmt::kconfigreader::parse;
/// assert_eq!(
///     parse("(def(a)|!def(b))").unwrap(),
///     Expr::Or(vec![Expr::var("a"), Expr::Not(Box::new(Expr::var("b")))])
/// );
/// ```
pub fn parse(text: &str) -> Result<Expr, Error> {
    match terminated(|i| formula(i, 0), pair(multispace0, eof))(text) {
        Ok((_, e)) => Ok(e),
        Err(nom::Err::Failure(e)) if e.code == nom::error::ErrorKind::TooLarge => {
            Err(Error::TooDeep {
                offset: text.len() - e.input.len(),
                limit: MAX_DEPTH,
            })
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            let offset = text.len() - e.input.len();
            Err(Error::MalformedInput {
                offset,
                found: excerpt(text, offset),
            })
        }
        Err(nom::Err::Incomplete(_)) => Err(Error::MalformedInput {
            offset: text.len(),
            found: String::new(),
        }),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::expr::random_expr;
    use crate::sexp::parse as parse_sexp;

    fn translate(text: &str) -> Result<String, Error> {
        render(&parse_sexp(text)?)
    }

    #[test]
    fn conjunction_of_disjunction() {
        assert_eq!(
            translate("(and a (or b c))").unwrap(),
            "(def(a)&(def(b)|def(c)))"
        );
    }

    #[test]
    fn negation_has_no_brackets() {
        assert_eq!(translate("(not a)").unwrap(), "!def(a)");
        assert_eq!(
            translate("(not (and a b))").unwrap(),
            "!(def(a)&def(b))"
        );
        assert_eq!(translate("(not (not a))").unwrap(), "!!def(a)");
    }

    #[test]
    fn single_operand() {
        assert_eq!(translate("(or a)").unwrap(), "(def(a))");
        assert_eq!(translate("CONFIG_X").unwrap(), "def(CONFIG_X)");
    }

    #[test]
    fn no_placeholder_on_unknown_operator() {
        assert_eq!(
            translate("(xor a b)"),
            Err(Error::UnknownOperator {
                found: "(xor a b)".to_owned()
            })
        );
    }

    #[test]
    fn extra_close_bracket() {
        assert_eq!(
            translate("(and a b))"),
            Err(Error::UnbalancedBrackets { offset: 9 })
        );
    }

    #[test]
    fn read_back() {
        assert_eq!(
            parse(" ( def(a) & (def(b)|def(c)) ) ").unwrap(),
            Expr::And(vec![
                Expr::var("a"),
                Expr::Or(vec![Expr::var("b"), Expr::var("c")])
            ])
        );
        assert_eq!(parse("(def(a))").unwrap(), Expr::And(vec![Expr::var("a")]));
    }

    #[test]
    fn read_errors() {
        assert!(matches!(
            parse("(def(a)&def(b)|def(c))"),
            Err(Error::MalformedInput { .. })
        ));
        assert!(matches!(parse("def(a) def(b)"), Err(Error::MalformedInput { .. })));
        assert!(matches!(parse("(def(a)"), Err(Error::MalformedInput { .. })));
        assert!(matches!(parse(""), Err(Error::MalformedInput { offset: 0, .. })));
    }

    #[test]
    fn nesting_limit() {
        let deepest = format!("{}a{}", "(not ".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        let rendered = translate(&deepest).unwrap();
        assert_eq!(rendered, format!("{}def(a)", "!".repeat(MAX_DEPTH)));
        assert_eq!(parse(&rendered).unwrap().variables(), vec!["a"]);
        assert_eq!(
            parse(&format!("!{}", rendered)),
            Err(Error::TooDeep {
                offset: MAX_DEPTH + 1,
                limit: MAX_DEPTH
            })
        );
        let groups = format!(
            "{}def(a){}",
            "(".repeat(MAX_DEPTH + 1),
            ")".repeat(MAX_DEPTH + 1)
        );
        assert!(matches!(parse(&groups), Err(Error::TooDeep { .. })));
        assert!(matches!(
            parse(&format!("{}def(a)", "!".repeat(200_000))),
            Err(Error::TooDeep { .. })
        ));
    }

    #[test]
    fn random_round_trip() {
        // prefix text -> tree -> kconfigreader text -> formula gives back the same formula
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let e = random_expr(&mut rng, 4, 10);
            let prefix = Sexp::from(&e).to_string();
            let rendered = translate(&prefix).unwrap();
            assert_eq!(parse(&rendered).unwrap(), e, "{} -> {}", prefix, rendered);
        }
    }
}
