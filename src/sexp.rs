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

//! Untyped expression trees built from the bracketed prefix syntax

use crate::error::Error;
use crate::lexer::{Number, Token, Tokenizer};
use itertools::Itertools;

/// A leaf of a parsed tree
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Atom {
    /// A bare symbol: operator heads and configuration variables
    Symbol(String),
    /// A numeric literal
    Number(Number),
    /// A quoted string, without its quotes
    Str(String),
}

impl std::fmt::Display for Atom {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Atom::Symbol(s) => write!(f, "{}", s),
            Atom::Number(n) => write!(f, "{}", n),
            Atom::Str(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// A parsed tree: nested lists reflecting bracket nesting, nothing more.
///
/// Lists are only given a meaning (operator, operands) by [`crate::expr::Expr`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sexp {
    /// A leaf
    Atom(Atom),
    /// A bracketed list
    List(Vec<Sexp>),
}

impl Sexp {
    /// A symbol leaf
    pub fn symbol(name: impl Into<String>) -> Sexp {
        Sexp::Atom(Atom::Symbol(name.into()))
    }

    /// Returns the name if this is a symbol leaf.
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Sexp::Atom(Atom::Symbol(s)) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for Sexp {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Sexp::Atom(a) => write!(f, "{}", a),
            Sexp::List(l) => write!(f, "({})", l.iter().format(" ")),
        }
    }
}

/// Maximum nesting depth of lists in a formula
pub const MAX_DEPTH: usize = 512;

/// Builds the tree of a formula.
///
/// Fails if brackets are unbalanced, if lists are nested deeper than [`MAX_DEPTH`], or if the
/// text does not contain exactly one top level value.
/// # Example
/// ```
/// use kclausefmt::sexp::{parse, Sexp};
/// let tree = parse("(not a)").unwrap();
/// assert_eq!(tree, Sexp::List(vec![Sexp::symbol("not"), Sexp::symbol("a")]));
/// ```
pub fn parse(text: &str) -> Result<Sexp, Error> {
    build(Tokenizer::new(text), text.len())
}

/// Builds a tree from a token stream. `end` is the offset reported for brackets left open.
pub fn build(
    tokens: impl Iterator<Item = Result<(usize, Token), Error>>,
    end: usize,
) -> Result<Sexp, Error> {
    // frames of the lists being built, with the offset of their opening bracket
    let mut stack: Vec<(usize, Vec<Sexp>)> = Vec::new();
    let mut current = Vec::new();
    for token in tokens {
        let (offset, token) = token?;
        match token {
            Token::Open => {
                if stack.len() >= MAX_DEPTH {
                    return Err(Error::TooDeep {
                        offset,
                        limit: MAX_DEPTH,
                    });
                }
                stack.push((offset, current));
                current = Vec::new();
            }
            Token::Close => {
                let (_, mut parent) = stack.pop().ok_or(Error::UnbalancedBrackets { offset })?;
                parent.push(Sexp::List(current));
                current = parent;
            }
            Token::Number(n) => current.push(Sexp::Atom(Atom::Number(n))),
            Token::Str(s) => current.push(Sexp::Atom(Atom::Str(s))),
            Token::Symbol(s) => current.push(Sexp::Atom(Atom::Symbol(s))),
        }
    }
    if let Some((offset, _)) = stack.pop() {
        tracing::trace!(offset, end, "bracket left open");
        return Err(Error::UnbalancedBrackets { offset: end });
    }
    if current.len() != 1 {
        return Err(Error::MultipleRoots {
            count: current.len(),
        });
    }
    Ok(current.remove(0))
}

#[cfg(test)]
mod test {
    use super::*;

    fn list(items: Vec<Sexp>) -> Sexp {
        Sexp::List(items)
    }

    fn s(name: &str) -> Sexp {
        Sexp::symbol(name)
    }

    #[test]
    fn nested() {
        assert_eq!(
            parse("(and a (or b c))").unwrap(),
            list(vec![s("and"), s("a"), list(vec![s("or"), s("b"), s("c")])])
        );
    }

    #[test]
    fn single_leaf() {
        assert_eq!(parse("  CONFIG_A ").unwrap(), s("CONFIG_A"));
    }

    #[test]
    fn literals() {
        assert_eq!(
            parse("(f 1 \"x y\")").unwrap(),
            list(vec![
                s("f"),
                Sexp::Atom(Atom::Number(Number::Integer(1.into()))),
                Sexp::Atom(Atom::Str("x y".to_owned()))
            ])
        );
    }

    #[test]
    fn extra_close_bracket() {
        assert_eq!(
            parse("(and a b))"),
            Err(Error::UnbalancedBrackets { offset: 9 })
        );
        assert_eq!(parse(")"), Err(Error::UnbalancedBrackets { offset: 0 }));
    }

    #[test]
    fn unclosed_bracket() {
        assert_eq!(
            parse("(and a (or b c)"),
            Err(Error::UnbalancedBrackets { offset: 15 })
        );
    }

    #[test]
    fn root_count() {
        assert_eq!(parse("(a) (b)"), Err(Error::MultipleRoots { count: 2 }));
        assert_eq!(parse("a b"), Err(Error::MultipleRoots { count: 2 }));
        assert_eq!(parse(""), Err(Error::MultipleRoots { count: 0 }));
        assert_eq!(parse("()"), Ok(list(vec![])));
    }

    fn nested_not(depth: usize) -> String {
        format!("{}a{}", "(not ".repeat(depth), ")".repeat(depth))
    }

    #[test]
    fn nesting_limit() {
        assert!(parse(&nested_not(MAX_DEPTH)).is_ok());
        assert_eq!(
            parse(&nested_not(MAX_DEPTH + 1)),
            Err(Error::TooDeep {
                offset: 5 * MAX_DEPTH,
                limit: MAX_DEPTH
            })
        );
        assert!(matches!(
            parse(&nested_not(200_000)),
            Err(Error::TooDeep { .. })
        ));
    }

    #[test]
    fn tokenizer_errors_propagate() {
        assert!(matches!(
            parse("(a \"b"),
            Err(Error::MalformedInput { offset: 3, .. })
        ));
    }

    #[test]
    fn display_reparses() {
        let text = "(and a (or b -2.5 \"q\") (not c))";
        let tree = parse(text).unwrap();
        assert_eq!(tree.to_string(), text);
        assert_eq!(parse(&tree.to_string()).unwrap(), tree);
    }
}
