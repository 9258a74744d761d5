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

//! Typed boolean formulas over configuration variables

use crate::error::Error;
use crate::sexp::Sexp;
use std::convert::TryFrom;

/// Boolean connectives recognized as list heads
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operator {
    /// `and`, at least one operand
    And,
    /// `or`, at least one operand
    Or,
    /// `not`, exactly one operand
    Not,
}

impl Operator {
    /// The operator denoted by a list head, if any.
    pub fn from_head(head: &str) -> Option<Operator> {
        match head {
            "and" => Some(Operator::And),
            "or" => Some(Operator::Or),
            "not" => Some(Operator::Not),
            _ => None,
        }
    }

    /// The list head denoting this operator
    pub fn head(self) -> &'static str {
        match self {
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Not => "not",
        }
    }

    fn accepts(self, arity: usize) -> bool {
        match self {
            Operator::Not => arity == 1,
            Operator::And | Operator::Or => arity >= 1,
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.head())
    }
}

/// A boolean formula. Operand counts are checked on construction from a [`Sexp`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Expr {
    /// Reference to a configuration variable
    Var(String),
    /// Conjunction
    And(Vec<Expr>),
    /// Disjunction
    Or(Vec<Expr>),
    /// Negation
    Not(Box<Expr>),
}

impl Expr {
    /// Variable reference
    pub fn var(name: impl Into<String>) -> Expr {
        Expr::Var(name.into())
    }

    /// Names of the referenced variables, depth first, with repetitions.
    pub fn variables(&self) -> Vec<&str> {
        let mut res = Vec::new();
        let mut todo = vec![self];
        while let Some(e) = todo.pop() {
            match e {
                Expr::Var(name) => res.push(name.as_str()),
                Expr::Not(e) => todo.push(e),
                Expr::And(operands) | Expr::Or(operands) => todo.extend(operands.iter().rev()),
            }
        }
        res
    }

    /// Evaluates the formula, with `value` giving the value of each variable.
    pub fn eval(&self, value: &impl Fn(&str) -> bool) -> bool {
        match self {
            Expr::Var(name) => value(name),
            Expr::Not(e) => !e.eval(value),
            Expr::And(operands) => operands.iter().all(|e| e.eval(value)),
            Expr::Or(operands) => operands.iter().any(|e| e.eval(value)),
        }
    }
}

impl TryFrom<&Sexp> for Expr {
    type Error = Error;

    /// Gives a meaning to a parsed tree: symbols are variables and lists headed by `and`, `or`
    /// or `not` are operators. Anything else is [`Error::UnknownOperator`].
    fn try_from(tree: &Sexp) -> Result<Expr, Error> {
        let items = match tree {
            Sexp::Atom(_) => {
                return match tree.as_symbol() {
                    Some(name) => Ok(Expr::var(name)),
                    None => Err(Error::UnknownOperator {
                        found: tree.to_string(),
                    }),
                }
            }
            Sexp::List(items) => items,
        };
        let operator = items
            .first()
            .and_then(Sexp::as_symbol)
            .and_then(Operator::from_head)
            .ok_or_else(|| Error::UnknownOperator {
                found: tree.to_string(),
            })?;
        let arity = items.len() - 1;
        if !operator.accepts(arity) {
            return Err(Error::BadArity { operator, arity });
        }
        let mut operands = items[1..]
            .iter()
            .map(Expr::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(match operator {
            Operator::And => Expr::And(operands),
            Operator::Or => Expr::Or(operands),
            Operator::Not => Expr::Not(Box::new(operands.remove(0))),
        })
    }
}

fn list<'a>(operator: Operator, operands: impl Iterator<Item = &'a Expr>) -> Sexp {
    let mut items = vec![Sexp::symbol(operator.head())];
    items.extend(operands.map(Sexp::from));
    Sexp::List(items)
}

impl From<&Expr> for Sexp {
    fn from(e: &Expr) -> Sexp {
        match e {
            Expr::Var(name) => Sexp::symbol(name.as_str()),
            Expr::And(operands) => list(Operator::And, operands.iter()),
            Expr::Or(operands) => list(Operator::Or, operands.iter()),
            Expr::Not(operand) => list(Operator::Not, std::iter::once(operand.as_ref())),
        }
    }
}

/// A random formula of depth at most `depth` over variables `CONFIG_0` to `CONFIG_{nvars-1}`.
#[cfg(test)]
pub(crate) fn random_expr<R: rand::Rng>(rng: &mut R, depth: usize, nvars: usize) -> Expr {
    let kind = if depth == 0 { 0 } else { rng.gen_range(0..4) };
    let operands = |rng: &mut R| -> Vec<Expr> {
        let n = rng.gen_range(2..5);
        (0..n).map(|_| random_expr(rng, depth - 1, nvars)).collect()
    };
    match kind {
        0 => Expr::Var(format!("CONFIG_{}", rng.gen_range(0..nvars))),
        1 => Expr::And(operands(rng)),
        2 => Expr::Or(operands(rng)),
        _ => Expr::Not(Box::new(random_expr(rng, depth - 1, nvars))),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sexp::parse;

    fn typed(text: &str) -> Result<Expr, Error> {
        Expr::try_from(&parse(text).unwrap())
    }

    #[test]
    fn operators() {
        assert_eq!(
            typed("(and a (or b c))").unwrap(),
            Expr::And(vec![
                Expr::var("a"),
                Expr::Or(vec![Expr::var("b"), Expr::var("c")])
            ])
        );
        assert_eq!(
            typed("(not a)").unwrap(),
            Expr::Not(Box::new(Expr::var("a")))
        );
        assert_eq!(typed("a").unwrap(), Expr::var("a"));
    }

    #[test]
    fn unknown_head() {
        assert_eq!(
            typed("(xor a b)"),
            Err(Error::UnknownOperator {
                found: "(xor a b)".to_owned()
            })
        );
        assert!(matches!(
            typed("(and a (=> b c))"),
            Err(Error::UnknownOperator { .. })
        ));
        assert!(matches!(typed("()"), Err(Error::UnknownOperator { .. })));
        assert!(matches!(
            typed("((and) a)"),
            Err(Error::UnknownOperator { .. })
        ));
    }

    #[test]
    fn literals_are_not_formulas() {
        assert!(matches!(typed("(and a 1)"), Err(Error::UnknownOperator { .. })));
        assert!(matches!(typed("\"a\""), Err(Error::UnknownOperator { .. })));
    }

    #[test]
    fn arity() {
        assert_eq!(
            typed("(not a b)"),
            Err(Error::BadArity {
                operator: Operator::Not,
                arity: 2
            })
        );
        assert_eq!(
            typed("(not)"),
            Err(Error::BadArity {
                operator: Operator::Not,
                arity: 0
            })
        );
        assert_eq!(
            typed("(or)"),
            Err(Error::BadArity {
                operator: Operator::Or,
                arity: 0
            })
        );
        assert_eq!(typed("(and a)").unwrap(), Expr::And(vec![Expr::var("a")]));
    }

    #[test]
    fn back_to_tree() {
        let tree = parse("(and a (not (or b c)))").unwrap();
        let e = Expr::try_from(&tree).unwrap();
        assert_eq!(Sexp::from(&e), tree);
        assert_eq!(e.variables(), vec!["a", "b", "c"]);
    }

    #[test]
    fn evaluation() {
        let e = typed("(and a (not (or b c)))").unwrap();
        assert!(e.eval(&|v| v == "a"));
        assert!(!e.eval(&|v| v == "a" || v == "c"));
    }
}
