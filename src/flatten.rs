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

//! Enumerating the leaves of parsed trees, and the variables they reference

use crate::expr::Operator;
use crate::sexp::{Atom, Sexp};
use std::collections::BTreeSet;

/// Depth first iterator over the leaves of a forest of trees.
pub struct Leaves<'a> {
    /// one iterator per list being explored, innermost last
    stack: Vec<std::slice::Iter<'a, Sexp>>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a Atom;

    fn next(&mut self) -> Option<&'a Atom> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                None => {
                    self.stack.pop();
                }
                Some(Sexp::Atom(a)) => return Some(a),
                Some(Sexp::List(l)) => self.stack.push(l.iter()),
            }
        }
    }
}

/// Leaves of a forest, from left to right.
pub fn leaves_of_forest(forest: &[Sexp]) -> Leaves<'_> {
    Leaves {
        stack: vec![forest.iter()],
    }
}

/// Leaves of a single tree, from left to right.
/// # Example
/// ```
/// use kclausefmt::flatten::leaves;
/// use kclausefmt::sexp::parse;
/// let tree = parse("(and a (or b c))").unwrap();
/// let names: Vec<String> = leaves(&tree).map(|a| a.to_string()).collect();
/// assert_eq!(names, vec!["and", "a", "or", "b", "c"]);
/// ```
pub fn leaves(tree: &Sexp) -> Leaves<'_> {
    leaves_of_forest(std::slice::from_ref(tree))
}

/// Each distinct element of `items` once. Callers must not rely on the order.
pub fn uniq<T: Ord, I: IntoIterator<Item = T>>(items: I) -> BTreeSet<T> {
    items.into_iter().collect()
}

/// The configuration variables referenced by a forest: symbols other than operator heads.
pub fn variables<'a>(forest: impl IntoIterator<Item = &'a Sexp>) -> BTreeSet<&'a str> {
    uniq(forest.into_iter().flat_map(leaves).filter_map(|atom| match atom {
        Atom::Symbol(s) if Operator::from_head(s).is_none() => Some(s.as_str()),
        _ => None,
    }))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sexp::parse;

    #[test]
    fn forest_order() {
        let forest = vec![parse("(and a b)").unwrap(), parse("x").unwrap()];
        let all: Vec<String> = leaves_of_forest(&forest).map(|a| a.to_string()).collect();
        assert_eq!(all, vec!["and", "a", "b", "x"]);
    }

    #[test]
    fn deep_and_empty_lists() {
        let tree = parse("(((a)) () (b (c)))").unwrap();
        let all: Vec<String> = leaves(&tree).map(|a| a.to_string()).collect();
        assert_eq!(all, vec!["a", "b", "c"]);
        assert_eq!(leaves(&parse("()").unwrap()).count(), 0);
    }

    #[test]
    fn literals_are_leaves() {
        let tree = parse("(f 1 \"s\")").unwrap();
        assert_eq!(leaves(&tree).count(), 3);
    }

    #[test]
    fn variable_set() {
        let forest = vec![parse("(and a b)").unwrap(), parse("(or a c)").unwrap()];
        let vars = variables(&forest);
        assert_eq!(vars, ["a", "b", "c"].iter().copied().collect());
    }

    #[test]
    fn uniq_is_idempotent() {
        let once = uniq(vec![3, 1, 3, 2, 1]);
        let twice = uniq(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }
}
