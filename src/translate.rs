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

//! Turning a constraint database into typed formulas, one formula at a time

use crate::database::ConstraintDatabase;
use crate::engine::FormulaEngine;
use crate::expr::Expr;
use crate::flatten;
use crate::sexp::Sexp;
use anyhow::Context;
use serde::Serialize;
use std::collections::BTreeSet;
use std::convert::TryFrom;
use tracing::{debug, error, trace_span};

/// Where a formula comes from
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FormulaId {
    /// configuration variable of the database entry
    pub variable: String,
    /// index of the fragment in the entry
    pub fragment: usize,
    /// index of the formula in the fragment, None when the whole fragment is concerned
    pub formula: Option<usize>,
}

impl std::fmt::Display for FormulaId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}[{}]", self.variable, self.fragment)?;
        match self.formula {
            Some(i) => write!(f, "#{}", i),
            None => Ok(()),
        }
    }
}

/// A successfully translated formula
#[derive(Debug, Clone)]
pub struct Formula {
    /// origin
    pub id: FormulaId,
    /// parsed tree
    pub tree: Sexp,
    /// meaning of the tree
    pub expr: Expr,
}

/// A formula, or a whole fragment, which could not be translated
#[derive(Debug)]
pub struct Failure {
    /// origin
    pub id: FormulaId,
    /// why
    pub error: anyhow::Error,
}

/// Result of translating a database. Formulas are in database order.
#[derive(Debug, Default)]
pub struct Translation {
    /// translated formulas
    pub formulas: Vec<Formula>,
    /// failed formulas and fragments
    pub failures: Vec<Failure>,
}

impl Translation {
    /// Configuration variables referenced by the translated formulas
    pub fn variables(&self) -> BTreeSet<&str> {
        flatten::variables(self.formulas.iter().map(|f| &f.tree))
    }

    /// Typed translated formulas, in order
    pub fn exprs(&self) -> impl Iterator<Item = &Expr> + Clone {
        self.formulas.iter().map(|f| &f.expr)
    }

    /// Summary for the json report
    pub fn report(&self) -> Report {
        Report {
            formulas: self.formulas.len() + self.failures.len(),
            translated: self.formulas.len(),
            features: self.variables().len(),
            failures: self
                .failures
                .iter()
                .map(|f| FailureReport {
                    formula: f.id.to_string(),
                    error: format!("{:#}", f.error),
                })
                .collect(),
        }
    }
}

/// One failure in a [`Report`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureReport {
    /// identifier of the formula or fragment
    pub formula: String,
    /// error message
    pub error: String,
}

/// Summary of a translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// number of formulas seen, a failed fragment counting as one
    pub formulas: usize,
    /// number of formulas translated
    pub translated: usize,
    /// number of distinct configuration variables referenced
    pub features: usize,
    /// failures, in database order
    pub failures: Vec<FailureReport>,
}

impl Translation {
    fn fail(
        &mut self,
        id: FormulaId,
        error: anyhow::Error,
        fail_fast: bool,
    ) -> anyhow::Result<()> {
        error!(formula = %id, "{:#}", error);
        if fail_fast {
            return Err(error.context(format!("translating {}", id)));
        }
        self.failures.push(Failure { id, error });
        Ok(())
    }
}

/// Translates each formula of the database independently.
///
/// A failing formula is recorded in [`Translation::failures`] and does not prevent the others from
/// being translated, unless `fail_fast` is set, in which case the first failure is returned as
/// an error.
pub fn translate<E: FormulaEngine>(
    engine: &E,
    db: &ConstraintDatabase,
    fail_fast: bool,
) -> anyhow::Result<Translation> {
    let mut res = Translation::default();
    for entry in db.entries.iter() {
        let _span = trace_span!("entry", variable = %entry.variable).entered();
        for (fragment_index, fragment) in entry.fragments.iter().enumerate() {
            let fragment_id = FormulaId {
                variable: entry.variable.clone(),
                fragment: fragment_index,
                formula: None,
            };
            let formulas = match engine
                .formulas(fragment)
                .with_context(|| format!("reading fragment {:?}", fragment))
            {
                Ok(f) => f,
                Err(e) => {
                    res.fail(fragment_id, e, fail_fast)?;
                    continue;
                }
            };
            for (formula_index, text) in formulas.iter().enumerate() {
                let id = FormulaId {
                    formula: Some(formula_index),
                    ..fragment_id.clone()
                };
                let typed = text
                    .to_sexp()
                    .and_then(|tree| Expr::try_from(&tree).map(|expr| (tree, expr)));
                match typed {
                    Ok((tree, expr)) => res.formulas.push(Formula { id, tree, expr }),
                    Err(e) => {
                        let e = anyhow::Error::new(e)
                            .context(format!("translating formula {:?}", text.text()));
                        res.fail(id, e, fail_fast)?
                    }
                }
            }
        }
    }
    debug!(
        translated = res.formulas.len(),
        failed = res.failures.len(),
        "translation done"
    );
    Ok(res)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::database::Entry;
    use crate::engine::{Smt2, Syntax};
    use crate::error::Error;
    use crate::kconfigreader::KconfigReader;

    fn db(entries: Vec<(&str, Vec<&str>)>) -> ConstraintDatabase {
        ConstraintDatabase {
            entries: entries
                .into_iter()
                .map(|(variable, fragments)| Entry {
                    variable: variable.to_string(),
                    fragments: fragments.iter().map(|f| f.to_string()).collect(),
                })
                .collect(),
        }
    }

    fn lines(t: &Translation) -> Vec<String> {
        t.exprs().map(|e| KconfigReader(e).to_string()).collect()
    }

    #[test]
    fn order_is_preserved() {
        let db = db(vec![
            ("B", vec!["(and a (or b c))"]),
            ("A", vec!["(not a)", "c"]),
        ]);
        let t = translate(&Syntax::Sexp, &db, false).unwrap();
        assert_eq!(
            lines(&t),
            vec!["(def(a)&(def(b)|def(c)))", "!def(a)", "def(c)"]
        );
        assert!(t.failures.is_empty());
        assert_eq!(t.formulas[2].id.to_string(), "A[1]#0");
    }

    #[test]
    fn failures_do_not_stop_translation() {
        let db = db(vec![("A", vec!["(and a b))", "(xor a b)", "(or a c)"])]);
        let t = translate(&Syntax::Sexp, &db, false).unwrap();
        assert_eq!(lines(&t), vec!["(def(a)|def(c))"]);
        assert_eq!(t.failures.len(), 2);
        assert_eq!(
            t.failures[0].error.downcast_ref::<Error>(),
            Some(&Error::UnbalancedBrackets { offset: 9 })
        );
        assert!(matches!(
            t.failures[1].error.downcast_ref::<Error>(),
            Some(Error::UnknownOperator { .. })
        ));
        assert_eq!(t.failures[1].id.to_string(), "A[1]#0");
        let report = t.report();
        assert_eq!(report.formulas, 3);
        assert_eq!(report.translated, 1);
        assert_eq!(report.features, 2);
    }

    #[test]
    fn fail_fast() {
        let db = db(vec![("A", vec!["(or a c)", "(xor a b)", "b"])]);
        let e = translate(&Syntax::Sexp, &db, true).unwrap_err();
        assert!(format!("{:#}", e).contains("A[1]#0"), "{:#}", e);
    }

    #[test]
    fn smt2_fragments() {
        let db = db(vec![
            (
                "CONFIG_A",
                vec![
                    "(declare-const CONFIG_A Bool)
                     (declare-const CONFIG_B Bool)
                     (assert (or CONFIG_A (not CONFIG_B)))",
                ],
            ),
            ("CONFIG_B", vec!["(assert (and CONFIG_B", "(assert CONFIG_B)"]),
        ]);
        let t = translate(&Smt2, &db, false).unwrap();
        assert_eq!(
            lines(&t),
            vec!["(def(CONFIG_A)|!def(CONFIG_B))", "def(CONFIG_B)"]
        );
        assert_eq!(t.failures.len(), 1);
        assert_eq!(t.failures[0].id.to_string(), "CONFIG_B[0]");
    }

    #[test]
    fn deep_formula_fails_alone() {
        let deep = format!("{}a{}", "(not ".repeat(200_000), ")".repeat(200_000));
        let db = db(vec![("A", vec!["(or a c)", deep.as_str(), "b"])]);
        let t = translate(&Syntax::Sexp, &db, false).unwrap();
        assert_eq!(lines(&t), vec!["(def(a)|def(c))", "def(b)"]);
        assert_eq!(t.failures.len(), 1);
        assert!(matches!(
            t.failures[0].error.downcast_ref::<Error>(),
            Some(Error::TooDeep { .. })
        ));
    }

    #[test]
    fn variable_set() {
        let db = db(vec![("X", vec!["(and a b)", "(or a c)"])]);
        let t = translate(&Syntax::Sexp, &db, false).unwrap();
        assert_eq!(t.variables(), ["a", "b", "c"].iter().copied().collect());
    }
}
