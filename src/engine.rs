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

//! Interface to the engines producing formula texts from database fragments

use crate::error::{excerpt, Error};
use crate::kconfigreader;
use crate::normalize::normalize;
use crate::sexp::{self, Sexp, MAX_DEPTH};
use smt2parser::concrete::Command;
use smt2parser::CommandStream;
use anyhow::Context;
use tracing::trace;

/// The text of one formula, in one of the supported interchange formats
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interchange {
    /// Bracketed prefix syntax, `(and a (or b c))`
    Prefix(String),
    /// Call-style syntax of solver pretty printers, `And(a, Or(b, c))`
    CallStyle(String),
    /// kconfigreader syntax, `(def(a)&(def(b)|def(c)))`
    Infix(String),
}

impl Interchange {
    /// The formula text, as given
    pub fn text(&self) -> &str {
        match self {
            Interchange::Prefix(t) | Interchange::CallStyle(t) | Interchange::Infix(t) => t,
        }
    }

    /// Parses the formula to a tree.
    pub fn to_sexp(&self) -> Result<Sexp, Error> {
        match self {
            Interchange::Prefix(t) => sexp::parse(t),
            Interchange::CallStyle(t) => sexp::parse(&normalize(t)),
            Interchange::Infix(t) => kconfigreader::parse(t).map(|e| Sexp::from(&e)),
        }
    }
}

/// Something that turns a database fragment into formulas.
pub trait FormulaEngine {
    /// Returns the formulas of a fragment, in order. Fails if the fragment as a whole cannot be
    /// understood.
    fn formulas(&self, fragment: &str) -> anyhow::Result<Vec<Interchange>>;
}

/// Checks that every command of an SMT-LIB2 script is closed, and that terms are not nested
/// deeper than [`MAX_DEPTH`]. Strings, quoted symbols and comments are skipped.
///
/// `CommandStream` ends without error on a truncated last command.
fn check_brackets(script: &str) -> Result<(), Error> {
    let mut depth = 0usize;
    let mut chars = script.char_indices();
    while let Some((offset, c)) = chars.next() {
        match c {
            '"' | '|' => {
                if !chars.any(|(_, d)| d == c) {
                    return Err(Error::MalformedInput {
                        offset,
                        found: excerpt(script, offset),
                    });
                }
            }
            ';' => {
                for (_, d) in &mut chars {
                    if d == '\n' {
                        break;
                    }
                }
            }
            '(' => {
                depth += 1;
                // one more level for the command itself
                if depth > MAX_DEPTH + 1 {
                    return Err(Error::TooDeep {
                        offset,
                        limit: MAX_DEPTH,
                    });
                }
            }
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or(Error::UnbalancedBrackets { offset })?;
            }
            _ => (),
        }
    }
    if depth == 0 {
        Ok(())
    } else {
        Err(Error::UnbalancedBrackets {
            offset: script.len(),
        })
    }
}

/// Reads fragments as SMT-LIB2 scripts, and returns the term of each `assert` command.
pub struct Smt2;

impl FormulaEngine for Smt2 {
    fn formulas(&self, fragment: &str) -> anyhow::Result<Vec<Interchange>> {
        check_brackets(fragment).context("SMT2 parsing failure")?;
        let commands =
            CommandStream::new(fragment.as_bytes(), smt2parser::concrete::SyntaxBuilder);
        let mut res = Vec::new();
        for command in commands {
            let command = match command {
                Ok(c) => c,
                Err(position) => {
                    let p = std::path::PathBuf::from("<fragment>");
                    anyhow::bail!("SMT2 parsing failure at {}", position.location_in_file(&p))
                }
            };
            match command {
                Command::Assert { term } => res.push(Interchange::Prefix(term.to_string())),
                other => trace!(command = ?other, "skipping command"),
            }
        }
        Ok(res)
    }
}

/// Textual format of the fragments of a database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    /// SMT-LIB2 scripts, see [`Smt2`]
    Smt2,
    /// One formula per fragment in call-style syntax
    Pretty,
    /// One formula per fragment in bracketed prefix syntax
    Sexp,
    /// One formula per fragment in kconfigreader syntax
    KconfigReader,
}

impl FormulaEngine for Syntax {
    fn formulas(&self, fragment: &str) -> anyhow::Result<Vec<Interchange>> {
        let text = fragment.to_owned();
        Ok(match self {
            Syntax::Smt2 => return Smt2.formulas(fragment),
            Syntax::Pretty => vec![Interchange::CallStyle(text)],
            Syntax::Sexp => vec![Interchange::Prefix(text)],
            Syntax::KconfigReader => vec![Interchange::Infix(text)],
        })
    }
}
