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

//! CNF encoding of formulas, for DIMACS output

use crate::expr::Expr;
use std::collections::BTreeMap;
use std::io::Write;
use tracing::trace;
pub use varisat_dimacs::{write_dimacs, DimacsParser};
pub use varisat_formula::{CnfFormula, ExtendFormula, Lit, Var};

/// Mapping from cnf variable to configuration variable name
pub type SymbolTable = BTreeMap<Var, String>;

/// Converts a formula to dimacs in a string, for debugging.
#[cfg(test)]
fn to_dimacs_string(f: &CnfFormula) -> anyhow::Result<String> {
    let mut buf = Vec::new();
    write_dimacs(&mut buf, f)?;
    Ok(String::from_utf8(buf)?)
}

struct Tseitin {
    formula: CnfFormula,
    names: BTreeMap<String, Var>,
}

impl Tseitin {
    /// returns a literal equivalent to `e`, adding definitions for fresh variables as needed
    fn encode(&mut self, e: &Expr) -> Lit {
        match e {
            Expr::Var(name) => Lit::from_var(self.names[name.as_str()], true),
            Expr::Not(e) => !self.encode(e),
            Expr::And(operands) | Expr::Or(operands) if operands.len() == 1 => {
                self.encode(&operands[0])
            }
            Expr::And(operands) => {
                let lits: Vec<Lit> = operands.iter().map(|e| self.encode(e)).collect();
                let c = Lit::from_var(self.formula.new_var(), true);
                for &a in lits.iter() {
                    self.formula.add_clause(&[!c, a]);
                }
                let mut long: Vec<Lit> = lits.iter().map(|&a| !a).collect();
                long.push(c);
                self.formula.add_clause(&long);
                c
            }
            Expr::Or(operands) => {
                let lits: Vec<Lit> = operands.iter().map(|e| self.encode(e)).collect();
                let c = Lit::from_var(self.formula.new_var(), true);
                for &a in lits.iter() {
                    self.formula.add_clause(&[c, !a]);
                }
                let mut long = lits;
                long.push(!c);
                self.formula.add_clause(&long);
                c
            }
        }
    }

    fn assert(&mut self, e: &Expr) {
        match e {
            Expr::And(operands) => {
                for operand in operands {
                    self.assert(operand)
                }
            }
            e => {
                let root = self.encode(e);
                self.formula.add_clause(&[root]);
            }
        }
    }
}

/// Encodes the conjunction of `formulas` into CNF with the Tseitin transformation.
///
/// Named variables get the first indices, in order of first appearance. Each `and`/`or` node
/// with several operands gets a fresh variable, so the result is equisatisfiable with the input,
/// and its models projected to the named variables are exactly the models of the input.
pub fn to_cnf<'a>(
    formulas: impl IntoIterator<Item = &'a Expr> + Clone,
) -> (CnfFormula, SymbolTable) {
    let mut names = BTreeMap::new();
    let mut symbol_table = SymbolTable::new();
    for e in formulas.clone() {
        for name in e.variables() {
            if !names.contains_key(name) {
                let v = Var::from_index(names.len());
                names.insert(name.to_owned(), v);
                symbol_table.insert(v, name.to_owned());
            }
        }
    }
    let mut formula = CnfFormula::new();
    formula.set_var_count(names.len());
    let mut tseitin = Tseitin { formula, names };
    for e in formulas {
        tseitin.assert(e);
    }
    trace!(
        named_vars = symbol_table.len(),
        var_count = tseitin.formula.var_count(),
        clause_count = tseitin.formula.len(),
        "tseitin encoding"
    );
    (tseitin.formula, symbol_table)
}

/// Writes the formula in dimacs format, preceded by one `c <index> <name>` comment per named
/// variable.
pub fn write<W: Write>(
    mut out: W,
    formula: &CnfFormula,
    symbol_table: &SymbolTable,
) -> std::io::Result<()> {
    for (var, name) in symbol_table.iter() {
        writeln!(out, "c {} {}", var.to_dimacs(), name)?;
    }
    write_dimacs(&mut out, formula)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::expr::random_expr;
    use crate::kconfigreader::parse;

    /// whether the assignment (bit i of `bits` is the value of var of index i) satisfies `f`
    fn satisfies(bits: u32, f: &CnfFormula) -> bool {
        f.iter().all(|clause| {
            clause
                .iter()
                .any(|lit| ((bits >> lit.index()) & 1 == 1) ^ lit.is_negative())
        })
    }

    #[test]
    fn small_encoding() -> anyhow::Result<()> {
        let formulas = vec![parse("(def(a)&(def(b)|def(c)))")?, parse("!def(a)")?];
        let (formula, symbol_table) = to_cnf(&formulas);
        let expected = DimacsParser::parse(
            b"p cnf 4 6
1 0
4 -2 0
4 -3 0
2 3 -4 0
4 0
-1 0
" as &[u8],
        )?;
        assert_eq!(formula, expected);
        let mut out = Vec::new();
        write(&mut out, &formula, &symbol_table)?;
        let text = String::from_utf8(out)?;
        assert!(text.starts_with("c 1 a\nc 2 b\nc 3 c\np cnf 4 6\n"), "{}", text);
        assert_eq!(DimacsParser::parse(text.as_bytes())?, formula);
        Ok(())
    }

    #[test]
    fn names_in_order_of_appearance() {
        let formulas = vec![parse("!def(z)").unwrap(), parse("(def(a)|def(z))").unwrap()];
        let (_, symbol_table) = to_cnf(&formulas);
        let names: Vec<&str> = symbol_table.values().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["z", "a"]);
        assert_eq!(symbol_table.keys().next(), Some(&Var::from_dimacs(1)));
    }

    #[test]
    fn random_formulas_keep_their_models() {
        let mut rng = rand::thread_rng();
        let mut checked = 0;
        while checked < 50 {
            let formulas = vec![random_expr(&mut rng, 2, 3), random_expr(&mut rng, 2, 3)];
            let (formula, symbol_table) = to_cnf(&formulas);
            let nvars = formula.var_count();
            if nvars > 18 {
                continue;
            }
            checked += 1;
            let named = symbol_table.len();
            // named assignment -> number of cnf models extending it
            let mut extensions = vec![0usize; 1 << named];
            for bits in 0..(1u32 << nvars) {
                if satisfies(bits, &formula) {
                    extensions[(bits & ((1 << named) - 1)) as usize] += 1;
                }
            }
            for (assignment, &count) in extensions.iter().enumerate() {
                let value = |name: &str| {
                    symbol_table
                        .iter()
                        .any(|(v, n)| n == name && (assignment >> v.index()) & 1 == 1)
                };
                let expected = formulas.iter().all(|e| e.eval(&value));
                assert_eq!(
                    count,
                    expected as usize,
                    "{:?} under {:b}:\n{}",
                    &formulas,
                    assignment,
                    to_dimacs_string(&formula).unwrap()
                );
            }
        }
    }
}
