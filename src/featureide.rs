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

//! FeatureIDE feature model export: a flat feature tree plus cross-tree constraints

use crate::expr::Expr;
use std::io::Write;

/// Escapes the characters of `text` that are special in XML.
fn escape(text: &str) -> String {
    let mut res = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => res.push_str("&amp;"),
            '<' => res.push_str("&lt;"),
            '>' => res.push_str("&gt;"),
            '"' => res.push_str("&quot;"),
            '\'' => res.push_str("&apos;"),
            c => res.push(c),
        }
    }
    res
}

/// Displays a formula as the content of a FeatureIDE `<rule>`.
pub struct Rule<'a>(pub &'a Expr);

impl<'a> std::fmt::Display for Rule<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (tag, operands) = match self.0 {
            Expr::Var(name) => return write!(f, "<var>{}</var>", escape(name)),
            Expr::Not(operand) => return write!(f, "<not>{}</not>", Rule(operand)),
            Expr::And(operands) => ("conj", operands),
            Expr::Or(operands) => ("disj", operands),
        };
        write!(f, "<{}>", tag)?;
        for operand in operands {
            write!(f, "{}", Rule(operand))?;
        }
        write!(f, "</{}>", tag)
    }
}

/// Writes a feature model with one optional feature per name of `features` under a mandatory
/// root, and one constraint per formula.
pub fn write<'f, 'e, W: Write>(
    mut out: W,
    features: impl IntoIterator<Item = &'f str>,
    formulas: impl IntoIterator<Item = &'e Expr>,
) -> std::io::Result<()> {
    writeln!(
        out,
        r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<featureModel>
  <properties/>
  <struct>
    <and mandatory="true" name="root">"#
    )?;
    for feature in features {
        writeln!(out, r#"      <feature name="{}"/>"#, escape(feature))?;
    }
    writeln!(
        out,
        r#"    </and>
  </struct>
  <constraints>"#
    )?;
    for e in formulas {
        writeln!(out, "    <rule>{}</rule>", Rule(e))?;
    }
    writeln!(
        out,
        r#"  </constraints>
  <calculations Auto="true" Constraints="true" Features="true" Redundant="true" Tautology="true"/>
  <comments/>
  <featureOrder userDefined="false"/>
</featureModel>"#
    )
}
