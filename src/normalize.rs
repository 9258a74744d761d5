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

//! Rewriting of the call-style syntax of solver pretty printers into bracketed prefix syntax.
//!
//! The recognized input looks like `And(a, Or(b, Not(c)))`, possibly wrapped over several lines.
//! Only the three heads `And(`, `Or(` and `Not(` are rewritten, and only at the start of the text
//! or right after `(` or `,`: a variable named `FooAnd` stays a variable. Any other call-style head
//! is left as is and makes the result fail to parse or to type check.

const HEADS: &[(&str, &str)] = &[("And(", "(and "), ("Or(", "(or "), ("Not(", "(not ")];

/// Converts call-style text to bracketed prefix text.
/// # Example
/// ```
/// use kclausefmt::normalize::normalize;
/// assert_eq!(normalize("And(a,\n    Or(b, c))"), "(and a (or b c))");
/// ```
pub fn normalize(text: &str) -> String {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let mut res = String::with_capacity(compact.len() + 8);
    let mut rest = compact.as_str();
    let mut at_boundary = true;
    'outer: while let Some(c) = rest.chars().next() {
        if at_boundary {
            for (head, replacement) in HEADS {
                if let Some(after) = rest.strip_prefix(head) {
                    res.push_str(replacement);
                    rest = after;
                    continue 'outer;
                }
            }
        }
        match c {
            ',' => res.push(' '),
            c => res.push(c),
        }
        at_boundary = c == ',' || c == '(';
        rest = &rest[c.len_utf8()..];
    }
    res
}
