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

//! Errors of the formula translation core

use crate::expr::Operator;

/// Why a single formula could not be translated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The tokenizer found something that is not a token at byte `offset`.
    MalformedInput {
        /// byte offset in the formula text
        offset: usize,
        /// a short excerpt of the text at `offset`
        found: String,
    },
    /// A closing bracket without opening bracket, or an opening bracket that is never closed.
    UnbalancedBrackets {
        /// byte offset of the offending bracket, or length of the text if a bracket is left open
        offset: usize,
    },
    /// Lists or operators are nested deeper than `limit`.
    TooDeep {
        /// byte offset where the limit is exceeded
        offset: usize,
        /// maximum nesting depth
        limit: usize,
    },
    /// The text contains `count` top level expressions instead of exactly one.
    MultipleRoots {
        /// number of top level values found
        count: usize,
    },
    /// A list head which is not `and`, `or` or `not`, or a leaf which is not a symbol.
    UnknownOperator {
        /// the offending expression, printed
        found: String,
    },
    /// An operator with an operand count it does not accept.
    BadArity {
        /// the operator
        operator: Operator,
        /// how many operands it was given
        arity: usize,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::MalformedInput { offset, found } => {
                write!(f, "malformed input at offset {}: {:?}", offset, found)
            }
            Error::UnbalancedBrackets { offset } => {
                write!(f, "unbalanced brackets at offset {}", offset)
            }
            Error::TooDeep { offset, limit } => {
                write!(f, "nesting deeper than {} at offset {}", limit, offset)
            }
            Error::MultipleRoots { count } => write!(
                f,
                "expected exactly one top level expression, found {}",
                count
            ),
            Error::UnknownOperator { found } => write!(f, "unknown operator in {}", found),
            Error::BadArity { operator, arity } => {
                write!(f, "{} cannot take {} operands", operator, arity)
            }
        }
    }
}

impl std::error::Error for Error {}

/// Returns at most 20 characters of `text` starting at byte `offset`, for error messages.
pub(crate) fn excerpt(text: &str, offset: usize) -> String {
    text.get(offset..)
        .unwrap_or("")
        .chars()
        .take(20)
        .collect()
}

#[test]
fn messages() {
    let e = Error::MultipleRoots { count: 2 };
    assert_eq!(
        e.to_string(),
        "expected exactly one top level expression, found 2"
    );
    let e: anyhow::Error = Error::BadArity {
        operator: Operator::Not,
        arity: 3,
    }
    .into();
    assert_eq!(e.to_string(), "not cannot take 3 operands");
    let e = Error::TooDeep {
        offset: 12,
        limit: 512,
    };
    assert_eq!(e.to_string(), "nesting deeper than 512 at offset 12");
    assert_eq!(excerpt("(and a b)", 5), "a b)");
    assert_eq!(excerpt("abc", 10), "");
}
