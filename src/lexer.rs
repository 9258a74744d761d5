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

//! Tokenizer for the bracketed prefix syntax

use crate::error::{excerpt, Error};
use nom::branch::alt;
use nom::bytes::complete::{take_while, take_while1};
use nom::character::complete::{char, digit1, satisfy};
use nom::combinator::{map, map_res, not, opt, recognize};
use nom::sequence::{delimited, pair, terminated, tuple};
use nom::IResult;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use std::str::FromStr;

/// A numeric literal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Number {
    /// A literal without fractional part, or whose fractional part is zero
    Integer(BigInt),
    /// A literal with a non zero fractional part, kept exactly
    Decimal(BigRational),
}

impl Number {
    /// Parses `-?\d+(\.\d+)?`.
    /// # Example
    /// ```
    /// use kclausefmt::lexer::Number;
    /// assert_eq!(Number::from_literal("-12").unwrap(), Number::Integer((-12).into()));
    /// assert_eq!(Number::from_literal("3.00").unwrap(), Number::Integer(3.into()));
    /// assert_eq!(Number::from_literal("0.5").unwrap().to_string(), "0.5");
    /// ```
    pub fn from_literal(text: &str) -> Result<Number, num_bigint::ParseBigIntError> {
        let (int_part, frac_part) = match text.find('.') {
            Some(dot) => (&text[..dot], &text[dot + 1..]),
            None => return Ok(Number::Integer(BigInt::from_str(text)?)),
        };
        let numerator = BigInt::from_str(&format!("{}{}", int_part, frac_part))?;
        let denominator = num_traits::pow(BigInt::from(10u32), frac_part.len());
        let value = BigRational::new(numerator, denominator);
        if value.is_integer() {
            Ok(Number::Integer(value.to_integer()))
        } else {
            Ok(Number::Decimal(value))
        }
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Number::Integer(n) => write!(f, "{}", n),
            Number::Decimal(r) => {
                let ten = BigRational::from_integer(BigInt::from(10u32));
                let mut scaled = r.clone();
                let mut digits = 0;
                while !scaled.is_integer() {
                    if digits > 64 {
                        // not a decimal literal
                        return write!(f, "{}", r);
                    }
                    scaled = scaled * &ten;
                    digits += 1;
                }
                let scaled = scaled.to_integer();
                let mut text = scaled.abs().to_string();
                if text.len() <= digits {
                    text = format!("{}{}", "0".repeat(digits + 1 - text.len()), text);
                }
                let (int_part, frac_part) = text.split_at(text.len() - digits);
                let sign = if scaled.is_negative() && !scaled.is_zero() {
                    "-"
                } else {
                    ""
                };
                write!(f, "{}{}.{}", sign, int_part, frac_part)
            }
        }
    }
}

/// A lexical token of the bracketed prefix syntax
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `(`
    Open,
    /// `)`
    Close,
    /// A numeric literal
    Number(Number),
    /// A double quoted string, without its quotes
    Str(String),
    /// A maximal run of characters other than whitespace, brackets and quotes
    Symbol(String),
}

fn is_symbol_char(c: char) -> bool {
    !c.is_whitespace() && !c.is_control() && c != '(' && c != ')' && c != '"'
}

fn number(input: &str) -> IResult<&str, Token> {
    map_res(
        terminated(
            recognize(tuple((
                opt(char('-')),
                digit1,
                opt(pair(char('.'), digit1)),
            ))),
            // `64BIT` is a symbol, not 64 followed by BIT
            not(satisfy(is_symbol_char)),
        ),
        |text: &str| Number::from_literal(text).map(Token::Number),
    )(input)
}

fn string(input: &str) -> IResult<&str, Token> {
    map(
        delimited(char('"'), take_while(|c| c != '"'), char('"')),
        |s: &str| Token::Str(s.to_owned()),
    )(input)
}

fn symbol(input: &str) -> IResult<&str, Token> {
    map(take_while1(is_symbol_char), |s: &str| {
        Token::Symbol(s.to_owned())
    })(input)
}

fn token(input: &str) -> IResult<&str, Token> {
    alt((
        map(char('('), |_| Token::Open),
        map(char(')'), |_| Token::Close),
        number,
        string,
        symbol,
    ))(input)
}

/// Splits a formula into tokens, lazily.
///
/// Yields each token with the byte offset where it starts. After the first error, the iterator
/// is exhausted.
pub struct Tokenizer<'a> {
    /// whole text, for offsets
    text: &'a str,
    /// what remains to tokenize
    rest: &'a str,
    failed: bool,
}

impl<'a> Tokenizer<'a> {
    /// Creates a tokenizer over `text`.
    pub fn new(text: &'a str) -> Self {
        Tokenizer {
            text,
            rest: text,
            failed: false,
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<(usize, Token), Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let rest = self.rest.trim_start();
        self.rest = rest;
        if rest.is_empty() {
            return None;
        }
        let offset = self.text.len() - rest.len();
        match token(rest) {
            Ok((remaining, token)) => {
                self.rest = remaining;
                Some(Ok((offset, token)))
            }
            Err(_) => {
                self.failed = true;
                Some(Err(Error::MalformedInput {
                    offset,
                    found: excerpt(self.text, offset),
                }))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn tokens(text: &str) -> Result<Vec<Token>, Error> {
        Tokenizer::new(text).map(|r| r.map(|(_, t)| t)).collect()
    }

    fn sym(s: &str) -> Token {
        Token::Symbol(s.to_owned())
    }

    #[test]
    fn all_token_kinds() {
        let t = tokens(" (and a\n\t\"b c\" -1 2.50 3.0 64BIT x-1) ").unwrap();
        assert_eq!(
            t,
            vec![
                Token::Open,
                sym("and"),
                sym("a"),
                Token::Str("b c".to_owned()),
                Token::Number(Number::Integer((-1).into())),
                Token::Number(Number::Decimal(BigRational::new(5.into(), 2.into()))),
                Token::Number(Number::Integer(3.into())),
                sym("64BIT"),
                sym("x-1"),
                Token::Close,
            ]
        );
    }

    #[test]
    fn brackets_split_symbols() {
        assert_eq!(
            tokens("(not(a))").unwrap(),
            vec![
                Token::Open,
                sym("not"),
                Token::Open,
                sym("a"),
                Token::Close,
                Token::Close
            ]
        );
        assert_eq!(
            tokens("12)").unwrap(),
            vec![Token::Number(Number::Integer(12.into())), Token::Close]
        );
    }

    #[test]
    fn offsets() {
        let offsets: Vec<usize> = Tokenizer::new("( a  bc)")
            .map(|r| r.unwrap().0)
            .collect();
        assert_eq!(offsets, vec![0, 2, 5, 7]);
    }

    #[test]
    fn unterminated_string() {
        assert_eq!(
            tokens("(a \"bc"),
            Err(Error::MalformedInput {
                offset: 3,
                found: "\"bc".to_owned()
            })
        );
    }

    #[test]
    fn control_character() {
        let mut t = Tokenizer::new("a \u{1} b");
        assert_eq!(t.next(), Some(Ok((0, sym("a")))));
        assert!(matches!(
            t.next(),
            Some(Err(Error::MalformedInput { offset: 2, .. }))
        ));
        assert_eq!(t.next(), None);
    }

    #[test]
    fn decimal_display() {
        for text in &["0.5", "-0.25", "12.125", "-3.5"] {
            assert_eq!(&Number::from_literal(text).unwrap().to_string(), text);
        }
        assert_eq!(Number::from_literal("-0.0").unwrap().to_string(), "0");
    }
}
