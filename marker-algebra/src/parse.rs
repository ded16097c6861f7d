// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A small recursive-descent parser for PEP 508-ish marker strings, e.g.
//! `sys_platform == "win32" and python_version >= "3.8"`.
//!
//! Not part of the spec's scope in itself, but every end-to-end test scenario needs a way to
//! write markers as strings rather than constructing [`Atom`] trees by hand. Grounded in
//! `pep508_rs::marker::parse` and `target_spec::parser` for overall shape (tokenize, then a
//! hand-written Pratt-free `or`/`and`/atom descent -- markers have no operator precedence beyond
//! those two levels, so a full precedence-climbing parser would be overkill).

use crate::dnf::Marker;
use crate::errors::Error;
use crate::expr::{Atom, ExtraOperator, MarkerOperator, MarkerValueString, MarkerValueVersion};
use pep440_rs::Version;
use std::iter::Peekable;
use std::str::{CharIndices, FromStr};

/// Parses a marker expression string into a [`Marker`].
pub fn parse(input: &str) -> Result<Marker, Error> {
    let tokens = lex(input)?;
    let mut parser = Parser {
        tokens: tokens.into_iter().peekable(),
        source: input,
    };
    let marker = parser.parse_or()?;
    if parser.tokens.peek().is_some() {
        return Err(Error::UnexpectedTrailingInput(input.to_string()));
    }
    Ok(marker)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    String(String),
    Op(MarkerOperator),
    And,
    Or,
    LParen,
    RParen,
}

fn lex(input: &str) -> Result<Vec<Token>, Error> {
    let mut tokens = Vec::new();
    let mut chars: Peekable<CharIndices> = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        match c {
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '\'' | '"' => {
                let quote = c;
                chars.next();
                let mut value = String::new();
                let mut closed = false;
                for (_, ch) in chars.by_ref() {
                    if ch == quote {
                        closed = true;
                        break;
                    }
                    value.push(ch);
                }
                if !closed {
                    return Err(Error::UnterminatedString(input.to_string()));
                }
                tokens.push(Token::String(value));
            }
            '=' | '!' | '<' | '>' | '~' => {
                let mut op = String::new();
                op.push(c);
                chars.next();
                if let Some(&(_, next)) = chars.peek() {
                    if next == '=' {
                        op.push(next);
                        chars.next();
                    }
                }
                let operator = match op.as_str() {
                    "==" => MarkerOperator::Equal,
                    "!=" => MarkerOperator::NotEqual,
                    "<" => MarkerOperator::LessThan,
                    "<=" => MarkerOperator::LessEqual,
                    ">" => MarkerOperator::GreaterThan,
                    ">=" => MarkerOperator::GreaterEqual,
                    "~=" => MarkerOperator::TildeEqual,
                    other => return Err(Error::UnknownOperator(other.to_string())),
                };
                tokens.push(Token::Op(operator));
            }
            c if c.is_alphanumeric() || c == '_' || c == '.' => {
                let rest = &input[start..];
                let len = rest
                    .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.'))
                    .unwrap_or(rest.len());
                let word = &rest[..len];
                for _ in 0..word.chars().count() {
                    chars.next();
                }
                match word {
                    "and" => tokens.push(Token::And),
                    "or" => tokens.push(Token::Or),
                    _ => tokens.push(Token::Ident(word.to_string())),
                }
            }
            other => return Err(Error::UnexpectedChar(other)),
        }
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: Peekable<std::vec::IntoIter<Token>>,
    source: &'a str,
}

impl<'a> Parser<'a> {
    fn parse_or(&mut self) -> Result<Marker, Error> {
        let mut marker = self.parse_and()?;
        while matches!(self.tokens.peek(), Some(Token::Or)) {
            self.tokens.next();
            let rhs = self.parse_and()?;
            marker = marker.union(&rhs);
        }
        Ok(marker)
    }

    fn parse_and(&mut self) -> Result<Marker, Error> {
        let mut marker = self.parse_term()?;
        while matches!(self.tokens.peek(), Some(Token::And)) {
            self.tokens.next();
            let rhs = self.parse_term()?;
            marker = marker.intersect(&rhs);
        }
        Ok(marker)
    }

    fn parse_term(&mut self) -> Result<Marker, Error> {
        match self.tokens.peek().cloned() {
            Some(Token::LParen) => {
                self.tokens.next();
                let inner = self.parse_or()?;
                match self.tokens.next() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(Error::UnbalancedParens(self.source.to_string())),
                }
            }
            Some(Token::Ident(_)) => self.parse_atom(),
            other => Err(Error::UnexpectedToken(format!("{other:?}"))),
        }
    }

    fn parse_atom(&mut self) -> Result<Marker, Error> {
        let key = match self.tokens.next() {
            Some(Token::Ident(ident)) => ident,
            other => return Err(Error::UnexpectedToken(format!("{other:?}"))),
        };
        let operator = match self.tokens.next() {
            Some(Token::Op(op)) => op,
            other => return Err(Error::UnexpectedToken(format!("{other:?}"))),
        };
        let value = match self.tokens.next() {
            Some(Token::String(s)) => s,
            other => return Err(Error::UnexpectedToken(format!("{other:?}"))),
        };

        let atom = build_atom(&key, operator, value)?;
        Ok(Marker::from_atoms(vec![atom]))
    }
}

fn build_atom(key: &str, operator: MarkerOperator, value: String) -> Result<Atom, Error> {
    if key == "extra" {
        let op = match operator {
            MarkerOperator::Equal => ExtraOperator::Equal,
            MarkerOperator::NotEqual => ExtraOperator::NotEqual,
            _ => return Err(Error::InvalidExtraOperator(operator.to_string())),
        };
        return Ok(Atom::Extra { operator: op, name: value });
    }

    if let Some(version_key) = version_key(key) {
        let version =
            Version::from_str(&value).map_err(|_| Error::InvalidVersion(value.clone()))?;
        return Ok(Atom::Version {
            key: version_key,
            operator,
            version,
        });
    }

    if let Some(string_key) = string_key(key) {
        return Ok(Atom::Str {
            key: string_key,
            operator,
            value,
        });
    }

    Err(Error::UnknownVariable(key.to_string()))
}

fn version_key(key: &str) -> Option<MarkerValueVersion> {
    match key {
        "python_version" => Some(MarkerValueVersion::PythonVersion),
        "python_full_version" => Some(MarkerValueVersion::PythonFullVersion),
        "implementation_version" => Some(MarkerValueVersion::ImplementationVersion),
        _ => None,
    }
}

fn string_key(key: &str) -> Option<MarkerValueString> {
    match key {
        "sys_platform" => Some(MarkerValueString::SysPlatform),
        "os_name" => Some(MarkerValueString::OsName),
        "platform_system" => Some(MarkerValueString::PlatformSystem),
        "platform_machine" => Some(MarkerValueString::PlatformMachine),
        "implementation_name" => Some(MarkerValueString::ImplementationName),
        "platform_python_implementation" => Some(MarkerValueString::PlatformPythonImplementation),
        _ => None,
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn parses_simple_equality() {
        let m = parse(r#"sys_platform == "win32""#).unwrap();
        assert_eq!(m.to_string(), "sys_platform == \"win32\"");
    }

    #[test]
    fn parses_conjunction() {
        let m = parse(r#"sys_platform == "win32" and python_version == "3.8""#).unwrap();
        assert_eq!(
            m.to_string(),
            "sys_platform == \"win32\" and python_version == \"3.8\""
        );
    }

    #[test]
    fn parses_disjunction_with_parens() {
        let m = parse(
            r#"(sys_platform == "win32" and python_version == "3.10") or (sys_platform == "linux" and python_version == "3.11")"#,
        )
        .unwrap();
        assert!(m.to_string().contains(" or "));
    }

    #[test]
    fn rejects_unknown_variable() {
        let err = parse(r#"bogus_var == "x""#).unwrap_err();
        assert!(matches!(err, Error::UnknownVariable(_)));
    }

    #[test]
    fn rejects_unbalanced_parens() {
        let err = parse(r#"(sys_platform == "win32""#).unwrap_err();
        assert!(matches!(err, Error::UnbalancedParens(_)));
    }
}
