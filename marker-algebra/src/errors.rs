// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors returned by `marker-algebra`.

use std::{error, fmt};

/// An error that happened while parsing or constructing a [`crate::Marker`].
#[derive(Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// An unexpected character was encountered while tokenizing a marker string.
    UnexpectedChar(char),
    /// A quoted string literal was never closed.
    UnterminatedString(String),
    /// An operator token did not match any known comparison operator.
    UnknownOperator(String),
    /// A marker used an environment variable this crate doesn't know about.
    UnknownVariable(String),
    /// `extra` was compared with an operator other than `==`/`!=`.
    InvalidExtraOperator(String),
    /// A version literal could not be parsed as a PEP 440 version.
    InvalidVersion(String),
    /// Parentheses in a marker expression did not balance.
    UnbalancedParens(String),
    /// The parser found a token it didn't expect at the current position.
    UnexpectedToken(String),
    /// Trailing input remained after a complete marker expression was parsed.
    UnexpectedTrailingInput(String),
    /// A python-constraint string (e.g. `">=3.8,<4.0"`) could not be parsed.
    InvalidConstraint(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Error::*;
        match self {
            UnexpectedChar(c) => write!(f, "unexpected character '{c}' in marker expression"),
            UnterminatedString(s) => write!(f, "unterminated string literal in '{s}'"),
            UnknownOperator(op) => write!(f, "unknown marker operator '{op}'"),
            UnknownVariable(var) => write!(f, "unknown marker variable '{var}'"),
            InvalidExtraOperator(op) => {
                write!(f, "'extra' can only be compared with == or !=, not '{op}'")
            }
            InvalidVersion(v) => write!(f, "invalid PEP 440 version literal '{v}'"),
            UnbalancedParens(s) => write!(f, "unbalanced parentheses in marker expression '{s}'"),
            UnexpectedToken(t) => write!(f, "unexpected token while parsing marker: {t}"),
            UnexpectedTrailingInput(s) => {
                write!(f, "unexpected trailing input after marker expression: '{s}'")
            }
            InvalidConstraint(s) => write!(f, "invalid python version constraint '{s}'"),
        }
    }
}

impl error::Error for Error {}
