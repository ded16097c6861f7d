// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The atom vocabulary a [`crate::Marker`](crate::dnf::Marker) is built out of.
//!
//! Modeled after `pep508_rs::MarkerExpression`: an atom is one comparison between an
//! environment variable and a literal. `Marker` is a disjunction of conjunctions of these.

use pep440_rs::Version;
use std::cmp::Ordering;
use std::fmt;

/// An environment variable whose value is a PEP 440 version, such as `python_version`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum MarkerValueVersion {
    /// `python_version`
    PythonVersion,
    /// `python_full_version`
    PythonFullVersion,
    /// `implementation_version`
    ImplementationVersion,
}

impl MarkerValueVersion {
    /// Returns `true` if this variable denotes the interpreter's own version, as opposed to
    /// e.g. the implementation version.
    pub fn is_interpreter_version(self) -> bool {
        matches!(self, Self::PythonVersion | Self::PythonFullVersion)
    }
}

impl fmt::Display for MarkerValueVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PythonVersion => "python_version",
            Self::PythonFullVersion => "python_full_version",
            Self::ImplementationVersion => "implementation_version",
        };
        f.write_str(s)
    }
}

/// An environment variable whose value is an arbitrary string, such as `sys_platform`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum MarkerValueString {
    /// `sys_platform`
    SysPlatform,
    /// `os_name`
    OsName,
    /// `platform_system`
    PlatformSystem,
    /// `platform_machine`
    PlatformMachine,
    /// `implementation_name`
    ImplementationName,
    /// `platform_python_implementation`
    PlatformPythonImplementation,
}

impl fmt::Display for MarkerValueString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::SysPlatform => "sys_platform",
            Self::OsName => "os_name",
            Self::PlatformSystem => "platform_system",
            Self::PlatformMachine => "platform_machine",
            Self::ImplementationName => "implementation_name",
            Self::PlatformPythonImplementation => "platform_python_implementation",
        };
        f.write_str(s)
    }
}

/// A stand-in for `extra`: whether the package's consumer activated a named extra.
///
/// Kept as its own type (rather than folded into `MarkerValueString`) because `extra` is
/// special: it is not part of the evaluation environment, it is injected per-dependency by
/// the graph builder (§3, "Graph edges").
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct MarkerValueExtra;

impl fmt::Display for MarkerValueExtra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("extra")
    }
}

/// Comparison operators usable against version and string-valued variables.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum MarkerOperator {
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterEqual,
    /// `~=`
    TildeEqual,
}

impl fmt::Display for MarkerOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::LessEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterEqual => ">=",
            Self::TildeEqual => "~=",
        };
        f.write_str(s)
    }
}

/// The operator usable against `extra == "name"` / `extra != "name"`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ExtraOperator {
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
}

impl fmt::Display for ExtraOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
        };
        f.write_str(s)
    }
}

/// A single leaf comparison within a marker expression.
///
/// `Atom` intentionally has no notion of precedence or grouping -- that's `Marker`'s job, which
/// arranges atoms into a disjunction of conjunctions (a DNF).
#[derive(Clone, Debug)]
pub enum Atom {
    /// A comparison against a version-valued variable, e.g. `python_version >= "3.8"`.
    Version {
        /// The variable being compared.
        key: MarkerValueVersion,
        /// The comparison operator.
        operator: MarkerOperator,
        /// The version literal.
        version: Version,
    },
    /// A comparison against a string-valued variable, e.g. `sys_platform == "win32"`.
    Str {
        /// The variable being compared.
        key: MarkerValueString,
        /// The comparison operator (only `Equal`/`NotEqual` are meaningful here).
        operator: MarkerOperator,
        /// The string literal.
        value: String,
    },
    /// A comparison against `extra`, e.g. `extra == "dev"`.
    Extra {
        /// The comparison operator.
        operator: ExtraOperator,
        /// The extra name.
        name: String,
    },
}

impl Atom {
    /// Returns `true` if this atom is a comparison against `extra`.
    pub fn is_extra(&self) -> bool {
        matches!(self, Atom::Extra { .. })
    }

    /// Returns `true` if this atom compares the named version variable.
    pub fn is_version_key(&self, key: MarkerValueVersion) -> bool {
        matches!(self, Atom::Version { key: k, .. } if *k == key)
    }

    /// A stable sort/dedup key used to canonicalize clauses. Two atoms that denote the same
    /// comparison produce equal keys.
    fn sort_key(&self) -> (u8, String, u8, String) {
        match self {
            Atom::Version {
                key,
                operator,
                version,
            } => (0, key.to_string(), *operator as u8, version.to_string()),
            Atom::Str {
                key,
                operator,
                value,
            } => (1, key.to_string(), *operator as u8, value.clone()),
            Atom::Extra { operator, name } => (2, name.clone(), *operator as u8, String::new()),
        }
    }
}

// `MarkerOperator`/`ExtraOperator` as u8 via `as` casts above relies on the enums being
// fieldless, which they are; this mirrors `pep508_rs`'s approach of deriving `Ord` directly
// on its operator enums and comparing variant discriminants.

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }
}

impl Eq for Atom {}

impl std::hash::Hash for Atom {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.sort_key().hash(state);
    }
}

impl PartialOrd for Atom {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Atom {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Version {
                key,
                operator,
                version,
            } => write!(f, "{key} {operator} \"{version}\""),
            Atom::Str {
                key,
                operator,
                value,
            } => write!(f, "{key} {operator} \"{value}\""),
            Atom::Extra { operator, name } => write!(f, "extra {operator} \"{name}\""),
        }
    }
}
