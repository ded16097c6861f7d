// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A boolean algebra over PEP 508-style environment markers.
//!
//! `marker-algebra` provides [`Marker`], a value type representing a boolean expression over
//! interpreter and platform variables (`python_version`, `sys_platform`, `extra`, …). Markers
//! support the handful of operations a dependency resolver needs to combine them across a
//! dependency graph: [`Marker::intersect`], [`Marker::union`], [`Marker::without_extras`],
//! [`Marker::only`], and [`Marker::reduce_by_python_constraint`].
//!
//! # Representation
//!
//! A `Marker` is a disjunction of conjunctions ("DNF") of [`Atom`]s. This is not the most
//! compact representation (a binary decision diagram, as used by the production PEP 508 marker
//! implementations this crate's atom vocabulary is drawn from, shares structure across clauses),
//! but it makes `union` and `intersect` total, straightforward functions: union is
//! concatenate-and-dedup, intersect is the cartesian product of clauses. Two markers built
//! differently but denoting the same boolean function compare equal via a canonicalized
//! `Hash`/`Eq` (sorted, deduplicated clauses).
//!
//! ## Optional features
//!
//! * **`summaries`**: Enables `serde` support on [`Marker`].
//! * **`proptest1`**: Enables support for property-based testing of [`Marker`] using
//!   [`proptest`].
//!
//! # Examples
//!
//! ```
//! use marker_algebra::Marker;
//!
//! let win = Marker::parse_str(r#"sys_platform == "win32""#).unwrap();
//! let py38 = Marker::parse_str(r#"python_version == "3.8""#).unwrap();
//! let both = win.intersect(&py38);
//! assert_eq!(both.to_string(), "sys_platform == \"win32\" and python_version == \"3.8\"");
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![cfg_attr(doc_cfg, feature(doc_cfg, doc_auto_cfg))]

mod dnf;
pub mod errors;
mod expr;
mod parse;
#[cfg(feature = "proptest1")]
mod proptest_helpers;
mod range;

pub use dnf::{Marker, PythonConstraint};
pub use errors::Error;
pub use expr::{
    Atom, ExtraOperator, MarkerOperator, MarkerValueExtra, MarkerValueString, MarkerValueVersion,
};

impl Marker {
    /// Parses a marker expression string, e.g. `sys_platform == "win32" and python_version >=
    /// "3.8"`.
    pub fn parse_str(input: &str) -> Result<Marker, Error> {
        parse::parse(input)
    }
}

impl std::str::FromStr for Marker {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Marker::parse_str(input)
    }
}

#[cfg(feature = "summaries")]
mod serde_impl {
    use crate::Marker;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for Marker {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.to_string())
        }
    }

    impl<'de> Deserialize<'de> for Marker {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            Marker::parse_str(&s).map_err(de::Error::custom)
        }
    }
}
