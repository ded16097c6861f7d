// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property-testing support for [`Marker`], enabled by the `proptest1` feature.

use crate::dnf::Marker;
use crate::expr::{Atom, MarkerOperator, MarkerValueString, MarkerValueVersion};
use pep440_rs::Version;
use proptest::collection::vec;
use proptest::prelude::*;
use std::str::FromStr;

static KNOWN_PLATFORMS: &[&str] = &["win32", "linux", "darwin", "cygwin"];
static KNOWN_PY_VERSIONS: &[&str] = &["3.7", "3.8", "3.9", "3.10", "3.11", "3.12"];

fn atom_strategy() -> impl Strategy<Value = Atom> {
    prop_oneof![
        (0..KNOWN_PLATFORMS.len()).prop_map(|idx| Atom::Str {
            key: MarkerValueString::SysPlatform,
            operator: MarkerOperator::Equal,
            value: KNOWN_PLATFORMS[idx].to_string(),
        }),
        (0..KNOWN_PY_VERSIONS.len()).prop_map(|idx| Atom::Version {
            key: MarkerValueVersion::PythonVersion,
            operator: MarkerOperator::Equal,
            version: Version::from_str(KNOWN_PY_VERSIONS[idx]).expect("known version"),
        }),
    ]
}

/// The `Arbitrary` implementation for `Marker` generates a small DNF over a fixed vocabulary of
/// `sys_platform`/`python_version` atoms -- enough to exercise `union`/`intersect` algebraic
/// laws without needing to generate (and then dedup) arbitrary strings and versions.
impl Arbitrary for Marker {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        vec(vec(atom_strategy(), 0..3), 0..3)
            .prop_map(|clauses| {
                clauses
                    .into_iter()
                    .fold(Marker::empty(), |acc, clause| {
                        acc.union(&Marker::from_atoms(clause))
                    })
            })
            .boxed()
    }
}
