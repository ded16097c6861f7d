// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The solver's output types (§3, §6): `TransitivePackageInfo` and `Transaction`.

use crate::package::{GroupName, Package};
use indexmap::IndexMap;
use marker_algebra::Marker;

/// Everything the aggregation pipeline learned about one package's place in the dependency
/// graph: how deep it sits, which groups reach it, under what conditions, and whether every
/// path to it passes through an optional edge.
#[derive(Clone, Debug, Default)]
pub struct TransitivePackageInfo {
    /// `max` over every DFS node sharing this package's base name (§4.D). `-1` for the root.
    pub depth: i64,
    /// The union of dependency groups that reach this package.
    pub groups: indexmap::IndexSet<GroupName>,
    /// `true` iff every path from the root to this package passes through at least one optional
    /// dependency (Testable Property 3).
    pub optional: bool,
    /// Per-group marker: the boolean condition under which this package is required in that
    /// group. Populated by the marker fixed-point (§4.E); `keys() == groups` always holds for
    /// a fully-converged result (Testable Property 1).
    pub markers: IndexMap<GroupName, Marker>,
}

impl TransitivePackageInfo {
    /// An empty record with `EmptyMarker` for every group in `groups`, used as the fixed-point's
    /// starting state before any marker contribution has been folded in (§4.E).
    pub fn empty_for_groups(groups: indexmap::IndexSet<GroupName>, depth: i64, optional: bool) -> Self {
        let markers = groups
            .iter()
            .map(|g| (g.clone(), Marker::empty()))
            .collect();
        Self {
            depth,
            groups,
            optional,
            markers,
        }
    }
}

/// The solver's final output (§6): the full package set, what was selected for installation, and
/// the per-package transitive metadata.
#[derive(Clone, Debug)]
pub struct Transaction {
    /// The flat, pre-folding package list as chosen by the upstream resolver.
    pub locked: Vec<Package>,
    /// Per-base-package transitive metadata, keyed by the package itself.
    pub solved: IndexMap<Package, TransitivePackageInfo>,
    /// The packages that would actually be installed (non-optional, or optional-but-activated;
    /// left as the full solved set here since activation policy is an external installer
    /// concern -- §6 names this field but does not specify an activation algorithm).
    pub installed: Vec<Package>,
    /// The root project package this transaction was solved for.
    pub root: Package,
}
