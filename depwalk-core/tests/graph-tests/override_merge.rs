// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! E6 (override merge unions markers across reruns, each intersected with its own override
//! marker), spec §8, driven end-to-end through `Solver::solve_with_overrides` via
//! `ResolveOutcome::OverrideNeeded`.

use crate::common::{base, dep_with_marker, solve_with_outcomes};
use depwalk_core::{GroupName, OverrideNeeded, PackageName, ResolveOutcome, SolverResult};
use indexmap::IndexMap;
use marker_algebra::Marker;

fn override_map_for(root: &depwalk_core::Package, marker: Marker) -> IndexMap<depwalk_core::Package, IndexMap<PackageName, depwalk_core::Dependency>> {
    let mut replacements = IndexMap::new();
    replacements.insert(PackageName::from("foo"), dep_with_marker("foo", marker));
    let mut override_map = IndexMap::new();
    override_map.insert(root.clone(), replacements);
    override_map
}

#[test]
fn unions_markers_across_override_reruns() {
    let posix = Marker::parse_str(r#"os_name == "posix""#).unwrap();
    let nt = Marker::parse_str(r#"os_name == "nt""#).unwrap();

    let mut root = base("root", "0.1.0");
    root.requires.push(dep_with_marker("foo", Marker::any()));
    let foo = base("foo", "1.0");

    let outcomes = vec![
        ResolveOutcome::OverrideNeeded(OverrideNeeded {
            overrides: vec![override_map_for(&root, posix.clone()), override_map_for(&root, nt.clone())],
        }),
        ResolveOutcome::Solved(SolverResult {
            packages: vec![foo.clone()],
            attempted_solutions: 1,
        }),
        ResolveOutcome::Solved(SolverResult {
            packages: vec![foo.clone()],
            attempted_solutions: 1,
        }),
    ];

    let transaction = solve_with_outcomes(root, outcomes);

    let foo_info = transaction.solved.get(&foo).unwrap();
    let merged = foo_info.markers.get(&GroupName::main()).unwrap();
    assert_eq!(*merged, posix.union(&nt));
}
