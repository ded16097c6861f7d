// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! E3 (cycle termination and convergence), spec §8, driven end-to-end through `Solver::solve`.

use crate::common::{base, dep_with_marker, solve};
use depwalk_core::GroupName;
use marker_algebra::Marker;

/// a->b, b->a, root->a: the fixed-point must terminate despite the cycle, with both packages at
/// a finite depth and their markers converged to the root's own edge marker.
#[test]
fn cycle_terminates_and_converges_to_the_root_marker() {
    let win32 = Marker::parse_str(r#"sys_platform == "win32""#).unwrap();

    let mut root = base("root", "0.1.0");
    root.requires.push(dep_with_marker("a", win32.clone()));

    let mut a = base("a", "1.0");
    a.requires.push(dep_with_marker("b", Marker::any()));
    let mut b = base("b", "1.0");
    b.requires.push(dep_with_marker("a", Marker::any()));

    let transaction = solve(root, vec![a.clone(), b.clone()]);

    let a_info = transaction.solved.get(&a).unwrap();
    let b_info = transaction.solved.get(&b).unwrap();
    assert!(a_info.depth >= 0);
    assert!(b_info.depth >= 0);
    assert_eq!(a_info.markers.get(&GroupName::main()).unwrap(), &win32);
    assert_eq!(b_info.markers.get(&GroupName::main()).unwrap(), &win32);
}
