// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! E1 (linear chain) and E2 (diamond with disjoint conditions), spec §8, driven end-to-end
//! through `Solver::solve`.

use crate::common::{base, dep_with_marker, solve};
use depwalk_core::GroupName;
use marker_algebra::Marker;

/// root -> a (win32) -> b (py3.8): each hop's marker intersects with the one above it.
#[test]
fn linear_chain_intersects_markers_down_the_path() {
    let win32 = Marker::parse_str(r#"sys_platform == "win32""#).unwrap();
    let py38 = Marker::parse_str(r#"python_version == "3.8""#).unwrap();

    let mut root = base("root", "0.1.0");
    root.requires.push(dep_with_marker("a", win32.clone()));

    let mut a = base("a", "1.0");
    a.requires.push(dep_with_marker("b", py38.clone()));
    let b = base("b", "1.0");

    let transaction = solve(root, vec![a.clone(), b.clone()]);

    let a_info = transaction.solved.get(&a).unwrap();
    assert_eq!(a_info.depth, 0);
    assert_eq!(a_info.markers.get(&GroupName::main()).unwrap(), &win32);

    let b_info = transaction.solved.get(&b).unwrap();
    assert_eq!(b_info.depth, 1);
    assert_eq!(
        b_info.markers.get(&GroupName::main()).unwrap(),
        &win32.intersect(&py38)
    );
}

/// root->a(win32), root->b(linux), a->e(py310), b->e(py311): the two disjoint paths to `e`
/// union rather than collapse into each other.
#[test]
fn diamond_unions_the_two_disjoint_paths() {
    let win32 = Marker::parse_str(r#"sys_platform == "win32""#).unwrap();
    let linux = Marker::parse_str(r#"sys_platform == "linux""#).unwrap();
    let py310 = Marker::parse_str(r#"python_version == "3.10""#).unwrap();
    let py311 = Marker::parse_str(r#"python_version == "3.11""#).unwrap();

    let mut root = base("root", "0.1.0");
    root.requires.push(dep_with_marker("a", win32.clone()));
    root.requires.push(dep_with_marker("b", linux.clone()));

    let mut a = base("a", "1.0");
    a.requires.push(dep_with_marker("e", py310.clone()));
    let mut b = base("b", "1.0");
    b.requires.push(dep_with_marker("e", py311.clone()));
    let e = base("e", "1.0");

    let transaction = solve(root, vec![a, b, e.clone()]);

    let e_info = transaction.solved.get(&e).unwrap();
    let expected = win32.intersect(&py310).union(&linux.intersect(&py311));
    assert_eq!(e_info.markers.get(&GroupName::main()).unwrap(), &expected);
}
