// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! E4 (feature-variant requires fold into the base package) and E5 (a variant's self-referential
//! dependency is dropped rather than creating a self-loop), spec §8, driven end-to-end through
//! `Solver::solve`.

use crate::common::{any_constraint, base, solve, version};
use depwalk_core::{Dependency, Package, PackageIdentity, PackageName};

fn variant(name: &str, ver: &str, extra: &str) -> Package {
    let mut identity = PackageIdentity::base(name, version(ver));
    identity.features.insert(extra.to_string());
    Package::new(identity)
}

/// root -> foo, and foo[x]'s own `bar` requirement folds into plain `foo` once feature folding
/// runs, so `bar` becomes reachable even though nothing depends on it directly.
#[test]
fn variant_requires_fold_into_the_base_and_become_reachable() {
    let mut root = base("root", "0.1.0");
    root.requires
        .push(Dependency::required(PackageName::from("foo"), any_constraint()));

    let foo = base("foo", "1.0");
    let mut foo_x = variant("foo", "1.0", "x");
    foo_x
        .requires
        .push(Dependency::required(PackageName::from("bar"), any_constraint()));
    let bar = base("bar", "1.0");

    let transaction = solve(root, vec![foo, foo_x, bar.clone()]);

    let bar_info = transaction.solved.get(&bar).expect("bar reachable only via the folded requirement");
    assert_eq!(bar_info.depth, 1);

    let folded_foo = transaction
        .solved
        .keys()
        .find(|p| p.name() == &PackageName::from("foo"))
        .expect("foo present in the solved set");
    assert!(folded_foo.requires.iter().any(|d| d.name == PackageName::from("bar")));
}

/// foo[x] requiring plain `foo` must not survive folding as `foo` requiring itself.
#[test]
fn self_referential_variant_dependency_does_not_survive_folding() {
    let mut root = base("root", "0.1.0");
    root.requires
        .push(Dependency::required(PackageName::from("foo"), any_constraint()));

    let foo = base("foo", "1.0");
    let mut foo_x = variant("foo", "1.0", "x");
    foo_x
        .requires
        .push(Dependency::required(PackageName::from("foo"), any_constraint()));

    let transaction = solve(root, vec![foo, foo_x]);

    let folded_foo = transaction
        .solved
        .keys()
        .find(|p| p.name() == &PackageName::from("foo"))
        .expect("foo present in the solved set");
    assert!(!folded_foo.requires.iter().any(|d| d.name == PackageName::from("foo")));
}
