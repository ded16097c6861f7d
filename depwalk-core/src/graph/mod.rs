// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Components B–E of the aggregation pipeline (§4.B–§4.E): indexing the flat package list,
//! walking it with a cycle-tolerant DFS, aggregating nodes that share a base name, and running
//! the marker fixed-point over the result.
//!
//! [`aggregate_transitive`] is the single entry point `solver.rs` calls; everything else in
//! this module tree is private to the pipeline.

pub(crate) mod aggregate;
pub(crate) mod build;
pub(crate) mod dfs;
pub(crate) mod markers;

use crate::errors::Error;
use crate::package::{Package, PackageIdentity, PackageName};
use crate::solver::CancellationToken;
use crate::transaction::TransitivePackageInfo;
use build::PackageIndex;
use indexmap::IndexMap;

/// Runs the graph builder, cyclic DFS, depth/group aggregator, and marker fixed-point over
/// `packages` rooted at `root` (§4.B–§4.E), returning one [`TransitivePackageInfo`] per base
/// package reachable from the root.
///
/// `root` itself is never present in the returned map: by definition it has depth `-1` and is
/// surfaced separately as [`crate::transaction::Transaction`]'s `root` field (§3, §6).
///
/// `packages` is expected to already have feature variants folded into their bases
/// (`crate::feature_fold::fold`) -- this function still indexes variant identities (so a direct
/// `root -> foo[x]` edge is still discovered, §4.G) but only ever returns entries keyed by a
/// base identity.
pub(crate) fn aggregate_transitive(
    root: &Package,
    packages: &[Package],
    max_iterations: u32,
    cancel: &mut dyn CancellationToken,
) -> Result<IndexMap<PackageName, (Package, TransitivePackageInfo)>, Error> {
    let index = PackageIndex::new(packages);

    let walk = dfs::walk(root, &index)?;
    let mut aggregated = aggregate::aggregate(&walk);
    markers::run(
        &mut aggregated,
        &walk.parent_marker,
        root.name(),
        max_iterations,
        cancel,
    )?;

    let mut result = IndexMap::with_capacity(aggregated.len());
    for (name, agg) in aggregated {
        if &name == root.name() {
            continue;
        }
        let base_identity: &PackageIdentity = index
            .identities_named(&name)
            .iter()
            .copied()
            .find(|id| !id.is_feature_variant())
            .ok_or_else(|| {
                Error::InvalidState(format!(
                    "no base package found for `{name}` after feature folding"
                ))
            })?;
        let package = index
            .get(base_identity)
            .expect("identity came from the same index")
            .clone();
        result.insert(name, (package, agg.info));
    }
    Ok(result)
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::package::{Dependency, GroupName, PackageIdentity};
    use crate::solver::NeverCancel;
    use indexmap::IndexSet;
    use marker_algebra::Marker;
    use pep440_rs::{Version, VersionSpecifiers};
    use std::str::FromStr;

    fn version(s: &str) -> Version {
        Version::from_str(s).unwrap()
    }

    fn any_constraint() -> VersionSpecifiers {
        VersionSpecifiers::from_str("").unwrap()
    }

    fn base(name: &str, ver: &str) -> Package {
        Package::new(PackageIdentity::base(name, version(ver)))
    }

    fn dep_with_marker(name: &str, marker: Marker) -> Dependency {
        let mut dep = Dependency::required(PackageName::from(name), any_constraint());
        dep.marker = marker;
        dep
    }

    fn run(root: &Package, packages: &[Package]) -> IndexMap<PackageName, (Package, TransitivePackageInfo)> {
        aggregate_transitive(root, packages, 1000, &mut NeverCancel).unwrap()
    }

    // E1-E6 now live as end-to-end scenarios driven through the public `Solver` facade, under
    // `tests/graph-tests/` -- these remaining cases exercise `aggregate_transitive` itself, which
    // is `pub(crate)` and so cannot be reached from an integration test.

    #[test]
    fn package_unreachable_from_root_is_excluded_from_output() {
        // A package present in the flat list but never referenced by any `requires` edge is
        // never visited by the DFS, so it simply never appears in the aggregated output.
        let root = base("root", "0.1.0");
        let orphan = base("orphan", "1.0");
        let result = run(&root, std::slice::from_ref(&orphan));
        assert!(result.get(&PackageName::from("orphan")).is_none());
    }

    #[test]
    fn unreachable_group_member_keeps_empty_marker_for_other_groups() {
        // Property 4: a package reachable only through group "main" has EmptyMarker for "dev".
        let mut root = base("root", "0.1.0");
        let mut dep = Dependency::required(PackageName::from("a"), any_constraint());
        dep.groups = IndexSet::from_iter([GroupName::main()]);
        root.requires.push(dep);
        let a = base("a", "1.0");

        let result = run(&root, &[a]);
        let (_, a_info) = result.get(&PackageName::from("a")).unwrap();
        assert_eq!(a_info.groups, IndexSet::from_iter([GroupName::main()]));
        assert!(!a_info.markers.contains_key(&GroupName::new("dev")));
    }

    #[test]
    fn optional_holds_only_when_every_arrival_is_optional() {
        // Property 3: a package reached only through an optional edge is optional...
        let mut root = base("root", "0.1.0");
        let mut only_optional = Dependency::required(PackageName::from("a"), any_constraint());
        only_optional.optional = true;
        root.requires.push(only_optional);
        let a = base("a", "1.0");

        let result = run(&root, &[a]);
        let (_, a_info) = result.get(&PackageName::from("a")).unwrap();
        assert!(a_info.optional);

        // ...but a second, non-optional arrival at the same package drags it back to required.
        let mut root = base("root", "0.1.0");
        let mut optional_arrival = Dependency::required(PackageName::from("b"), any_constraint());
        optional_arrival.optional = true;
        root.requires.push(optional_arrival);
        root.requires
            .push(Dependency::required(PackageName::from("b"), any_constraint()));
        let b = base("b", "1.0");

        let result = run(&root, &[b]);
        let (_, b_info) = result.get(&PackageName::from("b")).unwrap();
        assert!(!b_info.optional);
    }

    #[test]
    fn rerunning_aggregation_on_the_same_input_is_idempotent() {
        // Property 5: re-running the pipeline over the same flat package list produces
        // byte-identical `TransitivePackageInfo` per package.
        let win32 = Marker::parse_str(r#"sys_platform == "win32""#).unwrap();

        let mut root = base("root", "0.1.0");
        root.requires.push(dep_with_marker("a", win32));
        let mut a = base("a", "1.0");
        a.requires.push(dep_with_marker("b", Marker::any()));
        let b = base("b", "1.0");
        let packages = [a, b];

        let first = run(&root, &packages);
        let second = run(&root, &packages);

        assert_eq!(first.len(), second.len());
        for (name, (package, info)) in &first {
            let (other_package, other_info) = second.get(name).expect("same name present in both runs");
            assert_eq!(package, other_package);
            assert_eq!(info.depth, other_info.depth);
            assert_eq!(info.groups, other_info.groups);
            assert_eq!(info.optional, other_info.optional);
            assert_eq!(info.markers, other_info.markers);
        }
    }
}
