// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Feature Folding (§4.G): merges extras-activated package variants into their base package.
//!
//! Grounded on `guppy::graph::feature::build`'s own base/variant bookkeeping -- `guppy` also
//! partitions a package's own feature declarations away from its base dependency set before
//! building a graph over them.

use crate::package::{Package, PackageIdentity};
use indexmap::IndexMap;

/// Folds every feature-variant package in `packages` into its base package's `requires`, in
/// place (§4.G).
///
/// Variants are *not* removed from `packages` -- the graph builder (§4.B) still needs to index
/// them, since something may depend directly on `foo[x]`'s own DFS node (SPEC_FULL §4.G). Only
/// the final aggregated output (`graph::aggregate_transitive`) excludes them, by construction,
/// once nodes are bucketed by base name.
pub(crate) fn fold(packages: &mut [Package]) {
    let mut base_index: IndexMap<PackageIdentity, usize> = IndexMap::new();
    for (i, package) in packages.iter().enumerate() {
        if !package.identity.is_feature_variant() {
            base_index.insert(package.identity.clone(), i);
        }
    }

    // Collect additions before mutating: `packages` is borrowed immutably above and we can't
    // interleave reads of one entry with writes to another through a single slice borrow.
    let mut additions: IndexMap<PackageIdentity, Vec<_>> = IndexMap::new();
    for package in packages.iter() {
        if !package.identity.is_feature_variant() {
            continue;
        }
        let base_identity = package.identity.base_identity();
        if !base_index.contains_key(&base_identity) {
            tracing::debug!(
                package = %package,
                "feature variant has no matching base package; its requirements are dropped"
            );
            continue;
        }
        for dep in &package.requires {
            // Prevents self-loops: `foo[x]` requiring plain `foo` must not become `foo`
            // requiring itself once folded (§4.G).
            if dep.name == base_identity.name {
                continue;
            }
            additions
                .entry(base_identity.clone())
                .or_default()
                .push(dep.clone());
        }
    }

    for (base_identity, deps) in additions {
        let idx = base_index[&base_identity];
        let base = &mut packages[idx];
        for dep in deps {
            // Duplicate suppression: a dep is a duplicate iff an existing dep compares equal
            // *and* has an equal marker (§4.G, §9 Open Question #1 -- `Dependency::eq` already
            // encodes exactly this compound key, see `package.rs`).
            if !base.requires.iter().any(|existing| *existing == dep) {
                base.requires.push(dep);
            }
        }
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::package::{Dependency, PackageName};
    use marker_algebra::Marker;
    use pep440_rs::VersionSpecifiers;
    use std::str::FromStr;

    fn version(s: &str) -> pep440_rs::Version {
        pep440_rs::Version::from_str(s).unwrap()
    }

    fn any_constraint() -> VersionSpecifiers {
        VersionSpecifiers::from_str("").unwrap()
    }

    fn base_package(name: &str, version_str: &str) -> Package {
        Package::new(PackageIdentity::base(name, version(version_str)))
    }

    fn variant_package(name: &str, version_str: &str, extra: &str) -> Package {
        let mut identity = PackageIdentity::base(name, version(version_str));
        identity.features.insert(extra.to_string());
        Package::new(identity)
    }

    #[test]
    fn folds_variant_requires_into_base() {
        let mut foo = base_package("foo", "1.0");
        let mut foo_x = variant_package("foo", "1.0", "x");
        foo_x
            .requires
            .push(Dependency::required(PackageName::from("bar"), any_constraint()));
        foo.requires.clear();

        let mut packages = vec![foo, foo_x];
        fold(&mut packages);

        let folded_base = packages
            .iter()
            .find(|p| !p.identity.is_feature_variant())
            .unwrap();
        assert_eq!(folded_base.requires.len(), 1);
        assert_eq!(folded_base.requires[0].name, PackageName::from("bar"));
        // the variant itself survives in the flat list (§4.G / SPEC_FULL)
        assert_eq!(packages.len(), 2);
    }

    #[test]
    fn skips_self_referential_dependency() {
        let foo = base_package("foo", "1.0");
        let mut foo_x = variant_package("foo", "1.0", "x");
        foo_x
            .requires
            .push(Dependency::required(PackageName::from("foo"), any_constraint()));

        let mut packages = vec![foo, foo_x];
        fold(&mut packages);

        let folded_base = packages
            .iter()
            .find(|p| !p.identity.is_feature_variant())
            .unwrap();
        assert!(folded_base.requires.is_empty());
    }

    #[test]
    fn keeps_duplicate_deps_with_different_markers() {
        let mut foo = base_package("foo", "1.0");
        let mut low = Dependency::required(PackageName::from("bar"), any_constraint());
        low.marker = Marker::parse_str(r#"python_version >= "3.10""#).unwrap();
        foo.requires.push(low);

        let mut foo_x = variant_package("foo", "1.0", "x");
        let mut high = Dependency::required(PackageName::from("bar"), any_constraint());
        high.marker = Marker::parse_str(r#"python_version < "3.10""#).unwrap();
        foo_x.requires.push(high);

        let mut packages = vec![foo, foo_x];
        fold(&mut packages);

        let folded_base = packages
            .iter()
            .find(|p| !p.identity.is_feature_variant())
            .unwrap();
        assert_eq!(folded_base.requires.len(), 2);
    }
}
