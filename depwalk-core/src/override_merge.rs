// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Override Merger (§4.F): combines the per-rerun results produced when the upstream
//! resolver reports `OverrideNeeded`, intersecting each rerun's markers with that rerun's own
//! override marker and unioning the results into one accumulator.
//!
//! The "merge an accumulator left-to-right across reruns" shape has no direct teacher analog in
//! `guppy` (whose own multi-pass algorithms don't need to merge independently-computed results),
//! so it is built in the teacher's idiom instead: a small struct wrapping an `IndexMap`
//! accumulator with an explicit `merge_one` method, mirroring how
//! `guppy::graph::resolve_core::ResolveCore::union_with` mutates one accumulator in place across
//! repeated set operations.

use crate::package::{Package, PackageIdentity, PackageName};
use crate::transaction::TransitivePackageInfo;
use indexmap::map::Entry;
use indexmap::IndexMap;
use marker_algebra::Marker;

/// Accumulates [`TransitivePackageInfo`] across one or more override reruns (§4.F).
#[derive(Default)]
pub(crate) struct OverrideMerger {
    acc: IndexMap<PackageIdentity, (Package, TransitivePackageInfo)>,
}

impl OverrideMerger {
    pub(crate) fn new() -> Self {
        Self {
            acc: IndexMap::new(),
        }
    }

    /// Merges one rerun's aggregated result into the accumulator (§4.F pseudocode).
    ///
    /// `override_marker` is the conjunction of every replacement dependency's (extras-stripped)
    /// marker for this rerun -- see [`override_marker_for`].
    pub(crate) fn merge_one(
        &mut self,
        override_marker: &Marker,
        new_result: IndexMap<PackageName, (Package, TransitivePackageInfo)>,
    ) {
        for (_, (package, info)) in new_result {
            let identity = package.identity.clone();
            match self.acc.entry(identity) {
                Entry::Occupied(mut entry) => {
                    let (existing_package, existing_info) = entry.get_mut();
                    existing_info.depth = existing_info.depth.max(info.depth);
                    existing_info.groups.extend(info.groups.iter().cloned());
                    // Not part of the §4.F pseudocode, which is silent on `optional` across
                    // reruns; extended here consistently with §3's "optional iff every arrival
                    // is optional" so a package doesn't look unconditionally required just
                    // because one override rerun happened not to gate it.
                    existing_info.optional = existing_info.optional && info.optional;
                    for (group, marker) in &info.markers {
                        let current = existing_info
                            .markers
                            .get(group)
                            .cloned()
                            .unwrap_or_else(Marker::empty);
                        existing_info
                            .markers
                            .insert(group.clone(), current.union(&override_marker.intersect(marker)));
                    }
                    for dep in &package.requires {
                        if !existing_package.requires.iter().any(|d| d == dep) {
                            existing_package.requires.push(dep.clone());
                        }
                    }
                }
                Entry::Vacant(entry) => {
                    let mut info = info;
                    for marker in info.markers.values_mut() {
                        *marker = override_marker.intersect(marker);
                    }
                    entry.insert((package, info));
                }
            }
        }
    }

    /// Consumes the merger, returning the final per-package accumulator.
    pub(crate) fn finish(self) -> IndexMap<PackageIdentity, (Package, TransitivePackageInfo)> {
        self.acc
    }
}

/// Computes one override rerun's `override_marker` (§4.F): the intersection, over every
/// replacement dependency in every package's override map, of that dependency's marker with
/// its `extra` atoms stripped.
pub(crate) fn override_marker_for(
    override_map: &IndexMap<Package, IndexMap<PackageName, crate::package::Dependency>>,
) -> Marker {
    let mut marker = Marker::any();
    for replacements in override_map.values() {
        for dep in replacements.values() {
            marker = marker.intersect(&dep.marker.without_extras());
        }
    }
    marker
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::package::PackageIdentity;
    use crate::transaction::TransitivePackageInfo;
    use indexmap::IndexSet;
    use pep440_rs::Version;
    use std::str::FromStr;

    fn group(name: &str) -> crate::package::GroupName {
        crate::package::GroupName::new(name)
    }

    fn info_with_marker(group_name: &str, marker: Marker) -> TransitivePackageInfo {
        let mut groups = IndexSet::new();
        groups.insert(group(group_name));
        let mut info = TransitivePackageInfo::empty_for_groups(groups, 0, false);
        info.markers.insert(group(group_name), marker);
        info
    }

    fn pkg(name: &str) -> Package {
        Package::new(PackageIdentity::base(name, Version::from_str("1.0").unwrap()))
    }

    #[test]
    fn unions_markers_across_overrides_intersected_with_override_marker() {
        let mut merger = OverrideMerger::new();

        let posix = Marker::parse_str(r#"os_name == "posix""#).unwrap();
        let nt = Marker::parse_str(r#"os_name == "nt""#).unwrap();

        let mut first = IndexMap::new();
        first.insert(
            PackageName::from("foo"),
            (pkg("foo"), info_with_marker("main", Marker::any())),
        );
        merger.merge_one(&posix, first);

        let mut second = IndexMap::new();
        second.insert(
            PackageName::from("foo"),
            (pkg("foo"), info_with_marker("main", Marker::any())),
        );
        merger.merge_one(&nt, second);

        let acc = merger.finish();
        let (_, info) = acc
            .get(&PackageIdentity::base("foo", Version::from_str("1.0").unwrap()))
            .unwrap();
        let merged = info.markers.get(&group("main")).unwrap();
        assert_eq!(*merged, posix.union(&nt));
    }
}
