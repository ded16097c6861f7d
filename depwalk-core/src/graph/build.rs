// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Graph Builder (§4.B): indexes the flat package list once so the DFS can answer "which
//! packages satisfy this dependency?" without a linear scan per edge.

use crate::package::{Dependency, Package, PackageIdentity, PackageName};
use indexmap::IndexMap;
use smallvec::SmallVec;

/// An index over a flat package list, built once on entry to a solve (§4.B ambient addition).
///
/// Using `IndexMap` rather than `HashMap` here is what gives the rest of the pipeline its
/// insertion-order determinism (§5, §9): iterating `by_name`'s value lists always yields
/// candidates in the order they appeared in the resolver's own output.
pub(crate) struct PackageIndex<'a> {
    by_identity: IndexMap<&'a PackageIdentity, &'a Package>,
    by_name: IndexMap<&'a PackageName, SmallVec<[&'a PackageIdentity; 2]>>,
}

impl<'a> PackageIndex<'a> {
    /// Indexes `packages` by identity and by name.
    pub(crate) fn new(packages: &'a [Package]) -> Self {
        let mut by_identity = IndexMap::with_capacity(packages.len());
        let mut by_name: IndexMap<&'a PackageName, SmallVec<[&'a PackageIdentity; 2]>> =
            IndexMap::new();
        for package in packages {
            by_identity.insert(&package.identity, package);
            by_name
                .entry(&package.identity.name)
                .or_default()
                .push(&package.identity);
        }
        Self {
            by_identity,
            by_name,
        }
    }

    /// Looks up a package by its exact identity.
    pub(crate) fn get(&self, identity: &PackageIdentity) -> Option<&'a Package> {
        self.by_identity.get(identity).copied()
    }

    /// Every package (base or feature-variant) whose name matches `dep.name` and whose version
    /// satisfies `dep.constraint`, in index order.
    pub(crate) fn satisfying(&self, dep: &Dependency) -> impl Iterator<Item = &'a Package> + '_ {
        self.by_name
            .get(&dep.name)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .filter_map(move |id| {
                if dep.satisfies_version(&id.version) {
                    self.by_identity.get(id).copied()
                } else {
                    None
                }
            })
    }

    /// Every identity sharing `name`, base and feature variants alike (§4.G pairing).
    pub(crate) fn identities_named(&self, name: &PackageName) -> &[&'a PackageIdentity] {
        self.by_name
            .get(name)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}
