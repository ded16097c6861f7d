// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Depth & Group Aggregator (§4.D): combines DFS nodes sharing a base name into one
//! `TransitivePackageInfo` per package, then back-propagates the combined `depth`/`optional`
//! into every node so later readers (the marker fixed-point, §4.E) observe consistent values.

use crate::graph::dfs::{NodeKey, NodeMeta, WalkResult};
use crate::package::PackageName;
use crate::transaction::TransitivePackageInfo;
use indexmap::{IndexMap, IndexSet};

/// One base-name bucket's aggregated view, plus the node keys that contributed to it (needed so
/// the fixed-point can walk nodes back to their aggregated package record).
pub(crate) struct AggregatedPackage {
    pub(crate) info: TransitivePackageInfo,
    pub(crate) member_keys: Vec<NodeKey>,
}

/// Buckets every visited node by its package's base name and combines them (§4.D):
/// `depth := max`, `groups := union`, `optional := all nodes optional`.
pub(crate) fn aggregate(walk: &WalkResult) -> IndexMap<PackageName, AggregatedPackage> {
    let mut buckets: IndexMap<PackageName, Vec<NodeKey>> = IndexMap::new();
    for key in &walk.sorted {
        let base_name = walk
            .node_info
            .get(key)
            .map(|m: &NodeMeta| m.base_name.clone())
            .expect("every sorted key has node metadata");
        buckets.entry(base_name).or_default().push(key.clone());
    }

    let mut result = IndexMap::with_capacity(buckets.len());
    for (name, member_keys) in buckets {
        let mut depth = i64::MIN;
        let mut groups: IndexSet<_> = IndexSet::new();
        let mut optional = true;
        for key in &member_keys {
            let meta = walk
                .node_info
                .get(key)
                .expect("bucket member always has metadata");
            depth = depth.max(meta.depth);
            groups.extend(meta.groups.iter().cloned());
            optional = optional && meta.optional;
        }
        let info = TransitivePackageInfo::empty_for_groups(groups, depth, optional);
        result.insert(name, AggregatedPackage { info, member_keys });
    }
    result
}
