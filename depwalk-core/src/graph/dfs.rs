// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Cyclic DFS (§4.C): walks the graph once from the root, recording a back-edge marker
//! table and a reverse-topological node order that tolerates cycles.
//!
//! Grounded on the same shape as `guppy::petgraph_support::dfs::dfs_next_filtered` and
//! `petgraph_support::topo::TopoWithCycles` -- a `DfsPostOrder`-style walk chosen specifically
//! because cargo (and, here, the dependency graph in general) is not acyclic -- but keyed by the
//! 3-tuple node key from §3 rather than a plain `petgraph::NodeIndex`, via an explicit
//! `IndexMap<NodeKey, ..>` arena built incrementally during the walk (Design Notes §9: "arena of
//! nodes addressed by integer index").

use crate::errors::Error;
use crate::graph::build::PackageIndex;
use crate::package::{Dependency, GroupName, Package, PackageIdentity, PackageName};
use indexmap::{IndexMap, IndexSet};
use marker_algebra::{Atom, ExtraOperator, Marker};
use std::collections::BTreeSet;

/// The DFS node key (§3): two traversals arriving at the same package with a different group or
/// optional context are distinct nodes and must both be visited (Design Notes §9, "collapsing to
/// identity alone silently merges group contexts and corrupts the group union").
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub(crate) struct NodeKey {
    pub(crate) identity: PackageIdentity,
    groups: BTreeSet<GroupName>,
    optional: bool,
}

/// Metadata recorded for one DFS node, keyed by [`NodeKey`] (§4.B/§4.C).
#[derive(Clone, Debug)]
pub(crate) struct NodeMeta {
    pub(crate) base_name: PackageName,
    pub(crate) groups: IndexSet<GroupName>,
    pub(crate) optional: bool,
    pub(crate) depth: i64,
}

/// One node reached during the walk, carrying enough context to compute its own children.
struct Node<'a> {
    key: NodeKey,
    package: &'a Package,
    is_root: bool,
    groups: IndexSet<GroupName>,
    optional: bool,
    /// The dependency that introduced this node's own subtree into the graph -- propagated
    /// unchanged to every descendant along this path, exactly as the source's `self.dep or
    /// dependency` propagation does. `None` only for the root.
    origin_dep: Option<&'a Dependency>,
}

impl<'a> Node<'a> {
    fn root(root: &'a Package) -> Self {
        Node {
            key: NodeKey {
                identity: root.identity.clone(),
                groups: BTreeSet::new(),
                optional: true,
            },
            package: root,
            is_root: true,
            groups: IndexSet::new(),
            optional: true,
            origin_dep: None,
        }
    }

    /// Enumerates this node's children by walking `package.all_requires()` against `index`,
    /// computing each child's edge marker and inherited group/optional context (§4.B).
    fn reachable(&self, index: &PackageIndex<'a>) -> Result<Vec<(Node<'a>, Marker)>, Error> {
        let mut children = Vec::new();
        for dep in self.package.all_requires() {
            for candidate in index.satisfying(dep) {
                let mut edge_marker = dep.marker.clone();
                if self.is_root && !dep.in_extras.is_empty() {
                    let extras_marker = dep
                        .in_extras
                        .iter()
                        .fold(Marker::empty(), |acc, extra| {
                            acc.union(&Marker::from_atoms(vec![Atom::Extra {
                                operator: ExtraOperator::Equal,
                                name: extra.clone(),
                            }]))
                        });
                    edge_marker = edge_marker.intersect(&extras_marker);
                }

                let origin_dep = self.origin_dep.unwrap_or(dep);
                let groups = origin_dep.groups.clone();
                let optional = origin_dep.optional;
                let key = NodeKey {
                    identity: candidate.identity.clone(),
                    groups: groups.iter().cloned().collect(),
                    optional,
                };
                let child = Node {
                    key,
                    package: candidate,
                    is_root: false,
                    groups,
                    optional,
                    origin_dep: Some(origin_dep),
                };
                children.push((child, edge_marker));
            }
        }
        Ok(children)
    }
}

/// The output of one full graph walk (§4.B + §4.C).
pub(crate) struct WalkResult {
    /// Node keys in reverse-topological order: parents precede children when the graph is
    /// acyclic, broken by insertion order across cycles.
    pub(crate) sorted: Vec<NodeKey>,
    /// Metadata for every node visited, including the final computed `depth`.
    pub(crate) node_info: IndexMap<NodeKey, NodeMeta>,
    /// `parent_marker[child][parent] = edge_marker`, stripped of `extra` atoms unless the parent
    /// is the root (§3 "Back-edge marker table", §4.C stripping rule).
    pub(crate) parent_marker: IndexMap<PackageIdentity, IndexMap<PackageIdentity, Marker>>,
}

/// Walks the dependency graph from `root` over the packages indexed in `index` (§4.B, §4.C).
pub(crate) fn walk<'a>(root: &'a Package, index: &PackageIndex<'a>) -> Result<WalkResult, Error> {
    let mut visited: IndexSet<NodeKey> = IndexSet::new();
    let mut sorted: Vec<NodeKey> = Vec::new();
    let mut back_edges: IndexMap<NodeKey, Vec<NodeKey>> = IndexMap::new();
    let mut parent_marker: IndexMap<PackageIdentity, IndexMap<PackageIdentity, Marker>> =
        IndexMap::new();
    let mut node_info: IndexMap<NodeKey, NodeMeta> = IndexMap::new();

    let root_node = Node::root(root);
    node_info.insert(root_node.key.clone(), node_meta(&root_node));

    visit(
        &root_node,
        index,
        &mut visited,
        &mut sorted,
        &mut back_edges,
        &mut parent_marker,
        &mut node_info,
    )?;

    compute_depths(&sorted, &back_edges, &mut node_info);

    Ok(WalkResult {
        sorted,
        node_info,
        parent_marker,
    })
}

fn node_meta(node: &Node<'_>) -> NodeMeta {
    NodeMeta {
        base_name: node.package.name().clone(),
        groups: node.groups.clone(),
        optional: node.optional,
        depth: -1,
    }
}

#[allow(clippy::too_many_arguments)]
fn visit<'a>(
    node: &Node<'a>,
    index: &PackageIndex<'a>,
    visited: &mut IndexSet<NodeKey>,
    sorted: &mut Vec<NodeKey>,
    back_edges: &mut IndexMap<NodeKey, Vec<NodeKey>>,
    parent_marker: &mut IndexMap<PackageIdentity, IndexMap<PackageIdentity, Marker>>,
    node_info: &mut IndexMap<NodeKey, NodeMeta>,
) -> Result<(), Error> {
    if visited.contains(&node.key) {
        return Ok(());
    }
    visited.insert(node.key.clone());
    tracing::trace!(package = %node.package, "visiting dfs node");

    for (child, edge_marker) in node.reachable(index)? {
        back_edges
            .entry(child.key.clone())
            .or_default()
            .push(node.key.clone());

        let stripped = if node.is_root {
            edge_marker
        } else {
            edge_marker.without_extras()
        };
        parent_marker
            .entry(child.package.identity.clone())
            .or_default()
            .insert(node.package.identity.clone(), stripped);

        node_info
            .entry(child.key.clone())
            .or_insert_with(|| node_meta(&child));

        visit(
            &child,
            index,
            visited,
            sorted,
            back_edges,
            parent_marker,
            node_info,
        )?;
    }

    sorted.insert(0, node.key.clone());
    Ok(())
}

/// Computes each node's `depth` via the recurrence in §3: `1 + max(parent.depth, or
/// parent.depth - 1 when parent shares this node's base name, over all recorded parents; -2 if
/// there are none)`. Processing nodes in `sorted` order means, for an acyclic subgraph, a node's
/// parents have already had their own `depth` computed by the time the node itself is reached.
fn compute_depths(
    sorted: &[NodeKey],
    back_edges: &IndexMap<NodeKey, Vec<NodeKey>>,
    node_info: &mut IndexMap<NodeKey, NodeMeta>,
) {
    for key in sorted {
        let parents = back_edges.get(key).cloned().unwrap_or_default();
        let this_base_name = node_info.get(key).map(|m| m.base_name.clone());
        let mut max_contribution: i64 = -2;
        for parent_key in &parents {
            let parent_depth = node_info.get(parent_key).map(|m| m.depth).unwrap_or(-1);
            let parent_base_name = node_info.get(parent_key).map(|m| &m.base_name);
            let contribution = if parent_base_name == this_base_name.as_ref() {
                parent_depth - 1
            } else {
                parent_depth
            };
            max_contribution = max_contribution.max(contribution);
        }
        if let Some(meta) = node_info.get_mut(key) {
            meta.depth = 1 + max_contribution;
        }
    }
}
