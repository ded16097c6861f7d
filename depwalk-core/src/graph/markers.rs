// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Marker Fixed-Point (§4.E): for each non-root package and each group it belongs to,
//! computes the marker expression under which that package is required in that group.
//!
//! Cycle-tolerant by construction: every pass recomputes each package's markers from whatever
//! value its parents currently hold (Empty until a parent has had its own first contribution
//! folded in), and keeps repassing until a full sweep changes nothing. This is a Gauss-Seidel
//! relaxation over the marker lattice rather than a one-shot topological evaluation -- the
//! lattice is finite-height under `∪` (§9), so monotone growth terminates even across a cycle,
//! where no topological order of "parents before children" exists to begin with.

use crate::errors::Error;
use crate::graph::aggregate::AggregatedPackage;
use crate::package::{GroupName, PackageIdentity, PackageName};
use crate::solver::CancellationToken;
use indexmap::{IndexMap, IndexSet};
use marker_algebra::Marker;

/// Runs the fixed-point to completion, mutating every bucket's `info.markers` in place.
///
/// `root_name` identifies the bucket standing in for the project root (its aggregated `groups`
/// is always empty, per §3's "Root / Project package" definition, which is what the recurrence
/// uses to tell a root contribution from an ordinary parent's).
pub(crate) fn run(
    aggregated: &mut IndexMap<PackageName, AggregatedPackage>,
    parent_marker: &IndexMap<PackageIdentity, IndexMap<PackageIdentity, Marker>>,
    root_name: &PackageName,
    max_iterations: u32,
    cancel: &mut dyn CancellationToken,
) -> Result<(), Error> {
    let max_depth = aggregated
        .values()
        .map(|a| a.info.depth)
        .max()
        .unwrap_or(-1);

    let mut iterations: u32 = 0;
    loop {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        iterations += 1;

        let mut still_changing: Vec<PackageIdentity> = Vec::new();

        for depth in -1..=max_depth {
            let names_at_depth: Vec<PackageName> = aggregated
                .iter()
                .filter(|(_, agg)| agg.info.depth == depth)
                .map(|(name, _)| name.clone())
                .collect();

            for name in names_at_depth {
                let agg = aggregated.get(&name).expect("name came from aggregated");
                let member_identities: Vec<PackageIdentity> = agg
                    .member_keys
                    .iter()
                    .map(|k| k.identity.clone())
                    .collect();
                let own_groups = agg.info.groups.clone();
                let previous = agg.info.markers.clone();

                let tm = recompute_tm(&member_identities, &own_groups, parent_marker, aggregated, root_name);

                if tm != previous {
                    still_changing.push(
                        member_identities
                            .first()
                            .cloned()
                            .unwrap_or_else(|| unreachable!("a bucket always has at least one member")),
                    );
                }
                let agg_mut = aggregated.get_mut(&name).expect("name came from aggregated");
                agg_mut.info.markers = tm;
            }
        }

        if still_changing.is_empty() {
            return Ok(());
        }
        if iterations >= max_iterations {
            return Err(diverged(iterations, still_changing));
        }
    }
}

/// Recomputes one package's `tm[g]` map from its current parents' *current* marker values
/// (§4.E). Seeded with `EmptyMarker` for every one of the package's own groups up front, so a
/// package with no recorded parent at all keeps `markers = {g: EmptyMarker for g in groups}`
/// (the "unreachable under any environment" tie-break) instead of losing its group keys.
fn recompute_tm(
    member_identities: &[PackageIdentity],
    own_groups: &IndexSet<GroupName>,
    parent_marker: &IndexMap<PackageIdentity, IndexMap<PackageIdentity, Marker>>,
    aggregated: &IndexMap<PackageName, AggregatedPackage>,
    root_name: &PackageName,
) -> IndexMap<GroupName, Marker> {
    let mut tm: IndexMap<GroupName, Marker> = own_groups
        .iter()
        .map(|g| (g.clone(), Marker::empty()))
        .collect();

    for identity in member_identities {
        let Some(parents) = parent_marker.get(identity) else {
            continue;
        };
        for (parent_identity, edge_marker) in parents {
            let parent_name = &parent_identity.name;
            let is_root = parent_name == root_name;

            let parent_groups: Option<IndexSet<GroupName>> = if is_root {
                None
            } else {
                match aggregated.get(parent_name) {
                    Some(parent_agg) if parent_agg.info.groups.is_empty() => None,
                    Some(parent_agg) => Some(parent_agg.info.groups.clone()),
                    None => continue,
                }
            };

            match parent_groups {
                None => {
                    // Root (or group-less parent) contribution: the edge marker applies
                    // directly, against the child's own aggregated groups.
                    for g in own_groups {
                        let cur = tm.get(g).cloned().unwrap_or_else(Marker::empty);
                        tm.insert(g.clone(), cur.union(edge_marker));
                    }
                }
                Some(groups) => {
                    let parent_agg = aggregated.get(parent_name).expect("checked Some above");
                    for g in &groups {
                        let Some(parent_marker_for_g) = parent_agg.info.markers.get(g) else {
                            continue;
                        };
                        let contribution = parent_marker_for_g.intersect(edge_marker);
                        let cur = tm.get(g).cloned().unwrap_or_else(Marker::empty);
                        tm.insert(g.clone(), cur.union(&contribution));
                    }
                }
            }
        }
    }

    tm
}

fn diverged(iterations: u32, pending: Vec<PackageIdentity>) -> Error {
    Error::MarkerDivergence { iterations, pending }
}
