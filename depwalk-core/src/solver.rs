// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `Solver` facade (§4.I): the orchestration point that drives one `resolve_version` attempt
//! (and any override reruns it demands) through feature folding, graph aggregation, override
//! merging, and marker simplification, producing a [`Transaction`].
//!
//! Grounded on how `guppy::graph::PackageGraph::from_metadata` is the single entry point a
//! consumer calls even though it internally chains several independent passes -- `Solver::solve`
//! plays the same role here for components B through H.

use crate::config::SolveConfig;
use crate::errors::Error;
use crate::feature_fold;
use crate::graph;
use crate::override_merge::{override_marker_for, OverrideMerger};
use crate::package::{Package, PackageName};
use crate::provider::{OverrideNeeded, Provider, ResolveOutcome, SolverResult, VersionResolver};
use crate::simplify::Simplifier;
use crate::transaction::{Transaction, TransitivePackageInfo};
use indexmap::IndexMap;

/// A cooperative cancellation point, polled between override reruns and (via
/// [`graph::aggregate_transitive`]) between marker fixed-point outer iterations (§5).
///
/// Consumers that never need to cancel a solve use [`NeverCancel`], the default.
pub trait CancellationToken {
    /// Returns `true` if the in-progress solve should stop and return [`Error::Cancelled`].
    fn is_cancelled(&mut self) -> bool;
}

/// A [`CancellationToken`] that never cancels.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverCancel;

impl CancellationToken for NeverCancel {
    fn is_cancelled(&mut self) -> bool {
        false
    }
}

/// Drives a full solve: one or more `resolve_version` attempts, feature folding, graph
/// aggregation, override merging, and marker simplification (§2, §4.I).
///
/// Owns the embedding project's [`VersionResolver`] and [`Provider`] for the duration of a single
/// [`Solver::solve`] call, plus a [`Simplifier`] cache that is fresh for each `Solver` (§5: no
/// mutable resource is shared across tasks).
pub struct Solver<R: VersionResolver, C: CancellationToken = NeverCancel> {
    resolver: R,
    provider: R::Provider,
    config: SolveConfig,
    cancel: C,
    simplifier: Simplifier,
}

impl<R: VersionResolver> Solver<R, NeverCancel> {
    /// Creates a solver with no cancellation support.
    pub fn new(resolver: R, provider: R::Provider, config: SolveConfig) -> Self {
        Self::with_cancellation(resolver, provider, config, NeverCancel)
    }
}

impl<R: VersionResolver, C: CancellationToken> Solver<R, C> {
    /// Creates a solver that polls `cancel` between override reruns and fixed-point iterations.
    pub fn with_cancellation(resolver: R, provider: R::Provider, config: SolveConfig, cancel: C) -> Self {
        Self {
            resolver,
            provider,
            config,
            cancel,
            simplifier: Simplifier::new(),
        }
    }

    /// Resolves `root`'s full transitive dependency set (§2).
    pub fn solve(&mut self, root: Package) -> Result<Transaction, Error> {
        if !self.config.use_latest.is_empty() {
            self.provider.use_latest_for(&self.config.use_latest);
        }
        if let Some(environment) = self.config.environment.clone() {
            self.provider.use_environment(&environment);
        }
        self.provider.progress("resolving dependencies");

        match self.resolver.resolve_version(&root, &mut self.provider) {
            ResolveOutcome::Failed(failure) => Err(Error::SolverProblem(failure)),
            ResolveOutcome::Solved(result) => {
                let (locked, aggregated) = self.fold_and_aggregate(&root, result)?;
                Ok(self.finalize(root, locked, aggregated.into_iter().map(|(_, v)| v)))
            }
            ResolveOutcome::OverrideNeeded(needed) => self.solve_with_overrides(root, needed),
        }
    }

    /// Re-runs `resolve_version` once per override in `needed`, merging each rerun's aggregated
    /// result into one accumulator before simplification (§4.F).
    fn solve_with_overrides(&mut self, root: Package, needed: OverrideNeeded) -> Result<Transaction, Error> {
        let mut merger = OverrideMerger::new();
        let mut locked = Vec::new();

        for (attempt, override_map) in needed.overrides.iter().enumerate() {
            let span = tracing::info_span!("override_rerun", attempt);
            let _enter = span.enter();

            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            self.provider.set_overrides(override_map);
            let result = match self.resolver.resolve_version(&root, &mut self.provider) {
                ResolveOutcome::Solved(result) => result,
                ResolveOutcome::Failed(failure) => return Err(Error::SolverProblem(failure)),
                ResolveOutcome::OverrideNeeded(_) => {
                    return Err(Error::InvalidState(
                        "override rerun itself reported a further OverrideNeeded".to_string(),
                    ));
                }
            };

            let (rerun_locked, aggregated) = self.fold_and_aggregate(&root, result)?;
            locked = rerun_locked;
            merger.merge_one(&override_marker_for(override_map), aggregated);
        }

        let entries = merger.finish().into_iter().map(|(_, package_and_info)| package_and_info);
        Ok(self.finalize(root, locked, entries))
    }

    /// Folds feature variants into their base packages, then runs the graph builder, cyclic DFS,
    /// depth/group aggregator, and marker fixed-point over the result (§4.B–§4.E, §4.G).
    ///
    /// Returns the pre-folding flat list alongside the aggregated result, since `requires` is
    /// mutated by folding but `locked` (§6) is defined over the resolver's own chosen packages.
    fn fold_and_aggregate(
        &mut self,
        root: &Package,
        result: SolverResult,
    ) -> Result<(Vec<Package>, IndexMap<PackageName, (Package, TransitivePackageInfo)>), Error> {
        let locked = result.packages.clone();
        let mut packages = result.packages;
        feature_fold::fold(&mut packages);

        let max_iterations = self.config.effective_iteration_cap(packages.len());
        let aggregated = graph::aggregate_transitive(root, &packages, max_iterations, &mut self.cancel)?;
        Ok((locked, aggregated))
    }

    /// Simplifies every marker against the project's interpreter constraint (§4.H) and assembles
    /// the final [`Transaction`].
    fn finalize(
        &mut self,
        root: Package,
        locked: Vec<Package>,
        entries: impl Iterator<Item = (Package, TransitivePackageInfo)>,
    ) -> Transaction {
        let mut solved = IndexMap::new();
        for (package, mut info) in entries {
            for marker in info.markers.values_mut() {
                let reduced = self.simplifier.simplify(marker, &self.config.python_constraint);
                *marker = self
                    .simplifier
                    .promote_if_interpreter_only(&reduced, &self.config.python_constraint);
            }
            solved.insert(package, info);
        }
        let installed = solved.keys().cloned().collect();
        Transaction {
            locked,
            solved,
            installed,
            root,
        }
    }
}
