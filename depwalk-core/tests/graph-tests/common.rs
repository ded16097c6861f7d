// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fakes and builders for the end-to-end scenario suite (spec §8, E1-E6), mirroring the
//! teacher's own `tests/graph-tests/feature_helpers.rs` convention of one shared-helpers file
//! `#[path]`-included by every scenario file in this directory.
//!
//! Everything here drives the solver through its public surface only -- `Solver`, `Provider`,
//! `VersionResolver` -- the same boundary a real embedding project is restricted to.

use depwalk_core::{
    Dependency, MarkerEnvironment, Package, PackageIdentity, PackageName, Provider, ResolveOutcome,
    SolveConfig, Solver, SolverResult, VersionResolver,
};
use indexmap::IndexMap;
use marker_algebra::{Marker, PythonConstraint};
use pep440_rs::{Version, VersionSpecifiers};
use std::str::FromStr;

#[derive(Default)]
pub(crate) struct FakeProvider;

impl Provider for FakeProvider {
    fn set_overrides(&mut self, _overrides: &IndexMap<Package, IndexMap<PackageName, Dependency>>) {}
    fn use_latest_for(&mut self, _names: &[PackageName]) {}
    fn use_environment(&mut self, _environment: &MarkerEnvironment) {}
    fn is_debugging(&self) -> bool {
        false
    }
    fn debug(&mut self, _message: &str) {}
    fn progress(&mut self, _message: &str) {}
    fn warn(&mut self, _message: &str) {}
}

/// Replays a fixed script of `ResolveOutcome`s, one per `resolve_version` call, the same way a
/// real resolver would return `OverrideNeeded` then `Solved` across an override rerun.
pub(crate) struct FakeResolver {
    pub(crate) outcomes: Vec<ResolveOutcome>,
}

impl VersionResolver for FakeResolver {
    type Provider = FakeProvider;

    fn resolve_version(&mut self, _root: &Package, _provider: &mut FakeProvider) -> ResolveOutcome {
        self.outcomes.remove(0)
    }
}

pub(crate) fn version(s: &str) -> Version {
    Version::from_str(s).unwrap()
}

pub(crate) fn any_constraint() -> VersionSpecifiers {
    VersionSpecifiers::from_str("").unwrap()
}

/// An interpreter constraint that covers every version, so the simplifier never rewrites a
/// scenario's markers out from under it (§4.H only promotes/reduces against this constraint).
pub(crate) fn any_python_constraint() -> PythonConstraint {
    PythonConstraint::parse("").unwrap()
}

pub(crate) fn base(name: &str, ver: &str) -> Package {
    Package::new(PackageIdentity::base(name, version(ver)))
}

pub(crate) fn dep_with_marker(name: &str, marker: Marker) -> Dependency {
    let mut dep = Dependency::required(PackageName::from(name), any_constraint());
    dep.marker = marker;
    dep
}

/// Drives a single, override-free solve of `root` against `packages` through the public
/// `Solver` facade.
pub(crate) fn solve(root: Package, packages: Vec<Package>) -> depwalk_core::Transaction {
    let resolver = FakeResolver {
        outcomes: vec![ResolveOutcome::Solved(SolverResult {
            packages,
            attempted_solutions: 1,
        })],
    };
    let mut solver = Solver::new(
        resolver,
        FakeProvider::default(),
        SolveConfig::new(any_python_constraint()),
    );
    solver.solve(root).expect("scenario solve is expected to succeed")
}

/// Drives a solve that requires exactly the override reruns in `outcomes` (`OverrideNeeded`
/// followed by however many `Solved` reruns the scenario needs) before converging.
pub(crate) fn solve_with_outcomes(root: Package, outcomes: Vec<ResolveOutcome>) -> depwalk_core::Transaction {
    let resolver = FakeResolver { outcomes };
    let mut solver = Solver::new(
        resolver,
        FakeProvider::default(),
        SolveConfig::new(any_python_constraint()),
    );
    solver.solve(root).expect("scenario solve is expected to succeed")
}
