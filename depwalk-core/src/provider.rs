// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! External interfaces (§6): the `Provider` capability set and the `VersionResolver` trait
//! standing in for the upstream `resolve_version` collaborator.
//!
//! Neither trait is implemented by this crate -- consumers supply an implementation (or tests
//! supply a fake one), the same way `guppy` never implements `cargo metadata` itself but defines
//! the shape of the JSON it consumes.

use crate::config::MarkerEnvironment;
use crate::package::{Dependency, Package, PackageName};
use indexmap::IndexMap;
use std::fmt;

/// The capability set an embedding project exposes to the solver (§6). Consumed opaquely: the
/// solver calls these methods but never inspects a concrete implementation.
pub trait Provider {
    /// Narrows the next resolution attempt to the supplied per-package dependency overrides.
    fn set_overrides(&mut self, overrides: &IndexMap<Package, IndexMap<PackageName, Dependency>>);

    /// Tells the provider which packages should float to their latest compatible version.
    fn use_latest_for(&mut self, names: &[PackageName]);

    /// Pins the provider to a concrete marker environment, if the caller wants one.
    fn use_environment(&mut self, environment: &MarkerEnvironment);

    /// Returns `true` if verbose debug output has been requested.
    fn is_debugging(&self) -> bool;

    /// Emits a `<debug>`-tagged progress line. A no-op unless [`Provider::is_debugging`] is set.
    fn debug(&mut self, message: &str);

    /// Emits a human-facing progress line, e.g. `"Resolving dependencies..."`.
    fn progress(&mut self, message: &str);

    /// Emits a `<warning>`-tagged line, e.g. for a yanked version (§7).
    fn warn(&mut self, message: &str);
}

/// The successful result of a `resolve_version` call: an ordered package list plus a count of
/// how many internal solve attempts were made before converging.
#[derive(Clone, Debug)]
pub struct SolverResult {
    /// The flat list of packages selected by the upstream resolver, in solver-chosen order.
    pub packages: Vec<Package>,
    /// The number of internal solve attempts the resolver made.
    pub attempted_solutions: u32,
}

/// A signal from the upstream resolver that the current attempt detected a structural conflict
/// and must be retried with a narrowed hypothesis (§6, §9 Glossary "Override").
#[derive(Clone, Debug)]
pub struct OverrideNeeded {
    /// Each element replaces a subset of packages' dependency sets for one rerun.
    pub overrides: Vec<IndexMap<Package, IndexMap<PackageName, Dependency>>>,
}

/// Structured diagnostics describing why a resolution attempt failed outright (§7
/// `SolverProblemError`).
#[derive(Clone, Debug)]
pub struct SolveFailure {
    /// A human-readable summary of the failure.
    pub message: String,
    /// The dependency chain that produced the conflict, root-first, if known.
    pub conflicting_chain: Vec<PackageName>,
}

impl fmt::Display for SolveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conflicting_chain.is_empty() {
            write!(f, "{}", self.message)
        } else {
            let chain = self
                .conflicting_chain
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(" -> ");
            write!(f, "{} (via {chain})", self.message)
        }
    }
}

/// The three possible outcomes of one `resolve_version` attempt.
#[derive(Debug)]
pub enum ResolveOutcome {
    /// The attempt produced a usable package set.
    Solved(SolverResult),
    /// The attempt requires one or more reruns with narrowed hypotheses (§4.F).
    OverrideNeeded(OverrideNeeded),
    /// The attempt failed outright.
    Failed(SolveFailure),
}

/// Stands in for the upstream `resolve_version` collaborator (§6). `depwalk-core` only ever
/// consumes this trait; it never implements a real resolver itself (that lives upstream, in the
/// dependency-solving crate this aggregation core was factored out of).
pub trait VersionResolver {
    /// The provider type this resolver is parameterized over.
    type Provider: Provider;

    /// Attempts to resolve a full dependency set for `root` using `provider`.
    fn resolve_version(&mut self, root: &Package, provider: &mut Self::Provider) -> ResolveOutcome;
}
