// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration surface for a [`crate::solver::Solver`] run (§3.A).

use crate::package::PackageName;
use marker_algebra::PythonConstraint;

/// A marker environment: the concrete set of interpreter/platform values a particular solve
/// should be evaluated against, when a caller wants to pin the solve to one environment rather
/// than carry markers symbolically all the way through. `depwalk-core` itself never evaluates a
/// marker against an environment -- this is forwarded to the `Provider` implementation
/// unmodified (§6) -- but it's part of the ambient config surface a real project needs.
#[derive(Clone, Debug, Default)]
pub struct MarkerEnvironment {
    /// `sys_platform`, e.g. `"linux"`.
    pub sys_platform: Option<String>,
    /// `os_name`, e.g. `"posix"`.
    pub os_name: Option<String>,
    /// `platform_system`, e.g. `"Linux"`.
    pub platform_system: Option<String>,
    /// `platform_machine`, e.g. `"x86_64"`.
    pub platform_machine: Option<String>,
    /// `implementation_name`, e.g. `"cpython"`.
    pub implementation_name: Option<String>,
    /// `platform_python_implementation`, e.g. `"CPython"`.
    pub platform_python_implementation: Option<String>,
}

/// Configuration for a single [`crate::solver::Solver::solve`] call.
///
/// Constructed by the embedding project before a solve, analogous to how `guppy`'s
/// `MetadataCommand` is configured before building a `PackageGraph`.
#[derive(Clone, Debug)]
pub struct SolveConfig {
    /// Packages the caller wants re-resolved to their latest compatible version rather than
    /// pinned from a prior lockfile, forwarded to the `Provider` unmodified.
    pub use_latest: Vec<PackageName>,
    /// The concrete environment to solve against, if the caller wants one (as opposed to
    /// carrying markers symbolically all the way through to the output).
    pub environment: Option<MarkerEnvironment>,
    /// The project's own supported-interpreter constraint, used to simplify markers (§4.H) and
    /// to decide whether an override's marker can be promoted to `AnyMarker` (§4.F).
    pub python_constraint: PythonConstraint,
    /// A sanity bound on the marker fixed-point's outer iteration count (§4.E, §7). Exceeding
    /// this is reported as [`crate::errors::Error::MarkerDivergence`] rather than looping
    /// forever; defaults to `32 * packages.len()` at the call site since it depends on the size
    /// of the input, but a caller may override it here.
    pub max_fixed_point_iterations: Option<u32>,
}

impl SolveConfig {
    /// Creates a config with no latest-pinning, no fixed environment, and the supplied
    /// interpreter constraint.
    pub fn new(python_constraint: PythonConstraint) -> Self {
        Self {
            use_latest: Vec::new(),
            environment: None,
            python_constraint,
            max_fixed_point_iterations: None,
        }
    }

    /// Resolves the effective iteration cap for a solve over `package_count` packages.
    pub fn effective_iteration_cap(&self, package_count: usize) -> u32 {
        self.max_fixed_point_iterations
            .unwrap_or_else(|| 32u32.saturating_mul(package_count.max(1) as u32))
    }
}
