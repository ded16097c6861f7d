// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transitive dependency aggregation core.
//!
//! Given a flat list of packages already chosen by a SAT-style version solver,
//! `depwalk-core` computes, for each package, its **depth** in the dependency
//! graph, the **union of dependency groups** that transitively require it, and
//! the **environment marker** -- a boolean expression over interpreter and
//! platform variables -- under which each group membership holds.
//!
//! The crate does not select versions, talk to a package repository, or read
//! project manifests; those are external collaborators reached through the
//! [`Provider`] and [`VersionResolver`] traits. It consumes their output and
//! produces a [`Transaction`].
//!
//! # Example
//!
//! ```no_run
//! use depwalk_core::{Package, PackageIdentity, Solver, SolveConfig};
//! use marker_algebra::PythonConstraint;
//! use pep440_rs::Version;
//! use std::str::FromStr;
//!
//! # fn example<R: depwalk_core::VersionResolver>(resolver: R, provider: R::Provider) -> Result<(), depwalk_core::Error> {
//! let root = Package::new(PackageIdentity::base("my-project", Version::from_str("0.1.0").unwrap()));
//! let config = SolveConfig::new(PythonConstraint::parse(">=3.8").unwrap());
//! let mut solver = Solver::new(resolver, provider, config);
//! let transaction = solver.solve(root)?;
//! for (package, info) in &transaction.solved {
//!     println!("{package} at depth {}", info.depth);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod errors;
mod feature_fold;
mod graph;
mod override_merge;
pub mod package;
pub mod provider;
mod simplify;
pub mod solver;
pub mod transaction;

pub use config::{MarkerEnvironment, SolveConfig};
pub use errors::Error;
pub use package::{Dependency, GroupName, Package, PackageIdentity, PackageName};
pub use provider::{OverrideNeeded, Provider, ResolveOutcome, SolveFailure, SolverResult, VersionResolver};
pub use solver::{CancellationToken, NeverCancel, Solver};
pub use transaction::{Transaction, TransitivePackageInfo};

// Public re-exports for the upstream crate whose algebra this core is built on, the same way
// `guppy` treats `target-spec` as a private dependency but re-exports its public types.
#[doc(no_inline)]
pub use marker_algebra::{Marker, PythonConstraint};
