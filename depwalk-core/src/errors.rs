// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contains types that describe errors this crate can return (§7).

use crate::package::PackageIdentity;
use crate::provider::SolveFailure;
use std::error;
use std::fmt;

use Error::*;

/// Error type describing the sorts of errors `depwalk-core` can return.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// A caller violated a documented precondition (e.g. constructed a non-root graph node
    /// with no originating dependency, or handed the solver an override set referencing a
    /// package absent from the flat input list). Always a programming error, never a property
    /// of the dependency data itself.
    InvalidState(String),
    /// The upstream version resolver could not produce a solution.
    SolverProblem(SolveFailure),
    /// The marker fixed-point (§4.E) failed to converge within
    /// [`crate::config::SolveConfig::max_fixed_point_iterations`] outer iterations.
    MarkerDivergence {
        /// The number of outer iterations attempted before giving up.
        iterations: u32,
        /// Packages whose markers were still marked incomplete at the iteration cap.
        pending: Vec<PackageIdentity>,
    },
    /// An error occurred while parsing a marker expression or python constraint string.
    MarkerParse(marker_algebra::Error),
    /// The embedding caller's [`crate::solver::CancellationToken`] reported cancellation between
    /// an override rerun or a fixed-point outer iteration (§5). No partial result is returned.
    Cancelled,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidState(msg) => write!(f, "invalid solver state: {msg}"),
            SolverProblem(failure) => write!(f, "version resolution failed: {failure}"),
            MarkerDivergence { iterations, pending } => write!(
                f,
                "marker fixed-point did not converge after {iterations} iterations \
                 ({} package(s) still incomplete: {})",
                pending.len(),
                pending
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            MarkerParse(err) => write!(f, "error parsing marker expression: {err}"),
            Cancelled => write!(f, "solve was cancelled"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            InvalidState(_) => None,
            SolverProblem(_) => None,
            MarkerDivergence { .. } => None,
            MarkerParse(err) => Some(err),
            Cancelled => None,
        }
    }
}

impl From<marker_algebra::Error> for Error {
    fn from(err: marker_algebra::Error) -> Self {
        Error::MarkerParse(err)
    }
}
