// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Marker Simplifier (§4.H): reduces a marker against the project's interpreter constraint,
//! and promotes a marker that mentions only the interpreter variable to [`Marker::any`] when the
//! project's own constraint is already covered by it (§4.F's final paragraph).
//!
//! Memoization here is keyed on the marker's own canonicalized `Hash` (§4.A guarantees two
//! markers built differently but denoting the same boolean function hash equally), modeled on
//! `guppy::platform`'s `once_cell::sync::Lazy` static-cache idiom -- but owned per [`Simplifier`]
//! instance rather than a process-wide `Lazy`, since §5 forbids resources shared across tasks and
//! a fresh [`crate::solver::Solver`] must get a fresh cache.

use marker_algebra::{Marker, PythonConstraint};
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// A per-solve cache for [`Marker::reduce_by_python_constraint`] and the interpreter-only
/// promotion check (§4.H, §4.F).
///
/// A single [`Simplifier`] is only ever asked to simplify against one project interpreter
/// constraint over its lifetime (one [`crate::solver::Solver::solve`] call), so the cache key is
/// the marker's hash alone rather than the `(marker, constraint)` pair SPEC_FULL describes in
/// the abstract -- documented here as the concrete specialization of that contract.
#[derive(Default)]
pub(crate) struct Simplifier {
    reduced: HashMap<u64, Marker>,
    promoted: HashMap<u64, bool>,
}

impl Simplifier {
    pub(crate) fn new() -> Self {
        Self {
            reduced: HashMap::new(),
            promoted: HashMap::new(),
        }
    }

    /// Reduces `marker` against `constraint`, memoizing the result (§4.H).
    pub(crate) fn simplify(&mut self, marker: &Marker, constraint: &PythonConstraint) -> Marker {
        let key = hash_of(marker);
        if let Some(cached) = self.reduced.get(&key) {
            return cached.clone();
        }
        let reduced = marker.reduce_by_python_constraint(constraint);
        self.reduced.insert(key, reduced.clone());
        reduced
    }

    /// If `marker` mentions only the interpreter variable and its extracted constraint already
    /// covers `project_constraint`, replaces it with [`Marker::any`] (§4.F). The decision is
    /// memoized by marker hash so repeat calls against the same marker short-circuit (§4.F:
    /// "A memoized set of already-promoted markers short-circuits this test").
    pub(crate) fn promote_if_interpreter_only(
        &mut self,
        marker: &Marker,
        project_constraint: &PythonConstraint,
    ) -> Marker {
        let key = hash_of(marker);
        let promotable = *self.promoted.entry(key).or_insert_with(|| {
            marker
                .as_python_constraint()
                .map(|extracted| extracted.covers(project_constraint))
                .unwrap_or(false)
        });
        if promotable {
            Marker::any()
        } else {
            marker.clone()
        }
    }
}
