// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interval arithmetic over PEP 440 versions, used to implement
//! [`crate::Marker::reduce_by_python_constraint`] and the "promote to `AnyMarker`" check in the
//! override merger (§4.F).
//!
//! This is a half-open/closed bound representation, not a general constraint solver: it covers
//! the comparison operators that actually show up in `python_version`/`python_full_version`
//! atoms (`==`, `!=`, `<`, `<=`, `>`, `>=`, `~=`). `NotEqual` punches a hole in a range rather
//! than bounding it, so it has no single-range representation and is treated as irreducible
//! (conservative: we simply never claim a `NotEqual` atom is implied by a constraint).

use crate::expr::MarkerOperator;
use pep440_rs::Version;
use std::cmp::Ordering;
use std::str::FromStr;

/// Computes the exclusive upper bound for `~=X.Y…` by dropping the last release segment and
/// incrementing the new last one (`~=3.8.2` -> `<3.9`). Built on `Display`/`FromStr` rather than
/// any internal accessor, since only those are part of every `pep440_rs`-compatible version
/// type's public contract.
fn compatible_release_upper_bound(version: &Version) -> Option<Version> {
    let rendered = version.to_string();
    let core_len = rendered
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rendered.len());
    let mut segments: Vec<i64> = rendered[..core_len]
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();
    if segments.len() < 2 {
        return None;
    }
    segments.pop();
    if let Some(last) = segments.last_mut() {
        *last += 1;
    }
    let joined = segments
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(".");
    Version::from_str(&joined).ok()
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Bound {
    pub(crate) version: Version,
    pub(crate) inclusive: bool,
}

/// A single contiguous interval of versions, `[min, max]` with optionally-open ends.
///
/// `None` for either side means unbounded in that direction.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct VersionRange {
    pub(crate) min: Option<Bound>,
    pub(crate) max: Option<Bound>,
}

impl VersionRange {
    /// The range containing every version.
    pub(crate) fn unbounded() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    /// Builds the range satisfying a single atom-like comparison, if the operator admits a
    /// contiguous-range representation.
    pub(crate) fn from_comparison(operator: MarkerOperator, version: &Version) -> Option<Self> {
        match operator {
            MarkerOperator::Equal => Some(Self {
                min: Some(Bound {
                    version: version.clone(),
                    inclusive: true,
                }),
                max: Some(Bound {
                    version: version.clone(),
                    inclusive: true,
                }),
            }),
            MarkerOperator::GreaterEqual => Some(Self {
                min: Some(Bound {
                    version: version.clone(),
                    inclusive: true,
                }),
                max: None,
            }),
            MarkerOperator::GreaterThan => Some(Self {
                min: Some(Bound {
                    version: version.clone(),
                    inclusive: false,
                }),
                max: None,
            }),
            MarkerOperator::LessEqual => Some(Self {
                min: None,
                max: Some(Bound {
                    version: version.clone(),
                    inclusive: true,
                }),
            }),
            MarkerOperator::LessThan => Some(Self {
                min: None,
                max: Some(Bound {
                    version: version.clone(),
                    inclusive: false,
                }),
            }),
            // `~=X.Y` means `>= X.Y, == X.*`, i.e. `>= X.Y, < X.(Y_major bumped)`. We only have
            // the release segment available here, so approximate the upper bound by bumping the
            // second-to-last release component -- matches the common `~=3.8` -> `<3.9` case.
            MarkerOperator::TildeEqual => {
                let upper = compatible_release_upper_bound(version)?;
                Some(Self {
                    min: Some(Bound {
                        version: version.clone(),
                        inclusive: true,
                    }),
                    max: Some(Bound {
                        version: upper,
                        inclusive: false,
                    }),
                })
            }
            MarkerOperator::NotEqual => None,
        }
    }

    /// Intersects two ranges (conjunction: both must hold).
    pub(crate) fn intersect(&self, other: &Self) -> Self {
        let min = max_bound(&self.min, &other.min);
        let max = min_bound(&self.max, &other.max);
        Self { min, max }
    }

    /// Returns `true` if every version in `inner` is also in `self` -- i.e. `self` is implied by
    /// `inner` holding, or equivalently `inner ⊆ self`.
    pub(crate) fn contains_range(&self, inner: &Self) -> bool {
        let min_ok = match (&self.min, &inner.min) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(outer), Some(inner)) => le_bound(outer, inner, true),
        };
        let max_ok = match (&self.max, &inner.max) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(outer), Some(inner)) => le_bound(inner, outer, false),
        };
        min_ok && max_ok
    }
}

/// Compares two lower bounds and returns the one that is more restrictive (higher).
fn max_bound(a: &Option<Bound>, b: &Option<Bound>) -> Option<Bound> {
    match (a, b) {
        (None, None) => None,
        (Some(x), None) => Some(x.clone()),
        (None, Some(y)) => Some(y.clone()),
        (Some(x), Some(y)) => match x.version.cmp(&y.version) {
            Ordering::Greater => Some(x.clone()),
            Ordering::Less => Some(y.clone()),
            Ordering::Equal => Some(Bound {
                version: x.version.clone(),
                inclusive: x.inclusive && y.inclusive,
            }),
        },
    }
}

/// Compares two upper bounds and returns the one that is more restrictive (lower).
fn min_bound(a: &Option<Bound>, b: &Option<Bound>) -> Option<Bound> {
    match (a, b) {
        (None, None) => None,
        (Some(x), None) => Some(x.clone()),
        (None, Some(y)) => Some(y.clone()),
        (Some(x), Some(y)) => match x.version.cmp(&y.version) {
            Ordering::Less => Some(x.clone()),
            Ordering::Greater => Some(y.clone()),
            Ordering::Equal => Some(Bound {
                version: x.version.clone(),
                inclusive: x.inclusive && y.inclusive,
            }),
        },
    }
}

/// `lower <= upper` as bounds, where `lower_is_min` picks the tie-break direction for equal
/// version values with differing inclusivity.
fn le_bound(a: &Bound, b: &Bound, a_is_lower: bool) -> bool {
    match a.version.cmp(&b.version) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => {
            if a.inclusive == b.inclusive {
                true
            } else if a_is_lower {
                // `a` is a lower bound being compared against `b`'s lower bound: `a <= b` holds
                // unless `a` is exclusive while `b` is inclusive (then `a` excludes a version
                // `b` would admit, so `a` is *not* permissive enough).
                a.inclusive
            } else {
                // `a` is an upper bound being compared against `b`'s upper bound: `a <= b` holds
                // unless `a` is inclusive while `b` is exclusive.
                b.inclusive
            }
        }
    }
}

/// A union of disjoint-or-overlapping ranges, used to approximate the truth region of a
/// `python_version`-only marker that has more than one DNF clause.
///
/// Adjacent/overlapping ranges are merged on construction so [`RangeUnion::covers`] can answer
/// "does this union cover `inner` in its entirety" with a single scan instead of needing exact
/// set-difference reasoning.
pub(crate) struct RangeUnion(Vec<VersionRange>);

impl RangeUnion {
    pub(crate) fn new(mut ranges: Vec<VersionRange>) -> Self {
        ranges.sort_by(|a, b| cmp_min(&a.min, &b.min));
        let mut merged: Vec<VersionRange> = Vec::with_capacity(ranges.len());
        for range in ranges {
            match merged.last_mut() {
                Some(prev) if overlaps_or_touches(prev, &range) => {
                    prev.max = pick_higher_max(&prev.max, &range.max);
                }
                _ => merged.push(range),
            }
        }
        Self(merged)
    }

    /// Returns `true` if every version in `inner` is covered by some (merged) range in `self`.
    pub(crate) fn covers(&self, inner: &VersionRange) -> bool {
        self.0.iter().any(|r| r.contains_range(inner))
    }

    /// Returns `true` if every range making up `other` is covered by `self`.
    pub(crate) fn covers_union(&self, other: &RangeUnion) -> bool {
        other.0.iter().all(|r| self.covers(r))
    }
}

fn cmp_min(a: &Option<Bound>, b: &Option<Bound>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.version.cmp(&y.version),
    }
}

fn overlaps_or_touches(prev: &VersionRange, next: &VersionRange) -> bool {
    match (&prev.max, &next.min) {
        (None, _) => true,
        (Some(_), None) => true,
        (Some(pmax), Some(nmin)) => match pmax.version.cmp(&nmin.version) {
            Ordering::Greater => true,
            Ordering::Equal => pmax.inclusive || nmin.inclusive,
            Ordering::Less => false,
        },
    }
}

fn pick_higher_max(a: &Option<Bound>, b: &Option<Bound>) -> Option<Bound> {
    match (a, b) {
        (None, _) | (_, None) => None,
        (Some(x), Some(y)) => match x.version.cmp(&y.version) {
            Ordering::Greater => Some(x.clone()),
            Ordering::Less => Some(y.clone()),
            Ordering::Equal => Some(Bound {
                version: x.version.clone(),
                inclusive: x.inclusive || y.inclusive,
            }),
        },
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::from_str(s).unwrap()
    }

    #[test]
    fn ge_contains_gt() {
        let outer = VersionRange::from_comparison(MarkerOperator::GreaterEqual, &v("3.8")).unwrap();
        let inner = VersionRange::from_comparison(MarkerOperator::GreaterThan, &v("3.8")).unwrap();
        assert!(outer.contains_range(&inner));
        assert!(!inner.contains_range(&outer));
    }

    #[test]
    fn intersect_narrows() {
        let a = VersionRange::from_comparison(MarkerOperator::GreaterEqual, &v("3.8")).unwrap();
        let b = VersionRange::from_comparison(MarkerOperator::LessThan, &v("3.11")).unwrap();
        let both = a.intersect(&b);
        let narrower =
            VersionRange::from_comparison(MarkerOperator::GreaterEqual, &v("3.9")).unwrap();
        assert!(both.contains_range(&narrower));
        let wider = VersionRange::unbounded();
        assert!(!both.contains_range(&wider));
    }
}
