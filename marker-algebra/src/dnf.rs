// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`Marker`]: a disjunction-of-conjunctions (DNF) boolean expression over [`Atom`]s.

use crate::expr::{Atom, MarkerOperator, MarkerValueVersion};
use crate::range::{RangeUnion, VersionRange};
use once_cell::sync::Lazy;
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr as _;
use std::sync::Arc;

/// A clause is a conjunction ("and") of atoms. Most real-world markers have one or two atoms
/// per clause, so a `SmallVec` avoids a heap allocation for the common case.
type Clause = SmallVec<[Atom; 4]>;

/// A boolean expression over environment variables, represented as a disjunction of
/// conjunctions of [`Atom`]s.
///
/// `Marker` is cheap to clone (an `Arc` around the clause list) and compares/hashes on a
/// canonicalized form, so two markers built through different sequences of `union`/`intersect`
/// calls but denoting the same boolean function are equal.
#[derive(Clone, Debug)]
pub struct Marker {
    clauses: Arc<Vec<Clause>>,
}

static ANY: Lazy<Marker> = Lazy::new(|| Marker::from_raw_clauses(vec![Clause::new()]));
static EMPTY: Lazy<Marker> = Lazy::new(|| Marker::from_raw_clauses(vec![]));

impl Marker {
    /// The tautology: always true, under every environment. The DNF identity of `∩`.
    pub fn any() -> Marker {
        ANY.clone()
    }

    /// The contradiction: never true, under no environment. The DNF identity of `∪`.
    pub fn empty() -> Marker {
        EMPTY.clone()
    }

    /// Builds a marker consisting of a single conjunction of atoms.
    pub fn from_atoms(atoms: Vec<Atom>) -> Marker {
        Self::from_raw_clauses(vec![atoms.into()])
    }

    fn from_raw_clauses(clauses: Vec<Clause>) -> Marker {
        Marker {
            clauses: Arc::new(canonicalize(clauses)),
        }
    }

    /// Returns `true` if this marker is the tautology.
    pub fn is_any(&self) -> bool {
        self.clauses.len() == 1 && self.clauses[0].is_empty()
    }

    /// Returns `true` if this marker is the contradiction.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Logical AND: a version is selected under `self.intersect(other)` iff it is selected
    /// under both `self` and `other`.
    ///
    /// Implemented as the cartesian product of clauses, distributed -- this is what makes the
    /// DNF representation a total algebra with no further normalization pass needed (§4.A).
    pub fn intersect(&self, other: &Marker) -> Marker {
        if self.is_any() {
            return other.clone();
        }
        if other.is_any() {
            return self.clone();
        }
        if self.is_empty() || other.is_empty() {
            return Marker::empty();
        }
        let mut clauses = Vec::with_capacity(self.clauses.len() * other.clauses.len());
        for a in self.clauses.iter() {
            for b in other.clauses.iter() {
                let mut combined = a.clone();
                combined.extend(b.iter().cloned());
                clauses.push(combined);
            }
        }
        Marker::from_raw_clauses(clauses)
    }

    /// Logical OR: a version is selected under `self.union(other)` iff it is selected under
    /// either `self` or `other`.
    pub fn union(&self, other: &Marker) -> Marker {
        if self.is_any() || other.is_any() {
            return Marker::any();
        }
        let mut clauses = Vec::with_capacity(self.clauses.len() + other.clauses.len());
        clauses.extend(self.clauses.iter().cloned());
        clauses.extend(other.clauses.iter().cloned());
        Marker::from_raw_clauses(clauses)
    }

    /// Drops every `extra == "…"` / `extra != "…"` atom from every clause.
    ///
    /// A clause that becomes empty after stripping denotes "always true" for that clause (an
    /// empty conjunction), which can promote the whole marker to [`Marker::any`] -- e.g.
    /// `extra == "x"` strips to the tautology, since it carried no other constraint.
    pub fn without_extras(&self) -> Marker {
        let clauses = self
            .clauses
            .iter()
            .map(|clause| {
                clause
                    .iter()
                    .filter(|atom| !atom.is_extra())
                    .cloned()
                    .collect()
            })
            .collect();
        Marker::from_raw_clauses(clauses)
    }

    /// Projects this marker down to only the atoms naming `variable` (e.g. `"python_version"`).
    ///
    /// As with [`Marker::without_extras`], a clause with no atom on that variable collapses to
    /// the tautology for that clause.
    pub fn only(&self, variable: &str) -> Marker {
        let clauses = self
            .clauses
            .iter()
            .map(|clause| {
                clause
                    .iter()
                    .filter(|atom| atom_variable_name(atom) == variable)
                    .cloned()
                    .collect()
            })
            .collect();
        Marker::from_raw_clauses(clauses)
    }

    /// Removes `python_version`/`python_full_version` atoms whose truth is already implied by
    /// `constraint` -- i.e. atoms that hold for every interpreter version the project supports,
    /// so evaluating them contributes nothing once the project's own constraint is assumed.
    pub fn reduce_by_python_constraint(&self, constraint: &PythonConstraint) -> Marker {
        let clauses = self
            .clauses
            .iter()
            .map(|clause| {
                clause
                    .iter()
                    .filter(|atom| !is_implied_version_atom(atom, constraint))
                    .cloned()
                    .collect()
            })
            .collect();
        Marker::from_raw_clauses(clauses)
    }

    /// Attempts to read this marker as a pure interpreter-version constraint: succeeds only when
    /// every clause consists solely of reducible `python_version`/`python_full_version` atoms
    /// (see [`crate::range::VersionRange::from_comparison`] for which operators qualify).
    ///
    /// Used by the override merger (§4.F) to decide whether a marker that mentions only the
    /// interpreter variable can be promoted to [`Marker::any`] because it already covers the
    /// project's declared interpreter constraint.
    pub fn as_python_constraint(&self) -> Option<PythonConstraint> {
        if self.is_any() {
            return Some(PythonConstraint {
                ranges: RangeUnion::new(vec![VersionRange::unbounded()]),
            });
        }
        if self.is_empty() {
            return None;
        }
        let mut ranges = Vec::with_capacity(self.clauses.len());
        for clause in self.clauses.iter() {
            let mut range = VersionRange::unbounded();
            for atom in clause {
                let Atom::Version {
                    key,
                    operator,
                    version,
                } = atom
                else {
                    return None;
                };
                if !key.is_interpreter_version() {
                    return None;
                }
                let atom_range = VersionRange::from_comparison(*operator, version)?;
                range = range.intersect(&atom_range);
            }
            ranges.push(range);
        }
        Some(PythonConstraint {
            ranges: RangeUnion::new(ranges),
        })
    }
}

fn atom_variable_name(atom: &Atom) -> String {
    match atom {
        Atom::Version { key, .. } => key.to_string(),
        Atom::Str { key, .. } => key.to_string(),
        Atom::Extra { .. } => "extra".to_string(),
    }
}

fn is_implied_version_atom(atom: &Atom, constraint: &PythonConstraint) -> bool {
    let Atom::Version {
        key,
        operator,
        version,
    } = atom
    else {
        return false;
    };
    if !key.is_interpreter_version() {
        return false;
    }
    let Some(atom_range) = VersionRange::from_comparison(*operator, version) else {
        return false;
    };
    // Implied means "true for every version the project supports": the project's own
    // constraint must be a subset of the atom's range, i.e. the atom's range covers it --
    // not the other way around (a narrower atom than the project's floor must survive).
    RangeUnion::new(vec![atom_range]).covers_union(&constraint.ranges)
}

/// A dependency's declared `python = "…"` requirement, reduced to an interval (or union of
/// intervals) of admissible interpreter versions.
///
/// Constructed via [`Marker::as_python_constraint`] (when derived from a marker) or
/// [`PythonConstraint::parse`] (when read from a project manifest's own constraint string).
pub struct PythonConstraint {
    ranges: RangeUnion,
}

impl PythonConstraint {
    /// Parses a comma-separated list of PEP 440 version specifiers, e.g. `">=3.8,<4.0"`.
    pub fn parse(input: &str) -> Result<Self, crate::Error> {
        let mut ranges = vec![VersionRange::unbounded()];
        for part in input.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (operator, version_str) = split_specifier(part)
                .ok_or_else(|| crate::Error::InvalidConstraint(input.to_string()))?;
            let version = pep440_rs::Version::from_str(version_str)
                .map_err(|_| crate::Error::InvalidConstraint(input.to_string()))?;
            let atom_range = VersionRange::from_comparison(operator, &version)
                .ok_or_else(|| crate::Error::InvalidConstraint(input.to_string()))?;
            for range in ranges.iter_mut() {
                *range = range.intersect(&atom_range);
            }
        }
        Ok(Self {
            ranges: RangeUnion::new(ranges),
        })
    }

    /// Returns `true` if this constraint covers every version in `other` -- i.e. `other ⊆ self`.
    pub fn covers(&self, other: &PythonConstraint) -> bool {
        self.ranges.covers_union(&other.ranges)
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    fn win32() -> Marker {
        Marker::parse_str(r#"sys_platform == "win32""#).unwrap()
    }

    fn linux() -> Marker {
        Marker::parse_str(r#"sys_platform == "linux""#).unwrap()
    }

    fn py38() -> Marker {
        Marker::parse_str(r#"python_version == "3.8""#).unwrap()
    }

    #[test]
    fn any_is_identity_for_intersect() {
        let m = win32();
        assert_eq!(Marker::any().intersect(&m), m);
        assert_eq!(m.intersect(&Marker::any()), m);
    }

    #[test]
    fn empty_is_identity_for_union() {
        let m = win32();
        assert_eq!(Marker::empty().union(&m), m);
        assert_eq!(m.union(&Marker::empty()), m);
    }

    #[test]
    fn empty_annihilates_intersect() {
        assert!(win32().intersect(&Marker::empty()).is_empty());
    }

    #[test]
    fn any_annihilates_union() {
        assert!(win32().union(&Marker::any()).is_any());
    }

    #[test]
    fn intersect_is_commutative_and_associative_modulo_equality() {
        let a = win32();
        let b = py38();
        let c = linux();
        assert_eq!(a.intersect(&b), b.intersect(&a));
        assert_eq!(a.intersect(&b).intersect(&c), a.intersect(&b.intersect(&c)));
    }

    #[test]
    fn union_is_commutative_and_idempotent() {
        let a = win32();
        let b = linux();
        assert_eq!(a.union(&b), b.union(&a));
        assert_eq!(a.union(&a), a);
    }

    #[test]
    fn intersect_distributes_into_disjunction() {
        // (win32 or linux) and py38 == (win32 and py38) or (linux and py38)
        let lhs = win32().union(&linux()).intersect(&py38());
        let rhs = win32().intersect(&py38()).union(&linux().intersect(&py38()));
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn without_extras_strips_extra_atoms_only() {
        let marker = Marker::parse_str(r#"extra == "x" and sys_platform == "win32""#).unwrap();
        assert_eq!(marker.without_extras(), win32());
    }

    #[test]
    fn without_extras_promotes_pure_extra_clause_to_any() {
        let marker = Marker::parse_str(r#"extra == "x""#).unwrap();
        assert!(marker.without_extras().is_any());
    }

    #[test]
    fn only_projects_down_to_named_variable() {
        let marker = Marker::parse_str(r#"sys_platform == "win32" and python_version == "3.8""#).unwrap();
        assert_eq!(marker.only("sys_platform"), win32());
    }

    #[test]
    fn reduce_by_python_constraint_drops_implied_clause_entirely() {
        // The project's own floor (>=3.8) is a subset of the atom's range (>=3.8), so the atom
        // holds for every interpreter version the project could possibly run on: implied, drop.
        let project = PythonConstraint::parse(">=3.8").unwrap();
        let marker = Marker::parse_str(r#"python_version >= "3.8""#).unwrap();
        assert!(marker.reduce_by_python_constraint(&project).is_any());

        // A marker narrower than the project's floor (>=3.12 under a >=3.9 project) excludes
        // interpreter versions the project does support (3.9 through 3.11), so it is not
        // implied and must survive.
        let narrow = Marker::parse_str(r#"python_version >= "3.12""#).unwrap();
        let wider_project = PythonConstraint::parse(">=3.9").unwrap();
        assert!(!narrow.reduce_by_python_constraint(&wider_project).is_any());
    }

    #[test]
    fn as_python_constraint_rejects_non_interpreter_atoms() {
        assert!(win32().as_python_constraint().is_none());
    }

    #[test]
    fn marker_equality_is_insensitive_to_build_order() {
        // E2: (win32 and py310) or (linux and py311), built in two different orders.
        let py310 = Marker::parse_str(r#"python_version == "3.10""#).unwrap();
        let py311 = Marker::parse_str(r#"python_version == "3.11""#).unwrap();
        let a = win32().intersect(&py310).union(&linux().intersect(&py311));
        let b = linux().intersect(&py311).union(&win32().intersect(&py310));
        assert_eq!(a, b);
    }
}

fn split_specifier(part: &str) -> Option<(MarkerOperator, &str)> {
    const OPERATORS: &[(&str, MarkerOperator)] = &[
        ("~=", MarkerOperator::TildeEqual),
        ("==", MarkerOperator::Equal),
        ("!=", MarkerOperator::NotEqual),
        ("<=", MarkerOperator::LessEqual),
        (">=", MarkerOperator::GreaterEqual),
        ("<", MarkerOperator::LessThan),
        (">", MarkerOperator::GreaterThan),
    ];
    for (symbol, operator) in OPERATORS {
        if let Some(rest) = part.strip_prefix(symbol) {
            return Some((*operator, rest.trim()));
        }
    }
    None
}

fn canonicalize(mut clauses: Vec<Clause>) -> Vec<Clause> {
    for clause in clauses.iter_mut() {
        clause.sort();
        clause.dedup();
    }
    if clauses.iter().any(|clause| clause.is_empty()) {
        return vec![Clause::new()];
    }
    clauses.sort();
    clauses.dedup();
    clauses
}

impl PartialEq for Marker {
    fn eq(&self, other: &Self) -> bool {
        self.clauses == other.clauses
    }
}

impl Eq for Marker {}

impl std::hash::Hash for Marker {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.clauses.hash(state);
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_any() {
            return write!(f, "true");
        }
        if self.is_empty() {
            return write!(f, "false");
        }
        let multi_clause = self.clauses.len() > 1;
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                write!(f, " or ")?;
            }
            let multi_atom = clause.len() > 1;
            if multi_clause && multi_atom {
                write!(f, "(")?;
            }
            for (j, atom) in clause.iter().enumerate() {
                if j > 0 {
                    write!(f, " and ")?;
                }
                write!(f, "{atom}")?;
            }
            if multi_clause && multi_atom {
                write!(f, ")")?;
            }
        }
        Ok(())
    }
}
