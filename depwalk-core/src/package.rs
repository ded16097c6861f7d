// Copyright (c) The cargo-guppy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The data model (§3): package identity, dependency records, and the small interned-string
//! newtypes used throughout the crate so signatures read as `IndexSet<GroupName>` rather than
//! `IndexSet<String>`.

use indexmap::IndexSet;
use marker_algebra::Marker;
use pep440_rs::{Version, VersionSpecifiers};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// An interned, cheaply-cloneable package name, normalized the way the upstream repository
/// index normalizes names (case and separator-folded). Mirrors `guppy::PackageId`'s choice of
/// wrapping a boxed/interned string rather than a bare `String`.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PackageName(Arc<str>);

impl PackageName {
    /// Creates a new package name from any string-like value.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// Returns this name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PackageName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PackageName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// An interned dependency-group name (`"main"`, `"dev"`, `"test"`, …).
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct GroupName(Arc<str>);

impl GroupName {
    /// Creates a new group name from any string-like value.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// The default group every dependency belongs to unless stated otherwise.
    pub fn main() -> Self {
        Self::new("main")
    }

    /// Returns this name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GroupName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The identity of a package: name, version, and activated extras (§3).
///
/// Two packages with the same name and version but different `features` are distinct graph
/// nodes; the package with an empty `features` set is the *base* package that survives feature
/// folding (§4.G).
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PackageIdentity {
    /// The normalized package name.
    pub name: PackageName,
    /// The resolved version.
    pub version: Version,
    /// Activated extras, if this identity is a feature-variant of a base package.
    pub features: BTreeSet<String>,
}

impl PackageIdentity {
    /// Creates a new identity with no activated extras (a base package).
    pub fn base(name: impl Into<PackageName>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
            features: BTreeSet::new(),
        }
    }

    /// Returns `true` if this identity names a feature-variant (has activated extras).
    pub fn is_feature_variant(&self) -> bool {
        !self.features.is_empty()
    }

    /// The identity of the base package this identity folds into, if it is a variant.
    pub fn base_identity(&self) -> PackageIdentity {
        PackageIdentity {
            name: self.name.clone(),
            version: self.version.clone(),
            features: BTreeSet::new(),
        }
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.features.is_empty() {
            write!(f, "{} ({})", self.name, self.version)
        } else {
            let extras = self.features.iter().cloned().collect::<Vec<_>>().join(",");
            write!(f, "{}[{extras}] ({})", self.name, self.version)
        }
    }
}

/// An immutable dependency edge declaration, as it would appear in a lockfile entry (§3).
#[derive(Clone, Debug)]
pub struct Dependency {
    /// The target package name this dependency resolves against.
    pub name: PackageName,
    /// The version constraint the target must satisfy.
    pub constraint: VersionSpecifiers,
    /// The environment marker under which this dependency applies. Defaults to [`Marker::any`].
    pub marker: Marker,
    /// The dependency groups this requirement belongs to. Defaults to `{"main"}`.
    pub groups: IndexSet<GroupName>,
    /// Whether this dependency is optional (gated behind an extra of its own package).
    pub optional: bool,
    /// The root project's extras through which this dependency was introduced, if any.
    pub in_extras: IndexSet<String>,
}

impl Dependency {
    /// Creates a required, `main`-group dependency with no marker and no extras gating.
    pub fn required(name: impl Into<PackageName>, constraint: VersionSpecifiers) -> Self {
        Self {
            name: name.into(),
            constraint,
            marker: Marker::any(),
            groups: IndexSet::from_iter([GroupName::main()]),
            optional: false,
            in_extras: IndexSet::new(),
        }
    }

    /// Returns `true` if `version` satisfies this dependency's constraint.
    pub fn satisfies_version(&self, version: &Version) -> bool {
        self.constraint.contains(version)
    }
}

/// Two dependencies are the fold-time "duplicate" iff they compare equal *and* carry an equal
/// marker (§4.G, §9 Open Question #1: group-set and optional are intentionally excluded from
/// this key, preserving the source's behavior as-is).
impl PartialEq for Dependency {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.constraint.to_string() == other.constraint.to_string()
            && self.marker == other.marker
    }
}

impl Eq for Dependency {}

/// A resolved package: its identity plus the dependency edges the solver attached to it.
///
/// `Package` compares and hashes by [`PackageIdentity`] alone, so it can be used as a map key
/// even while its `requires` list is still being extended during feature folding (§4.G) --
/// mirroring how the source mutates a `Package` in place without changing its identity.
#[derive(Clone, Debug)]
pub struct Package {
    /// This package's identity.
    pub identity: PackageIdentity,
    /// This package's own dependency declarations, post feature-folding.
    pub requires: Vec<Dependency>,
    /// Whether this package was marked yanked by its repository (§7, non-fatal warning).
    pub yanked: bool,
    /// A human-readable yanked reason, if any.
    pub yanked_reason: Option<String>,
}

impl Package {
    /// Creates a new package with no dependencies.
    pub fn new(identity: PackageIdentity) -> Self {
        Self {
            identity,
            requires: Vec::new(),
            yanked: false,
            yanked_reason: None,
        }
    }

    /// Returns this package's name.
    pub fn name(&self) -> &PackageName {
        &self.identity.name
    }

    /// All dependencies this package declares, including any folded in from feature variants
    /// (§4.B refers to this as `all_requires`).
    pub fn all_requires(&self) -> &[Dependency] {
        &self.requires
    }
}

impl PartialEq for Package {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for Package {}

impl std::hash::Hash for Package {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.identity, f)
    }
}
