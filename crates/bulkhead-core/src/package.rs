//! The in-memory package model.
//!
//! A [`Package`] is a named, path-rooted unit of code with its own
//! enforcement policy and dependency list. A [`PackageSet`] indexes all
//! packages of a project and answers "which package owns this file?"
//! by deepest-enclosing-root match.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

/// Name of the implicit package rooted at the project root.
pub const ROOT_PACKAGE_NAME: &str = "";

/// Default public path convention, relative to a package root.
pub const DEFAULT_PUBLIC_PATH: &str = "app/public";

/// How strongly a package enforces its declared dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyEnforcement {
    Disabled,
    Enabled,
    /// Like `Enabled`, but offenses are reported even when the ledger
    /// already lists them.
    Strict,
}

impl DependencyEnforcement {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, DependencyEnforcement::Disabled)
    }
}

/// How a package enforces privacy of its constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrivacyEnforcement {
    Disabled,
    /// Every non-public constant is private.
    All,
    /// Only the listed constants (and constants nested under them) are
    /// private.
    ExplicitList(BTreeSet<String>),
}

impl PrivacyEnforcement {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, PrivacyEnforcement::Disabled)
    }

    /// Whether `constant` (a root-qualified name like `::Sales::Order`)
    /// falls under this policy.
    pub fn covers(&self, constant: &str) -> bool {
        match self {
            PrivacyEnforcement::Disabled => false,
            PrivacyEnforcement::All => true,
            PrivacyEnforcement::ExplicitList(list) => list
                .iter()
                .any(|p| constant == p || constant.starts_with(&format!("{p}::"))),
        }
    }
}

/// A declared package: identity, filesystem root, and enforcement policy.
///
/// Immutable after load; lives for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Unique slash-delimited name, equal to the package root relative
    /// to the project root. The root package's name is `""`.
    pub name: String,
    /// Filesystem root relative to the project root, `/`-separated.
    pub root: String,
    pub enforce_dependencies: DependencyEnforcement,
    pub enforce_privacy: PrivacyEnforcement,
    /// Names of packages this package is allowed to reference.
    pub dependencies: BTreeSet<String>,
    /// Directory under `root` whose constants are public, without
    /// trailing slash.
    pub public_path: String,
}

impl Package {
    /// A package with every enforcement disabled, rooted at `name`.
    pub fn permissive(name: &str) -> Self {
        Self {
            name: name.to_string(),
            root: name.to_string(),
            enforce_dependencies: DependencyEnforcement::Disabled,
            enforce_privacy: PrivacyEnforcement::Disabled,
            dependencies: BTreeSet::new(),
            public_path: DEFAULT_PUBLIC_PATH.to_string(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.name == ROOT_PACKAGE_NAME
    }

    /// Whether `path` (project-root relative) lies inside this package's
    /// root directory.
    pub fn contains_path(&self, path: &str) -> bool {
        self.root.is_empty()
            || path == self.root
            || path.starts_with(&format!("{}/", self.root))
    }

    /// Whether `path` (project-root relative) lies under this package's
    /// public path.
    pub fn is_public_path(&self, path: &str) -> bool {
        let prefix = if self.root.is_empty() {
            format!("{}/", self.public_path)
        } else {
            format!("{}/{}/", self.root, self.public_path)
        };
        path.starts_with(&prefix)
    }

    pub fn has_dependency_on(&self, other: &str) -> bool {
        self.dependencies.contains(other)
    }
}

/// All packages of a project, indexed for path lookup.
///
/// Invariant: every file path maps to at most one package (the deepest
/// enclosing root). When a root manifest exists — or the implicit root
/// package was synthesized at load — every path maps to exactly one.
#[derive(Debug, Clone)]
pub struct PackageSet {
    packages: Vec<Package>,
    by_name: HashMap<String, usize>,
    /// Indices sorted by root depth, deepest first, for longest-prefix
    /// matching.
    match_order: Vec<usize>,
}

impl PackageSet {
    pub fn new(mut packages: Vec<Package>) -> Self {
        packages.sort_by(|a, b| a.name.cmp(&b.name));

        let by_name = packages
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.clone(), i))
            .collect();

        let mut match_order: Vec<usize> = (0..packages.len()).collect();
        match_order.sort_by_key(|&i| {
            let root = &packages[i].root;
            let depth = if root.is_empty() {
                0
            } else {
                root.split('/').count()
            };
            std::cmp::Reverse(depth)
        });

        Self {
            packages,
            by_name,
            match_order,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Package> {
        self.by_name.get(name).map(|&i| &self.packages[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// The deepest package whose root encloses `path`.
    ///
    /// Linear scan over packages in depth order; fine at project scale
    /// (packages number in the low thousands).
    pub fn package_for_path(&self, path: &str) -> Option<&Package> {
        self.match_order
            .iter()
            .map(|&i| &self.packages[i])
            .find(|p| p.contains_path(path))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Package> {
        self.packages.iter()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Check that every declared dependency names a known package.
    pub fn validate(&self) -> Result<(), crate::types::ManifestError> {
        for package in &self.packages {
            for dep in &package.dependencies {
                if !self.contains(dep) {
                    return Err(crate::types::ManifestError::UnknownDependency {
                        package: package.name.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
