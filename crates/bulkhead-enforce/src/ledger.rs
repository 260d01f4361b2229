//! The per-package violation ledger.
//!
//! Each source package persists its accepted violations in a
//! `package_todo.yml` at its root: destination package → fully-qualified
//! constant → violation kinds + manifesting files. The ledger is the
//! incremental-adoption mechanism: a normal check suppresses listed
//! offenses without touching the file; only an explicit update rewrites
//! it. Serialization is deterministic so identical violation sets
//! produce byte-identical files.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use bulkhead_core::package::Package;
use bulkhead_core::types::ViolationKind;

/// Conventional ledger filename, relative to a package root.
pub const TODO_FILENAME: &str = "package_todo.yml";

const HEADER: &str = "\
# This file records boundary violations that are currently tolerated for
# this package. Work to reduce this list over time.
#
# Entries are rewritten only by an explicit ledger update; a normal check
# reports offenses that are not yet listed here and leaves the file
# untouched.
";

/// Errors raised while reading or writing a ledger file.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("failed to read ledger {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed ledger {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("failed to write ledger {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// One accepted violation: the kinds observed and the files where the
/// violation currently manifests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TodoEntry {
    pub violations: Vec<String>,
    pub files: Vec<String>,
}

impl TodoEntry {
    fn normalize(&mut self) {
        self.violations.sort();
        self.violations.dedup();
        self.files.sort();
        self.files.dedup();
    }
}

/// The ledger of one source package.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackageTodo {
    package_name: String,
    /// destination package → constant → entry
    entries: BTreeMap<String, BTreeMap<String, TodoEntry>>,
}

impl PackageTodo {
    pub fn new(package_name: &str) -> Self {
        Self {
            package_name: package_name.to_string(),
            entries: BTreeMap::new(),
        }
    }

    /// The ledger file location for `package` under `project_root`.
    pub fn path_for(project_root: &Path, package: &Package) -> PathBuf {
        if package.root.is_empty() {
            project_root.join(TODO_FILENAME)
        } else {
            project_root.join(&package.root).join(TODO_FILENAME)
        }
    }

    /// Load `package`'s ledger; a missing file is an empty ledger.
    pub fn load(project_root: &Path, package: &Package) -> Result<Self, LedgerError> {
        let path = Self::path_for(project_root, package);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::new(&package.name));
            }
            Err(source) => {
                return Err(LedgerError::Read {
                    path: path.display().to_string(),
                    source,
                });
            }
        };

        let entries: Option<BTreeMap<String, BTreeMap<String, TodoEntry>>> =
            serde_yaml_ng::from_str(&content).map_err(|source| LedgerError::Parse {
                path: path.display().to_string(),
                source,
            })?;

        let mut todo = Self {
            package_name: package.name.clone(),
            entries: entries.unwrap_or_default(),
        };
        // Hand-edited ledgers may be unsorted; normalize so a rewrite of
        // the same violation set is byte-stable.
        for by_constant in todo.entries.values_mut() {
            for entry in by_constant.values_mut() {
                entry.normalize();
            }
        }
        Ok(todo)
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the ledger accepts `kind` for `constant` (defined in
    /// `destination`) manifesting in `file`.
    pub fn listed(
        &self,
        destination: &str,
        constant: &str,
        kind: ViolationKind,
        file: &str,
    ) -> bool {
        self.entries
            .get(destination)
            .and_then(|by_constant| by_constant.get(constant))
            .is_some_and(|entry| {
                entry.violations.iter().any(|v| v == kind.as_str())
                    && entry.files.iter().any(|f| f == file)
            })
    }

    /// Idempotently union a violation into the ledger.
    pub fn add(&mut self, destination: &str, constant: &str, kind: ViolationKind, file: &str) {
        let entry = self
            .entries
            .entry(destination.to_string())
            .or_default()
            .entry(constant.to_string())
            .or_default();
        entry.violations.push(kind.as_str().to_string());
        entry.files.push(file.to_string());
        entry.normalize();
    }

    /// Drop every (kind, file) recorded for a file in `files`. Entries
    /// left with no files are removed, as are emptied destinations.
    pub fn remove_entries_for_files(&mut self, files: &HashSet<String>) {
        for by_constant in self.entries.values_mut() {
            for entry in by_constant.values_mut() {
                entry.files.retain(|f| !files.contains(f));
            }
            by_constant.retain(|_, entry| !entry.files.is_empty());
        }
        self.entries.retain(|_, by_constant| !by_constant.is_empty());
    }

    /// Union every entry of `other` into this ledger.
    pub fn merge(&mut self, other: &PackageTodo) {
        for (destination, by_constant) in &other.entries {
            for (constant, entry) in by_constant {
                for violation in &entry.violations {
                    if let Some(kind) = ViolationKind::parse(violation) {
                        for file in &entry.files {
                            self.add(destination, constant, kind, file);
                        }
                    }
                }
            }
        }
    }

    /// Whether any recorded (kind, file) combination for a file in
    /// `analyzed_files` was not re-observed in `fresh` — i.e. the ledger
    /// is out of date and should be regenerated.
    pub fn stale_violations(
        &self,
        fresh: &PackageTodo,
        analyzed_files: &HashSet<String>,
    ) -> bool {
        for (destination, by_constant) in &self.entries {
            for (constant, entry) in by_constant {
                for violation in &entry.violations {
                    let Some(kind) = ViolationKind::parse(violation) else {
                        continue;
                    };
                    for file in &entry.files {
                        if analyzed_files.contains(file)
                            && !fresh.listed(destination, constant, kind, file)
                        {
                            return true;
                        }
                    }
                }
            }
        }
        false
    }

    /// Deterministic serialization: destinations, constants, kinds, and
    /// files all in sorted order, preceded by the fixed header.
    pub fn serialize(&self) -> String {
        if self.entries.is_empty() {
            return String::new();
        }
        // BTreeMap ordering plus normalized entries make this stable.
        let body = serde_yaml_ng::to_string(&self.entries).unwrap_or_default();
        format!("{HEADER}{body}")
    }

    /// Write the ledger to its package-scoped location; an empty ledger
    /// deletes the file instead.
    pub fn dump(&self, project_root: &Path, package: &Package) -> Result<(), LedgerError> {
        let path = Self::path_for(project_root, package);
        if self.entries.is_empty() {
            match std::fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(source) => Err(LedgerError::Write {
                    path: path.display().to_string(),
                    source,
                }),
            }
        } else {
            std::fs::write(&path, self.serialize()).map_err(|source| LedgerError::Write {
                path: path.display().to_string(),
                source,
            })
        }
    }
}
