//! The boundary engine: per-file pipeline and ledger reconciliation.
//!
//! Per-file work (parse, extract, resolve, check) is embarrassingly
//! parallel and runs on the rayon pool; results are aggregated and
//! ledger files are only read and written in the single-threaded
//! aggregation step, so workers never race on ledger I/O.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use bulkhead_core::config::RunConfig;
use bulkhead_core::package::{DependencyEnforcement, PackageSet};
use bulkhead_core::types::ViolationKind;
use bulkhead_resolve::extractor;
use bulkhead_resolve::index::DeclarationIndex;
use bulkhead_resolve::inflector::Inflector;
use bulkhead_resolve::resolver::ConstantResolver;
use bulkhead_resolve::tree::{ParseDiagnostic, SyntaxTree, TreeProvider};

use crate::checker::{default_checkers, Checker};
use crate::ledger::{LedgerError, PackageTodo};
use crate::types::{CheckedConstant, FileOffense, Reference, ReferenceOffense, RunResult};

/// Orchestrates one analysis run over a fixed package set.
pub struct BoundaryEngine {
    project_root: PathBuf,
    packages: PackageSet,
    load_paths: Vec<String>,
    inflector: Inflector,
    checkers: Vec<Box<dyn Checker>>,
    parallel: bool,
    interrupt: Arc<AtomicBool>,
}

impl BoundaryEngine {
    pub fn new(
        project_root: &Path,
        packages: PackageSet,
        config: &RunConfig,
        inflector: Inflector,
    ) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            packages,
            load_paths: config.load_paths.clone(),
            inflector,
            checkers: default_checkers(),
            parallel: config.parallel,
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Replace the default checker list. The list is fixed for the
    /// engine's lifetime.
    pub fn with_checkers(mut self, checkers: Vec<Box<dyn Checker>>) -> Self {
        self.checkers = checkers;
        self
    }

    pub fn packages(&self) -> &PackageSet {
        &self.packages
    }

    /// Flag observed between file tasks: setting it stops new dispatch
    /// while already computed offenses are still aggregated.
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    fn interrupted(&self) -> bool {
        self.interrupt.load(Ordering::Relaxed)
    }

    /// Analyze `files` (project-root relative), reconciling offenses
    /// against each source package's ledger.
    pub fn check_all(&self, provider: &dyn TreeProvider, files: &[String]) -> RunResult {
        // Phase 1: obtain trees. Parse failures become diagnostics.
        let parsed = self.parse_phase(provider, files);

        let mut errors = Vec::new();
        let mut failed_files = Vec::new();
        let mut trees = Vec::new();
        for (file, result) in parsed {
            match result {
                Ok(tree) => trees.push((file, tree)),
                Err(diagnostic) => {
                    failed_files.push(file);
                    errors.push(FileOffense {
                        file: diagnostic.file,
                        message: diagnostic.message,
                    });
                }
            }
        }

        // Phase 2: declaration pre-scan, so the resolver never guesses
        // a reopened namespace.
        let mut index = DeclarationIndex::new();
        for (file, tree) in &trees {
            index.add_file(file, tree);
        }
        let resolver = ConstantResolver::new(
            &self.project_root,
            self.load_paths.clone(),
            self.inflector.clone(),
            index,
        );

        // Phase 3: extract, resolve, and check per file.
        let checked = self.check_phase(&resolver, &trees);

        let mut analyzed_files = failed_files;
        let mut reference_offenses = Vec::new();
        for (file, offenses) in checked {
            analyzed_files.push(file);
            reference_offenses.extend(offenses);
        }
        analyzed_files.sort();

        // Normalize presentation order regardless of worker scheduling.
        reference_offenses.sort_by(|a, b| {
            (a.file(), a.location(), a.kind).cmp(&(b.file(), b.location(), b.kind))
        });

        let new_offenses = self.reconcile(&reference_offenses, &mut errors);

        RunResult {
            reference_offenses,
            new_offenses,
            errors,
            analyzed_files,
        }
    }

    /// Rewrite every package ledger to match `result`, pruning entries
    /// no longer reproduced among the analyzed files and deleting
    /// ledgers left empty.
    pub fn update_ledgers(&self, result: &RunResult) -> Result<(), LedgerError> {
        let analyzed: HashSet<String> = result.analyzed_files.iter().cloned().collect();
        let fresh = self.fresh_ledgers(result);

        for package in self.packages.iter() {
            let mut ledger = PackageTodo::load(&self.project_root, package)?;
            ledger.remove_entries_for_files(&analyzed);
            if let Some(recomputed) = fresh.get(&package.name) {
                ledger.merge(recomputed);
            }
            ledger.dump(&self.project_root, package)?;
        }
        Ok(())
    }

    /// Whether any package ledger records a violation that `result` no
    /// longer reproduces.
    pub fn stale(&self, result: &RunResult) -> Result<bool, LedgerError> {
        let analyzed: HashSet<String> = result.analyzed_files.iter().cloned().collect();
        let fresh = self.fresh_ledgers(result);

        for package in self.packages.iter() {
            let ledger = PackageTodo::load(&self.project_root, package)?;
            if ledger.is_empty() {
                continue;
            }
            let empty = PackageTodo::new(&package.name);
            let recomputed = fresh.get(&package.name).unwrap_or(&empty);
            if ledger.stale_violations(recomputed, &analyzed) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    // -- Private helpers --

    fn parse_phase(
        &self,
        provider: &dyn TreeProvider,
        files: &[String],
    ) -> Vec<(String, Result<SyntaxTree, ParseDiagnostic>)> {
        let parse_one = |file: &String| {
            if self.interrupted() {
                return None;
            }
            Some((file.clone(), provider.tree_for(file)))
        };

        if self.parallel {
            files.par_iter().filter_map(parse_one).collect()
        } else {
            files.iter().filter_map(parse_one).collect()
        }
    }

    fn check_phase(
        &self,
        resolver: &ConstantResolver,
        trees: &[(String, SyntaxTree)],
    ) -> Vec<(String, Vec<ReferenceOffense>)> {
        let check_one = |(file, tree): &(String, SyntaxTree)| {
            if self.interrupted() {
                return None;
            }
            Some((file.clone(), self.check_file(resolver, file, tree)))
        };

        if self.parallel {
            trees.par_iter().filter_map(check_one).collect()
        } else {
            trees.iter().filter_map(check_one).collect()
        }
    }

    fn check_file(
        &self,
        resolver: &ConstantResolver,
        file: &str,
        tree: &SyntaxTree,
    ) -> Vec<ReferenceOffense> {
        let source_package = self
            .packages
            .package_for_path(file)
            .map(|p| p.name.clone());

        let mut offenses = Vec::new();
        for unresolved in extractor::extract(tree) {
            // `None` means ownership cannot be statically determined;
            // the reference is skipped, never raised.
            let Some(resolved) =
                resolver.resolve(&unresolved.name, &unresolved.namespace_path)
            else {
                continue;
            };

            let destination = self.packages.package_for_path(&resolved.relative_path);
            let public = destination
                .map(|p| p.is_public_path(&resolved.relative_path))
                .unwrap_or(false);

            let reference = Reference {
                source_package: source_package.clone(),
                source_file: file.to_string(),
                location: unresolved.location,
                constant: CheckedConstant {
                    full_name: resolved.full_name,
                    relative_path: resolved.relative_path,
                    package_name: destination.map(|p| p.name.clone()),
                    public,
                },
            };

            for checker in &self.checkers {
                if checker.invalid_reference(&reference, &self.packages) {
                    offenses.push(ReferenceOffense {
                        kind: checker.violation_kind(),
                        message: checker.message(&reference, &self.packages),
                        reference: reference.clone(),
                    });
                }
            }
        }
        offenses
    }

    /// Suppress offenses already accepted by their source package's
    /// ledger. Strict dependency enforcement bypasses suppression.
    fn reconcile(
        &self,
        offenses: &[ReferenceOffense],
        errors: &mut Vec<FileOffense>,
    ) -> Vec<ReferenceOffense> {
        let mut ledgers: HashMap<String, PackageTodo> = HashMap::new();
        let mut new_offenses = Vec::new();

        for offense in offenses {
            let Some(source_name) = offense.reference.source_package.clone() else {
                new_offenses.push(offense.clone());
                continue;
            };

            let ledger = match ledgers.entry(source_name.clone()) {
                Entry::Occupied(occupied) => occupied.into_mut(),
                Entry::Vacant(vacant) => {
                    let loaded = self
                        .packages
                        .get(&source_name)
                        .map(|package| PackageTodo::load(&self.project_root, package));
                    match loaded {
                        Some(Ok(ledger)) => vacant.insert(ledger),
                        Some(Err(e)) => {
                            errors.push(FileOffense {
                                file: offense.reference.source_file.clone(),
                                message: e.to_string(),
                            });
                            vacant.insert(PackageTodo::new(&source_name))
                        }
                        None => vacant.insert(PackageTodo::new(&source_name)),
                    }
                }
            };

            let strict = offense.kind == ViolationKind::Dependency
                && self
                    .packages
                    .get(&source_name)
                    .map(|p| p.enforce_dependencies == DependencyEnforcement::Strict)
                    .unwrap_or(false);

            let destination = offense
                .reference
                .constant
                .package_name
                .as_deref()
                .unwrap_or("");
            let listed = ledger.listed(
                destination,
                &offense.reference.constant.full_name,
                offense.kind,
                &offense.reference.source_file,
            );

            if strict || !listed {
                new_offenses.push(offense.clone());
            }
        }

        new_offenses
    }

    /// Group this run's offenses into per-source-package ledgers.
    fn fresh_ledgers(&self, result: &RunResult) -> HashMap<String, PackageTodo> {
        let mut fresh: HashMap<String, PackageTodo> = HashMap::new();
        for offense in &result.reference_offenses {
            let (Some(source), Some(destination)) = (
                &offense.reference.source_package,
                &offense.reference.constant.package_name,
            ) else {
                continue;
            };
            fresh
                .entry(source.clone())
                .or_insert_with(|| PackageTodo::new(source))
                .add(
                    destination,
                    &offense.reference.constant.full_name,
                    offense.kind,
                    &offense.reference.source_file,
                );
        }
        fresh
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
