//! Boundary enforcement for bulkhead.
//!
//! Checks resolved references against package policy and reconciles the
//! results with each package's persisted violation ledger:
//! - [`types`] — References, offenses, and run results
//! - [`checker`] — The [`Checker`](checker::Checker) contract plus the
//!   privacy and dependency checkers
//! - [`ledger`] — The per-package `package_todo.yml` ledger
//! - [`engine`] — The [`BoundaryEngine`](engine::BoundaryEngine)
//!   orchestrating the parallel per-file pipeline

pub mod checker;
pub mod engine;
pub mod ledger;
pub mod types;
