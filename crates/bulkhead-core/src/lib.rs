//! Core types, package model, and configuration for bulkhead.
//!
//! This crate provides the foundational data structures used across all
//! bulkhead crates:
//! - [`types`] — Violation kinds, source locations, and error types
//! - [`package`] — [`Package`](package::Package) and the path-indexed
//!   [`PackageSet`](package::PackageSet)
//! - [`manifest`] — `package.yml` discovery and parsing
//! - [`config`] — Run configuration loading from `bulkhead.yml`

pub mod config;
pub mod manifest;
pub mod package;
pub mod types;
