//! Boundary checkers.
//!
//! Each checker is a stateless predicate over a resolved reference plus
//! package configuration. The checker list is fixed at engine
//! construction; adding a new boundary kind means implementing this
//! trait, not registering into a global.

use bulkhead_core::package::PackageSet;
use bulkhead_core::types::ViolationKind;

use crate::types::Reference;

/// The two-method checker contract.
///
/// Checkers are independent: every checker runs for every reference, so
/// a single reference can violate several boundaries at once.
pub trait Checker: Send + Sync {
    fn violation_kind(&self) -> ViolationKind;

    /// Whether `reference` violates this checker's boundary.
    fn invalid_reference(&self, reference: &Reference, packages: &PackageSet) -> bool;

    /// Human-readable message for an offense on `reference`.
    fn message(&self, reference: &Reference, packages: &PackageSet) -> String;
}

/// Flags references to non-public constants from outside the defining
/// package, when the defining package enforces privacy.
pub struct PrivacyChecker;

impl Checker for PrivacyChecker {
    fn violation_kind(&self) -> ViolationKind {
        ViolationKind::Privacy
    }

    fn invalid_reference(&self, reference: &Reference, packages: &PackageSet) -> bool {
        let Some(destination_name) = &reference.constant.package_name else {
            return false;
        };
        let Some(source_name) = &reference.source_package else {
            return false;
        };
        if destination_name == source_name {
            return false;
        }
        if reference.constant.public {
            return false;
        }
        let Some(destination) = packages.get(destination_name) else {
            return false;
        };
        destination
            .enforce_privacy
            .covers(&reference.constant.full_name)
    }

    fn message(&self, reference: &Reference, packages: &PackageSet) -> String {
        let destination = reference.constant.package_name.as_deref().unwrap_or("");
        let source = reference.source_package.as_deref().unwrap_or("");
        let public_path = packages
            .get(destination)
            .map(|p| {
                if p.root.is_empty() {
                    format!("{}/", p.public_path)
                } else {
                    format!("{}/{}/", p.root, p.public_path)
                }
            })
            .unwrap_or_default();
        format!(
            "Privacy violation: '{}' is private to '{}' but referenced from '{}'.\n\
             Is there a public entrypoint in '{}' that you can use instead?",
            reference.constant.full_name, destination, source, public_path
        )
    }
}

/// Flags references into packages the source package does not declare a
/// dependency on, when the source package enforces dependencies.
pub struct DependencyChecker;

impl Checker for DependencyChecker {
    fn violation_kind(&self) -> ViolationKind {
        ViolationKind::Dependency
    }

    fn invalid_reference(&self, reference: &Reference, packages: &PackageSet) -> bool {
        let Some(destination_name) = &reference.constant.package_name else {
            return false;
        };
        let Some(source_name) = &reference.source_package else {
            return false;
        };
        if destination_name == source_name {
            return false;
        }
        let Some(source) = packages.get(source_name) else {
            return false;
        };
        source.enforce_dependencies.is_enabled()
            && !source.has_dependency_on(destination_name)
    }

    fn message(&self, reference: &Reference, _packages: &PackageSet) -> String {
        let destination = reference.constant.package_name.as_deref().unwrap_or("");
        let source = reference.source_package.as_deref().unwrap_or("");
        format!(
            "Dependency violation: {} belongs to '{}', but '{}' does not specify a \
             dependency on '{}'.",
            reference.constant.full_name, destination, source, destination
        )
    }
}

/// The default checker list.
pub fn default_checkers() -> Vec<Box<dyn Checker>> {
    vec![Box::new(PrivacyChecker), Box::new(DependencyChecker)]
}
