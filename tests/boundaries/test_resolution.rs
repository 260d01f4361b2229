// End-to-end resolution behavior observed through offense results.

use crate::common::{referencing_tree, TestProject};

#[test]
fn test_innermost_namespace_wins_over_outer_package() {
    let mut project = TestProject::new();
    project.package("components/timeline", "enforce_dependencies: true\n");
    project.package("components/sales", "");
    // ::Order lives in sales; ::Timeline::Order lives in timeline.
    project.defines("components/sales/app/models/order.rb");
    project.defines("components/timeline/app/models/timeline/order.rb");
    project.load_path("components/sales/app/models");
    project.load_path("components/timeline/app/models");

    // Inside Timeline, a bare `Order` is ::Timeline::Order — a
    // same-package reference, not a dependency violation against sales.
    project.source(
        "components/timeline/app/models/timeline/entry.rb",
        referencing_tree("Timeline", "Entry", "Order"),
    );

    let engine = project.engine();
    let result = engine.check_all(&project.provider, &project.files);
    assert!(result.is_clean());
}

#[test]
fn test_root_marker_escapes_the_namespace() {
    let mut project = TestProject::new();
    project.package("components/timeline", "enforce_dependencies: true\n");
    project.package("components/sales", "");
    project.defines("components/sales/app/models/order.rb");
    project.defines("components/timeline/app/models/timeline/order.rb");
    project.load_path("components/sales/app/models");
    project.load_path("components/timeline/app/models");

    project.source(
        "components/timeline/app/models/timeline/entry.rb",
        referencing_tree("Timeline", "Entry", "::Order"),
    );

    let engine = project.engine();
    let result = engine.check_all(&project.provider, &project.files);

    // `::Order` skips ::Timeline::Order and lands in sales.
    assert_eq!(result.new_offenses.len(), 1);
    assert_eq!(result.new_offenses[0].reference.constant.full_name, "::Order");
    assert_eq!(
        result.new_offenses[0]
            .reference
            .constant
            .package_name
            .as_deref(),
        Some("components/sales")
    );
}

#[test]
fn test_unresolvable_constant_is_excluded_from_checking() {
    let mut project = TestProject::new();
    project.package("components/timeline", "enforce_dependencies: true\n");
    project.load_path("components/timeline/app/models");

    project.source(
        "components/timeline/app/models/timeline/entry.rb",
        referencing_tree("Timeline", "Entry", "DefinedByMetaprogramming"),
    );

    let engine = project.engine();
    let result = engine.check_all(&project.provider, &project.files);

    // Unresolved is not an error and not an offense.
    assert!(result.is_clean());
    assert!(result.reference_offenses.is_empty());
}

#[test]
fn test_reopened_namespace_resolves_via_declaration_scan() {
    let mut project = TestProject::new();
    project.package("components/timeline", "enforce_dependencies: true\n");
    project.package("components/sales", "");
    project.load_path("components/sales/app/models");
    project.load_path("components/timeline/app/models");

    // sales.rb reopens Sales and declares STATUSES inline; there is no
    // sales/statuses.rb. The declaration pre-scan over analyzed trees
    // lets the resolver attribute ::Sales::STATUSES to sales.rb.
    project.source(
        "components/sales/app/models/sales.rb",
        crate::common::constant_defining_tree("Sales", "STATUSES"),
    );
    project.source(
        "components/timeline/app/models/timeline/entry.rb",
        referencing_tree("Timeline", "Entry", "Sales::STATUSES"),
    );

    let engine = project.engine();
    let result = engine.check_all(&project.provider, &project.files);

    assert_eq!(result.new_offenses.len(), 1);
    let offense = &result.new_offenses[0];
    assert_eq!(offense.reference.constant.full_name, "::Sales::STATUSES");
    assert_eq!(
        offense.reference.constant.relative_path,
        "components/sales/app/models/sales.rb"
    );
}

#[test]
fn test_files_outside_declared_packages_belong_to_root() {
    let mut project = TestProject::new();
    project.package("components/sales", "enforce_privacy: true\n");
    project.defines("components/sales/app/models/sales/order.rb");
    project.load_path("components/sales/app/models");
    project.load_path("lib");

    // A script outside every component belongs to the (permissive) root
    // package, so the privacy offense attributes to root as source.
    project.source(
        "lib/tasks/report.rb",
        referencing_tree("Tasks", "Report", "::Sales::Order"),
    );

    let engine = project.engine();
    let result = engine.check_all(&project.provider, &project.files);

    assert_eq!(result.new_offenses.len(), 1);
    assert_eq!(
        result.new_offenses[0].reference.source_package.as_deref(),
        Some("")
    );
}
