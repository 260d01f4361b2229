// Privacy enforcement across packages.

use bulkhead_core::types::ViolationKind;

use crate::common::{referencing_tree, TestProject};

fn sales_project() -> TestProject {
    let mut project = TestProject::new();
    project.package("components/sales", "enforce_privacy: true\n");
    project.package("components/timeline", "");
    project.defines("components/sales/app/models/sales/order.rb");
    project.defines("components/sales/app/public/sales/api.rb");
    project.load_path("components/sales/app/models");
    project.load_path("components/sales/app/public");
    project.load_path("components/timeline/app/models");
    project
}

#[test]
fn test_private_constant_reference_is_an_offense() {
    let mut project = sales_project();
    project.source(
        "components/timeline/app/models/timeline/entry.rb",
        referencing_tree("Timeline", "Entry", "::Sales::Order"),
    );

    let engine = project.engine();
    let result = engine.check_all(&project.provider, &project.files);

    assert_eq!(result.new_offenses.len(), 1);
    let offense = &result.new_offenses[0];
    assert_eq!(offense.kind, ViolationKind::Privacy);
    assert_eq!(offense.reference.constant.full_name, "::Sales::Order");
    assert_eq!(
        offense.reference.constant.relative_path,
        "components/sales/app/models/sales/order.rb"
    );
    assert!(offense
        .message
        .contains("'::Sales::Order' is private to 'components/sales'"));
}

#[test]
fn test_public_path_constant_is_not_an_offense() {
    let mut project = sales_project();
    project.source(
        "components/timeline/app/models/timeline/entry.rb",
        referencing_tree("Timeline", "Entry", "::Sales::Api"),
    );

    let engine = project.engine();
    let result = engine.check_all(&project.provider, &project.files);
    assert!(result.is_clean());
}

#[test]
fn test_same_package_reference_is_not_an_offense() {
    let mut project = sales_project();
    project.source(
        "components/sales/app/models/sales/invoice.rb",
        referencing_tree("Sales", "Invoice", "Sales::Order"),
    );

    let engine = project.engine();
    let result = engine.check_all(&project.provider, &project.files);
    assert!(result.is_clean());
}

#[test]
fn test_disabled_privacy_is_not_checked() {
    let mut project = sales_project();
    project.package("components/sales", "");
    project.source(
        "components/timeline/app/models/timeline/entry.rb",
        referencing_tree("Timeline", "Entry", "::Sales::Order"),
    );

    let engine = project.engine();
    let result = engine.check_all(&project.provider, &project.files);
    assert!(result.is_clean());
}

#[test]
fn test_explicit_private_list_covers_nested_constants() {
    let mut project = sales_project();
    project.package(
        "components/sales",
        "enforce_privacy:\n- \"::Sales::Order\"\n",
    );
    project.defines("components/sales/app/models/sales/order/line_item.rb");
    project.defines("components/sales/app/models/sales/invoice.rb");

    project.source(
        "components/timeline/app/models/timeline/entry.rb",
        referencing_tree("Timeline", "Entry", "::Sales::Order::LineItem"),
    );
    project.source(
        "components/timeline/app/models/timeline/summary.rb",
        referencing_tree("Timeline", "Summary", "::Sales::Invoice"),
    );

    let engine = project.engine();
    let result = engine.check_all(&project.provider, &project.files);

    // Only the listed subtree is private; Invoice is fair game.
    assert_eq!(result.new_offenses.len(), 1);
    assert_eq!(
        result.new_offenses[0].reference.constant.full_name,
        "::Sales::Order::LineItem"
    );
}
