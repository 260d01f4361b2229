// Determinism and idempotence of ledger serialization.

use bulkhead_enforce::ledger::TODO_FILENAME;

use crate::common::{referencing_tree, TestProject};

fn project_with_two_violations() -> TestProject {
    let mut project = TestProject::new();
    project.package("components/sales", "enforce_privacy: true\n");
    project.package("components/billing", "enforce_privacy: true\n");
    project.package("components/timeline", "enforce_dependencies: true\n");
    project.defines("components/sales/app/models/sales/order.rb");
    project.defines("components/billing/app/models/billing/invoice.rb");
    project.load_path("components/sales/app/models");
    project.load_path("components/billing/app/models");
    project.load_path("components/timeline/app/models");
    project.source(
        "components/timeline/app/models/timeline/entry.rb",
        referencing_tree("Timeline", "Entry", "::Sales::Order"),
    );
    project.source(
        "components/timeline/app/models/timeline/charge.rb",
        referencing_tree("Timeline", "Charge", "::Billing::Invoice"),
    );
    project
}

#[test]
fn test_identical_violation_set_produces_byte_identical_ledgers() {
    let project = project_with_two_violations();
    let engine = project.engine();
    let ledger_path = project
        .root()
        .join("components/timeline")
        .join(TODO_FILENAME);

    let result = engine.check_all(&project.provider, &project.files);
    engine.update_ledgers(&result).unwrap();
    let first = std::fs::read_to_string(&ledger_path).unwrap();

    // A fresh engine recomputing the identical violation set must
    // rewrite the identical bytes.
    let engine = project.engine();
    let result = engine.check_all(&project.provider, &project.files);
    engine.update_ledgers(&result).unwrap();
    let second = std::fs::read_to_string(&ledger_path).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_destinations_and_files_are_sorted() {
    let project = project_with_two_violations();
    let engine = project.engine();

    let result = engine.check_all(&project.provider, &project.files);
    engine.update_ledgers(&result).unwrap();

    let raw = std::fs::read_to_string(
        project
            .root()
            .join("components/timeline")
            .join(TODO_FILENAME),
    )
    .unwrap();

    // billing sorts before sales regardless of discovery order.
    let billing_at = raw.find("components/billing:").unwrap();
    let sales_at = raw.find("components/sales:").unwrap();
    assert!(billing_at < sales_at);
}

#[test]
fn test_file_order_in_analysis_does_not_change_the_ledger() {
    let project = project_with_two_violations();
    let engine = project.engine();
    let ledger_path = project
        .root()
        .join("components/timeline")
        .join(TODO_FILENAME);

    let result = engine.check_all(&project.provider, &project.files);
    engine.update_ledgers(&result).unwrap();
    let forward = std::fs::read_to_string(&ledger_path).unwrap();

    let mut reversed_files = project.files.clone();
    reversed_files.reverse();
    let result = engine.check_all(&project.provider, &reversed_files);
    engine.update_ledgers(&result).unwrap();
    let reversed = std::fs::read_to_string(&ledger_path).unwrap();

    assert_eq!(forward, reversed);
}
