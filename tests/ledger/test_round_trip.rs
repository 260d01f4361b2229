// Check → update → recheck reconciliation.

use bulkhead_enforce::ledger::{PackageTodo, TODO_FILENAME};

use crate::common::{referencing_tree, TestProject};

/// Timeline references ::Sales::Order without declaring the dependency.
fn violating_project() -> TestProject {
    let mut project = TestProject::new();
    project.package("components/sales", "");
    project.package("components/timeline", "enforce_dependencies: true\n");
    project.defines("components/sales/app/models/sales/order.rb");
    project.load_path("components/sales/app/models");
    project.load_path("components/timeline/app/models");
    project.source(
        "components/timeline/app/models/timeline/entry.rb",
        referencing_tree("Timeline", "Entry", "::Sales::Order"),
    );
    project
}

#[test]
fn test_update_then_recheck_is_clean() {
    let project = violating_project();
    let engine = project.engine();

    let first = engine.check_all(&project.provider, &project.files);
    assert_eq!(first.new_offenses.len(), 1);

    engine.update_ledgers(&first).unwrap();

    // Same source, new run: the violation is listed, so it is
    // suppressed from the new set but still recomputed.
    let second = engine.check_all(&project.provider, &project.files);
    assert!(second.new_offenses.is_empty());
    assert_eq!(second.reference_offenses.len(), 1);
    assert!(second.is_clean());
    assert!(!engine.stale(&second).unwrap());
}

#[test]
fn test_normal_check_never_writes_the_ledger() {
    let project = violating_project();
    let engine = project.engine();

    let ledger_path = project
        .root()
        .join("components/timeline")
        .join(TODO_FILENAME);

    let result = engine.check_all(&project.provider, &project.files);
    assert!(!ledger_path.exists());

    engine.update_ledgers(&result).unwrap();
    let written = std::fs::read_to_string(&ledger_path).unwrap();

    // Re-checking leaves the bytes alone.
    let _ = engine.check_all(&project.provider, &project.files);
    assert_eq!(std::fs::read_to_string(&ledger_path).unwrap(), written);
}

#[test]
fn test_ledger_document_shape() {
    let project = violating_project();
    let engine = project.engine();

    let result = engine.check_all(&project.provider, &project.files);
    engine.update_ledgers(&result).unwrap();

    let timeline = engine.packages().get("components/timeline").unwrap();
    let ledger = PackageTodo::load(project.root(), timeline).unwrap();
    assert!(ledger.listed(
        "components/sales",
        "::Sales::Order",
        bulkhead_core::types::ViolationKind::Dependency,
        "components/timeline/app/models/timeline/entry.rb",
    ));

    let raw = std::fs::read_to_string(
        project
            .root()
            .join("components/timeline")
            .join(TODO_FILENAME),
    )
    .unwrap();
    assert!(raw.contains("components/sales:"));
    assert!(raw.contains("::Sales::Order"));
    assert!(raw.contains("- dependency"));
    assert!(raw.contains("- components/timeline/app/models/timeline/entry.rb"));
}

#[test]
fn test_strict_enforcement_reports_listed_offenses() {
    let project = violating_project();
    let engine = project.engine();
    let first = engine.check_all(&project.provider, &project.files);
    engine.update_ledgers(&first).unwrap();

    // Flip timeline to strict: the ledgered violation fails the run
    // again.
    project.package(
        "components/timeline",
        "enforce_dependencies: strict\n",
    );
    let strict_engine = project.engine();
    let result = strict_engine.check_all(&project.provider, &project.files);
    assert_eq!(result.new_offenses.len(), 1);
    assert!(!result.is_clean());
}
