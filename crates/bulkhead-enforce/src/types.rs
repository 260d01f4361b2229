use serde::{Deserialize, Serialize};

use bulkhead_core::types::{SourceLocation, ViolationKind};

/// The resolved destination side of a reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckedConstant {
    /// Root-qualified name, e.g. `::Sales::Order`.
    pub full_name: String,
    /// Defining file, relative to the project root.
    pub relative_path: String,
    /// Owning package. `None` when the defining file lies outside every
    /// declared package root; such references are skipped by checkers.
    pub package_name: Option<String>,
    /// Whether the defining file lies under the owning package's public
    /// path.
    pub public: bool,
}

/// One observed use of a constant, fully resolved and attributed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Package owning the referencing file.
    pub source_package: Option<String>,
    /// Referencing file, relative to the project root.
    pub source_file: String,
    pub location: SourceLocation,
    pub constant: CheckedConstant,
}

/// A reference that violates a boundary check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceOffense {
    pub reference: Reference,
    pub kind: ViolationKind,
    pub message: String,
}

impl ReferenceOffense {
    pub fn location(&self) -> SourceLocation {
        self.reference.location
    }

    pub fn file(&self) -> &str {
        &self.reference.source_file
    }
}

/// A file-level diagnostic that is not a boundary offense — typically a
/// file the front end could not parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileOffense {
    pub file: String,
    pub message: String,
}

/// Everything one analysis run produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Every boundary offense recomputed this run, whether or not a
    /// ledger already accepts it. Input to ledger update and staleness.
    pub reference_offenses: Vec<ReferenceOffense>,
    /// Offenses not accepted by any ledger (plus all offenses of
    /// strict-enforcing source packages). These fail the run.
    pub new_offenses: Vec<ReferenceOffense>,
    /// Non-offense diagnostics. These also fail the run.
    pub errors: Vec<FileOffense>,
    /// Files this run actually analyzed; ledger reconciliation never
    /// reaches beyond this set.
    pub analyzed_files: Vec<String>,
}

impl RunResult {
    /// A run with zero new offenses and zero errors exits successfully.
    pub fn is_clean(&self) -> bool {
        self.new_offenses.is_empty() && self.errors.is_empty()
    }
}
