use serde::{Deserialize, Serialize};

/// Kinds of boundary violation a checker can report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Privacy,
    Dependency,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::Privacy => "privacy",
            ViolationKind::Dependency => "dependency",
        }
    }

    /// Parse a ledger violation string. Unknown strings are `None` so a
    /// hand-edited ledger never panics the run.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "privacy" => Some(ViolationKind::Privacy),
            "dependency" => Some(ViolationKind::Dependency),
            _ => None,
        }
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A position within a source file (1-based line, 0-based column).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Errors raised while loading package manifests.
///
/// Any of these is fatal for the whole run: package semantics cannot be
/// trusted once a manifest fails to load.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed package manifest {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("invalid setting in {path}: {message}")]
    InvalidSetting { path: String, message: String },

    #[error("invalid package path pattern: {0}")]
    Pattern(#[from] globset::Error),

    #[error("package '{package}' declares a dependency on unknown package '{dependency}'")]
    UnknownDependency { package: String, dependency: String },
}
