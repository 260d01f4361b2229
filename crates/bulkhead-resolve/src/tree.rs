//! The generic syntax tree consumed from external parser front ends.
//!
//! Bulkhead never parses source text itself. A front end hands it one
//! [`SyntaxTree`] per file through the [`TreeProvider`] seam; the tree
//! carries only the node kinds boundary analysis needs.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use bulkhead_core::types::SourceLocation;

/// One node of the generic tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// `module A` or the compact `module A::B`.
    ModuleDef {
        name: String,
        #[serde(default)]
        children: Vec<Node>,
        location: SourceLocation,
    },
    /// `class C < Super`. The superclass expression, when present, is a
    /// constant use site in the scope *enclosing* the class.
    ClassDef {
        name: String,
        #[serde(default)]
        superclass: Option<Box<Node>>,
        #[serde(default)]
        children: Vec<Node>,
        location: SourceLocation,
    },
    /// A constant use site, possibly qualified (`A::B::C`) or
    /// root-qualified (`::A`).
    ConstantRef { name: String, location: SourceLocation },
    /// `NAME = expr`. Defines `NAME`; only the right-hand side is walked
    /// for references.
    ConstantAssign {
        name: String,
        #[serde(default)]
        children: Vec<Node>,
        location: SourceLocation,
    },
    /// A method call; receiver and arguments appear as children.
    MethodCall {
        name: String,
        #[serde(default)]
        children: Vec<Node>,
        location: SourceLocation,
    },
    /// A literal; never contains references.
    Literal { location: SourceLocation },
    /// Any other construct whose children are still worth walking.
    Other {
        #[serde(default)]
        children: Vec<Node>,
    },
}

/// The parse result for one file: the file's top-level nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyntaxTree {
    pub nodes: Vec<Node>,
}

impl SyntaxTree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }
}

/// A file the front end could not parse. Reported as a diagnostic next
/// to the offense set; never aborts the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseDiagnostic {
    pub file: String,
    pub message: String,
}

/// Source of syntax trees, one per analyzed file.
///
/// Implementors must be `Send + Sync` so the per-file phase can run on
/// the rayon pool.
pub trait TreeProvider: Send + Sync {
    /// Produce the tree for `path` (project-root relative).
    fn tree_for(&self, path: &str) -> Result<SyntaxTree, ParseDiagnostic>;
}

/// In-memory provider, for embedding bulkhead behind a front end that
/// already holds its trees (and for tests).
#[derive(Debug, Default)]
pub struct MapTreeProvider {
    trees: HashMap<String, SyntaxTree>,
    failures: HashMap<String, String>,
}

impl MapTreeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &str, tree: SyntaxTree) {
        self.trees.insert(path.to_string(), tree);
    }

    /// Register `path` as unparseable with the given message.
    pub fn fail(&mut self, path: &str, message: &str) {
        self.failures.insert(path.to_string(), message.to_string());
    }
}

impl TreeProvider for MapTreeProvider {
    fn tree_for(&self, path: &str) -> Result<SyntaxTree, ParseDiagnostic> {
        if let Some(message) = self.failures.get(path) {
            return Err(ParseDiagnostic {
                file: path.to_string(),
                message: message.clone(),
            });
        }
        match self.trees.get(path) {
            Some(tree) => Ok(tree.clone()),
            None => Err(ParseDiagnostic {
                file: path.to_string(),
                message: "no syntax tree supplied for file".to_string(),
            }),
        }
    }
}

/// One entry of a tree-dump document: a parsed tree, or the front end's
/// failure message for the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum DumpEntry {
    Failure { error: String },
    Tree(SyntaxTree),
}

/// Provider backed by a tree-dump JSON document: an object mapping each
/// file path to its [`SyntaxTree`], or to `{"error": "..."}` for files
/// the front end failed to parse.
#[derive(Debug)]
pub struct JsonTreeProvider {
    entries: HashMap<String, DumpEntry>,
}

impl JsonTreeProvider {
    pub fn from_str(document: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            entries: serde_json::from_str(document)?,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content).map_err(std::io::Error::other)
    }
}

impl TreeProvider for JsonTreeProvider {
    fn tree_for(&self, path: &str) -> Result<SyntaxTree, ParseDiagnostic> {
        match self.entries.get(path) {
            Some(DumpEntry::Tree(tree)) => Ok(tree.clone()),
            Some(DumpEntry::Failure { error }) => Err(ParseDiagnostic {
                file: path.to_string(),
                message: error.clone(),
            }),
            None => Err(ParseDiagnostic {
                file: path.to_string(),
                message: "file missing from tree dump".to_string(),
            }),
        }
    }
}
