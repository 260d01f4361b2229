//! The per-run declaration index.
//!
//! A lightweight pre-scan over every analyzed tree, recording which files
//! declare which fully-qualified constants. The resolver consults it so a
//! "reopened namespace" file is only accepted as a definer when it
//! provably declares the constant in question. Built once per run, never
//! persisted.

use std::collections::{BTreeSet, HashMap};

use crate::tree::{Node, SyntaxTree};

#[derive(Debug, Default)]
pub struct DeclarationIndex {
    /// Fully-qualified constant name (`::A::B`) → files declaring it.
    declarations: HashMap<String, BTreeSet<String>>,
}

impl DeclarationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every constant declaration in `tree`.
    pub fn add_file(&mut self, path: &str, tree: &SyntaxTree) {
        let mut namespace = Vec::new();
        for node in &tree.nodes {
            self.scan(path, node, &mut namespace);
        }
    }

    /// Whether `file` declares `constant` (a `::`-qualified name).
    pub fn declares(&self, constant: &str, file: &str) -> bool {
        self.declarations
            .get(constant)
            .is_some_and(|files| files.contains(file))
    }

    /// All files declaring `constant`, if any.
    pub fn files_declaring(&self, constant: &str) -> Option<&BTreeSet<String>> {
        self.declarations.get(constant)
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    fn scan(&mut self, path: &str, node: &Node, namespace: &mut Vec<String>) {
        match node {
            Node::ModuleDef { name, children, .. }
            | Node::ClassDef { name, children, .. } => {
                let segments = push_segments(namespace, name);
                self.record(path, namespace);
                for child in children {
                    self.scan(path, child, namespace);
                }
                namespace.truncate(namespace.len() - segments);
            }
            Node::ConstantAssign { name, children, .. } => {
                namespace.push(name.clone());
                self.record(path, namespace);
                namespace.pop();
                for child in children {
                    self.scan(path, child, namespace);
                }
            }
            Node::MethodCall { children, .. } | Node::Other { children } => {
                for child in children {
                    self.scan(path, child, namespace);
                }
            }
            Node::ConstantRef { .. } | Node::Literal { .. } => {}
        }
    }

    fn record(&mut self, path: &str, namespace: &[String]) {
        let full = format!("::{}", namespace.join("::"));
        self.declarations
            .entry(full)
            .or_default()
            .insert(path.to_string());
    }
}

/// Push each `::` segment of a possibly-compact definition name
/// (`A::B`), returning how many were pushed.
pub(crate) fn push_segments(namespace: &mut Vec<String>, name: &str) -> usize {
    let mut count = 0;
    for segment in name.split("::").filter(|s| !s.is_empty()) {
        namespace.push(segment.to_string());
        count += 1;
    }
    count
}
