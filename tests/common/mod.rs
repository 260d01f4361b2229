/// Shared test helpers for all bulkhead integration tests.
///
/// Import from any integration test file with:
///   `#[path = "common/mod.rs"] mod common;`
use std::fs;
use std::path::Path;

use tempfile::TempDir;

use bulkhead_core::config::RunConfig;
use bulkhead_core::manifest;
use bulkhead_core::types::SourceLocation;
use bulkhead_enforce::engine::BoundaryEngine;
use bulkhead_resolve::inflector::Inflector;
use bulkhead_resolve::tree::{MapTreeProvider, Node, SyntaxTree};

/// A scratch project: manifests and source files on disk, syntax trees
/// in an in-memory provider.
///
/// Hold the struct to keep the temp directory alive.
pub struct TestProject {
    pub dir: TempDir,
    pub provider: MapTreeProvider,
    pub files: Vec<String>,
    pub load_paths: Vec<String>,
}

#[allow(dead_code)]
impl TestProject {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.yml"), "").unwrap();
        Self {
            dir,
            provider: MapTreeProvider::new(),
            files: Vec::new(),
            load_paths: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file (creating parent directories) at a project-relative
    /// path.
    pub fn write(&self, rel: &str, content: &str) {
        let path = self.root().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// Declare a package by writing its `package.yml`.
    pub fn package(&self, package_dir: &str, manifest_content: &str) {
        let rel = if package_dir.is_empty() {
            "package.yml".to_string()
        } else {
            format!("{package_dir}/package.yml")
        };
        self.write(&rel, manifest_content);
    }

    /// Register a defining file: it exists on disk (for the resolver)
    /// but is not part of the analyzed file list.
    pub fn defines(&self, rel: &str) {
        self.write(rel, "");
    }

    /// Register an analyzed source file with its syntax tree. The file
    /// also exists on disk so constants it defines resolve.
    pub fn source(&mut self, rel: &str, tree: SyntaxTree) {
        self.write(rel, "");
        self.provider.insert(rel, tree);
        self.files.push(rel.to_string());
    }

    pub fn load_path(&mut self, path: &str) {
        self.load_paths.push(path.to_string());
    }

    /// Build an engine over the current on-disk manifests.
    pub fn engine(&self) -> BoundaryEngine {
        let packages =
            manifest::load(self.root(), manifest::DEFAULT_MANIFEST_GLOB, &[]).unwrap();
        let config = RunConfig {
            load_paths: self.load_paths.clone(),
            parallel: false,
            ..Default::default()
        };
        BoundaryEngine::new(self.root(), packages, &config, Inflector::default())
    }
}

#[allow(dead_code)]
pub fn loc(line: u32, column: u32) -> SourceLocation {
    SourceLocation::new(line, column)
}

#[allow(dead_code)]
pub fn module(name: &str, children: Vec<Node>) -> Node {
    Node::ModuleDef {
        name: name.to_string(),
        children,
        location: loc(1, 0),
    }
}

#[allow(dead_code)]
pub fn class(name: &str, children: Vec<Node>) -> Node {
    Node::ClassDef {
        name: name.to_string(),
        superclass: None,
        children,
        location: loc(1, 0),
    }
}

#[allow(dead_code)]
pub fn const_ref(name: &str, line: u32) -> Node {
    Node::ConstantRef {
        name: name.to_string(),
        location: loc(line, 4),
    }
}

/// A tree for `module <namespace>; class <class>; <target>; end; end`.
#[allow(dead_code)]
pub fn referencing_tree(namespace: &str, class_name: &str, target: &str) -> SyntaxTree {
    SyntaxTree::new(vec![module(
        namespace,
        vec![class(class_name, vec![const_ref(target, 3)])],
    )])
}

/// A tree defining `module <namespace>; class <class>; end; end` with
/// no references.
#[allow(dead_code)]
pub fn defining_tree(namespace: &str, class_name: &str) -> SyntaxTree {
    SyntaxTree::new(vec![module(namespace, vec![class(class_name, vec![])])])
}

/// A tree for `module <namespace>; <constant> = ...; end`.
#[allow(dead_code)]
pub fn constant_defining_tree(namespace: &str, constant: &str) -> SyntaxTree {
    SyntaxTree::new(vec![module(
        namespace,
        vec![Node::ConstantAssign {
            name: constant.to_string(),
            children: vec![Node::Literal { location: loc(2, 14) }],
            location: loc(2, 2),
        }],
    )])
}
