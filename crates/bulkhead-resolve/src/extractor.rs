//! Namespace-aware reference extraction.
//!
//! Walks a file's syntax tree depth-first, tracking the lexical namespace
//! nesting, and yields one [`UnresolvedReference`] per constant use site.
//! Definition sites are never emitted — a `class Sales::Order` node
//! defines that constant rather than referencing it — and a qualified
//! chain like `A::B::C` is emitted once, from its root segment.

use bulkhead_core::types::SourceLocation;

use crate::index::push_segments;
use crate::tree::{Node, SyntaxTree};

/// One observed constant use site, not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedReference {
    /// The constant name as written (`Order`, `Sales::Order`, `::Order`).
    pub name: String,
    /// Lexical namespace nesting at the use site, outermost first.
    pub namespace_path: Vec<String>,
    pub location: SourceLocation,
}

/// Extract every constant use site in `tree`.
pub fn extract(tree: &SyntaxTree) -> Vec<UnresolvedReference> {
    let mut references = Vec::new();
    let mut namespace = Vec::new();
    for node in &tree.nodes {
        walk(node, &mut namespace, &mut references);
    }
    references
}

fn walk(node: &Node, namespace: &mut Vec<String>, out: &mut Vec<UnresolvedReference>) {
    match node {
        Node::ModuleDef { name, children, .. } => {
            let pushed = push_segments(namespace, name);
            for child in children {
                walk(child, namespace, out);
            }
            namespace.truncate(namespace.len() - pushed);
        }
        Node::ClassDef {
            name,
            superclass,
            children,
            ..
        } => {
            // The superclass expression is evaluated before the class
            // body opens, so it resolves in the enclosing scope.
            if let Some(sup) = superclass {
                walk(sup, namespace, out);
            }
            let pushed = push_segments(namespace, name);
            for child in children {
                walk(child, namespace, out);
            }
            namespace.truncate(namespace.len() - pushed);
        }
        Node::ConstantRef { name, location } => {
            out.push(UnresolvedReference {
                name: name.clone(),
                namespace_path: namespace.clone(),
                location: *location,
            });
        }
        Node::ConstantAssign { children, .. } => {
            // The assigned name is a definition site; only the
            // right-hand side can reference.
            for child in children {
                walk(child, namespace, out);
            }
        }
        Node::MethodCall { children, .. } | Node::Other { children } => {
            for child in children {
                walk(child, namespace, out);
            }
        }
        Node::Literal { .. } => {}
    }
}
