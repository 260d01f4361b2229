//! Load-path constant resolution.
//!
//! Mirrors the target language's nested-namespace lookup statically:
//! candidate namespaces are tried innermost-first, each candidate's
//! fully-qualified name is converted to a conventional file path, and
//! the configured load paths are searched in declared order. A file
//! matching only a prefix of the name's segments (a reopened namespace)
//! is accepted as definer only when the declaration index confirms it
//! declares that exact constant.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::index::DeclarationIndex;
use crate::inflector::Inflector;

/// Conventional source extension of the analyzed language.
const SOURCE_EXTENSION: &str = "rb";

/// A successfully resolved constant: its canonical name and the file
/// that must define it, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedConstant {
    /// Root-qualified name, e.g. `::Sales::Order`.
    pub full_name: String,
    pub relative_path: String,
}

/// Run-scoped constant resolver.
///
/// Resolution failures are not errors — `None` means "cannot statically
/// determine ownership" and callers skip the reference. Results are
/// memoized per `(name, namespace_path)`; the cache lives for one run
/// only, since source may change between runs.
pub struct ConstantResolver {
    project_root: PathBuf,
    load_paths: Vec<String>,
    inflector: Inflector,
    index: DeclarationIndex,
    #[allow(clippy::type_complexity)]
    cache: RwLock<HashMap<(String, Vec<String>), Option<ResolvedConstant>>>,
}

impl ConstantResolver {
    pub fn new(
        project_root: &Path,
        load_paths: Vec<String>,
        inflector: Inflector,
        index: DeclarationIndex,
    ) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            load_paths,
            inflector,
            index,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn index(&self) -> &DeclarationIndex {
        &self.index
    }

    /// Resolve `name` as seen from inside `namespace_path` (outermost
    /// first, innermost last).
    pub fn resolve(
        &self,
        name: &str,
        namespace_path: &[String],
    ) -> Option<ResolvedConstant> {
        let key = (name.to_string(), namespace_path.to_vec());
        if let Ok(cache) = self.cache.read() {
            if let Some(hit) = cache.get(&key) {
                return hit.clone();
            }
        }

        let result = self.resolve_uncached(name, namespace_path);

        if let Ok(mut cache) = self.cache.write() {
            cache.insert(key, result.clone());
        }
        result
    }

    fn resolve_uncached(
        &self,
        name: &str,
        namespace_path: &[String],
    ) -> Option<ResolvedConstant> {
        // A root-qualified name pins the search to the top level.
        if let Some(stripped) = name.strip_prefix("::") {
            return self.resolve_at(&[], stripped);
        }

        // Innermost enclosing namespace first, walking outward. A match
        // at depth d is final; shallower matches never override it.
        for depth in (0..=namespace_path.len()).rev() {
            if let Some(found) = self.resolve_at(&namespace_path[..depth], name) {
                return Some(found);
            }
        }
        None
    }

    fn resolve_at(&self, namespace: &[String], name: &str) -> Option<ResolvedConstant> {
        let mut segments: Vec<String> = namespace.to_vec();
        segments.extend(
            name.split("::")
                .filter(|s| !s.is_empty())
                .map(String::from),
        );
        if segments.is_empty() {
            return None;
        }
        let full_name = format!("::{}", segments.join("::"));

        // Exact segment path; load paths in declared order, first wins.
        for load_path in &self.load_paths {
            if let Some(path) = self.find_file(load_path, &segments) {
                return Some(ResolvedConstant {
                    full_name,
                    relative_path: path,
                });
            }
        }

        // Reopened namespace: a prefix of the segments may name the
        // file, but it only counts as definer when the declaration
        // index confirms the file declares this exact constant.
        for prefix_len in (1..segments.len()).rev() {
            for load_path in &self.load_paths {
                if let Some(path) = self.find_file(load_path, &segments[..prefix_len]) {
                    if self.index.declares(&full_name, &path) {
                        return Some(ResolvedConstant {
                            full_name,
                            relative_path: path,
                        });
                    }
                }
            }
        }

        None
    }

    /// Search one load path for the file conventionally defining the
    /// constant named by `segments`. Container directories that do not
    /// exist under their singular name are retried pluralized, covering
    /// namespace directories that aggregate many leaf definitions.
    fn find_file(&self, load_path: &str, segments: &[String]) -> Option<String> {
        let (last, dirs) = segments.split_last()?;
        let file_name = format!("{}.{}", self.inflector.underscore(last), SOURCE_EXTENSION);
        let root = self.project_root.join(load_path);
        self.descend(&root, load_path, dirs, &file_name)
    }

    fn descend(
        &self,
        dir: &Path,
        rel: &str,
        dirs: &[String],
        file_name: &str,
    ) -> Option<String> {
        let Some((head, tail)) = dirs.split_first() else {
            let candidate = dir.join(file_name);
            return candidate.is_file().then(|| format!("{rel}/{file_name}"));
        };

        let singular = self.inflector.underscore(head);
        let plural = self.inflector.pluralize(&singular);

        let mut names = vec![singular];
        if plural != names[0] {
            names.push(plural);
        }

        for name in names {
            let sub = dir.join(&name);
            if sub.is_dir() {
                if let Some(found) =
                    self.descend(&sub, &format!("{rel}/{name}"), tail, file_name)
                {
                    return Some(found);
                }
            }
        }
        None
    }
}
