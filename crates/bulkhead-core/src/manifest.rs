//! `package.yml` discovery and parsing.
//!
//! Each package declares itself with a manifest at its root. Discovery is
//! glob-driven: the caller supplies one include pattern for manifest paths
//! plus exclude patterns, both relative to the project root. Any malformed
//! manifest fails the whole load.

use std::collections::BTreeSet;
use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use walkdir::WalkDir;

use crate::package::{
    DependencyEnforcement, Package, PackageSet, PrivacyEnforcement, DEFAULT_PUBLIC_PATH,
    ROOT_PACKAGE_NAME,
};
use crate::types::ManifestError;

/// Conventional manifest filename.
pub const MANIFEST_FILENAME: &str = "package.yml";

/// Default include pattern for manifest discovery.
pub const DEFAULT_MANIFEST_GLOB: &str = "**/package.yml";

/// Raw deserialized shape of a `package.yml`.
///
/// `enforce_dependencies` accepts `true`, `false`, or `"strict"`;
/// `enforce_privacy` accepts `true`, `false`, or a list of constants.
/// Unknown keys are ignored so teams can carry their own metadata.
#[derive(Debug, Default, Deserialize)]
struct RawManifest {
    #[serde(default)]
    enforce_dependencies: Option<DependencySetting>,
    #[serde(default)]
    enforce_privacy: Option<PrivacySetting>,
    #[serde(default)]
    dependencies: Vec<String>,
    #[serde(default)]
    public_path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DependencySetting {
    Flag(bool),
    Mode(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PrivacySetting {
    Flag(bool),
    List(Vec<String>),
}

/// Discover and load every package manifest under `root`.
///
/// `manifest_glob` matches manifest file paths relative to `root` (see
/// [`DEFAULT_MANIFEST_GLOB`]); `exclude_globs` carve out vendored or
/// generated trees. When no manifest sits at the root itself, an implicit
/// permissive root package is synthesized so every file maps to a package.
pub fn load(
    root: &Path,
    manifest_glob: &str,
    exclude_globs: &[String],
) -> Result<PackageSet, ManifestError> {
    let include = Glob::new(manifest_glob)?.compile_matcher();
    let exclude = build_glob_set(exclude_globs)?;

    let mut packages = Vec::new();

    for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() || entry.file_name() != MANIFEST_FILENAME {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        let rel_str = rel.to_string_lossy().into_owned();
        if !include.is_match(&rel_str) || exclude.is_match(&rel_str) {
            continue;
        }

        packages.push(parse_manifest(entry.path(), &rel_str)?);
    }

    if !packages.iter().any(|p| p.is_root()) {
        packages.push(Package::permissive(ROOT_PACKAGE_NAME));
    }

    Ok(PackageSet::new(packages))
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, ManifestError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

fn parse_manifest(path: &Path, rel_path: &str) -> Result<Package, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: rel_path.to_string(),
        source,
    })?;

    // An empty manifest is a valid all-defaults package declaration.
    let raw: RawManifest = serde_yaml_ng::from_str::<Option<RawManifest>>(&content)
        .map_err(|source| ManifestError::Parse {
            path: rel_path.to_string(),
            source,
        })?
        .unwrap_or_default();

    let name = rel_path
        .strip_suffix(MANIFEST_FILENAME)
        .unwrap_or(rel_path)
        .trim_end_matches('/')
        .to_string();

    let enforce_dependencies = match raw.enforce_dependencies {
        None | Some(DependencySetting::Flag(false)) => DependencyEnforcement::Disabled,
        Some(DependencySetting::Flag(true)) => DependencyEnforcement::Enabled,
        Some(DependencySetting::Mode(mode)) if mode == "strict" => {
            DependencyEnforcement::Strict
        }
        Some(DependencySetting::Mode(mode)) => {
            return Err(ManifestError::InvalidSetting {
                path: rel_path.to_string(),
                message: format!(
                    "enforce_dependencies must be true, false, or \"strict\", got \"{mode}\""
                ),
            });
        }
    };

    let enforce_privacy = match raw.enforce_privacy {
        None | Some(PrivacySetting::Flag(false)) => PrivacyEnforcement::Disabled,
        Some(PrivacySetting::Flag(true)) => PrivacyEnforcement::All,
        Some(PrivacySetting::List(constants)) => {
            let normalized: BTreeSet<String> = constants
                .into_iter()
                .map(|c| {
                    if c.starts_with("::") {
                        c
                    } else {
                        format!("::{c}")
                    }
                })
                .collect();
            PrivacyEnforcement::ExplicitList(normalized)
        }
    };

    let public_path = raw
        .public_path
        .map(|p| p.trim_end_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_PUBLIC_PATH.to_string());

    Ok(Package {
        root: name.clone(),
        name,
        enforce_dependencies,
        enforce_privacy,
        dependencies: raw.dependencies.into_iter().collect(),
        public_path,
    })
}
