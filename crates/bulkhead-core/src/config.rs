//! Run configuration loading for bulkhead.
//!
//! Reads `bulkhead.yml` at the project root and provides typed access to
//! all settings. Falls back to sensible defaults when the config file is
//! missing or incomplete.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Top-level bulkhead run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Glob matching package manifest paths, relative to the project root.
    #[serde(default = "default_manifest_glob")]
    pub package_paths: String,
    /// Globs carved out of both manifest discovery and analysis.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
    /// Autoload roots searched by the constant resolver, in order.
    #[serde(default = "default_load_paths")]
    pub load_paths: Vec<String>,
    /// Optional path to an inflection-override document.
    #[serde(default)]
    pub inflections_file: Option<String>,
    /// Whether the per-file phase runs on the rayon pool.
    #[serde(default = "default_true")]
    pub parallel: bool,
}

fn default_manifest_glob() -> String {
    crate::manifest::DEFAULT_MANIFEST_GLOB.to_string()
}

fn default_exclude() -> Vec<String> {
    ["bin/**", "node_modules/**", "script/**", "tmp/**", "vendor/**"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_load_paths() -> Vec<String> {
    ["app/models", "app/services", "app/public", "lib"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_true() -> bool {
    true
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            package_paths: default_manifest_glob(),
            exclude: default_exclude(),
            load_paths: default_load_paths(),
            inflections_file: None,
            parallel: true,
        }
    }
}

impl RunConfig {
    /// Load configuration from `bulkhead.yml` inside `project_root`.
    /// Returns defaults if the file doesn't exist or can't be parsed.
    pub fn load(project_root: &Path) -> Self {
        let config_path = project_root.join("bulkhead.yml");
        let content = match std::fs::read_to_string(&config_path) {
            Ok(c) => c,
            Err(_) => return Self::default(),
        };
        match serde_yaml_ng::from_str::<Option<RunConfig>>(&content) {
            Ok(cfg) => cfg.unwrap_or_default(),
            Err(e) => {
                eprintln!(
                    "bulkhead: warning: failed to parse {}: {}, using defaults",
                    config_path.display(),
                    e
                );
                Self::default()
            }
        }
    }
}
