//! Word-form and case-boundary transforms.
//!
//! The target language locates a constant's defining file by naming
//! convention, so the resolver needs the same pluralization and
//! camel-case/snake-case conversions the language's autoloader applies.
//! Everything here is a pure text transform: deterministic, no I/O.

mod rules;

use std::collections::{HashMap, HashSet};
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

/// A single regex transform: first matching pattern wins, `${n}` groups
/// in the replacement.
#[derive(Debug, Clone)]
struct Rule {
    pattern: Regex,
    replacement: String,
}

impl Rule {
    fn compile(pattern: &str, replacement: &str) -> Result<Self, InflectionError> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            replacement: replacement.to_string(),
        })
    }

    fn apply(&self, word: &str) -> Option<String> {
        if self.pattern.is_match(word) {
            Some(self.pattern.replace(word, self.replacement.as_str()).into_owned())
        } else {
            None
        }
    }
}

/// Caller-supplied additions layered on top of the built-in tables,
/// loadable from an `inflections.yml` document:
///
/// ```yaml
/// acronym: [API, HTTP]
/// irregular:
/// - [octopus, octopodes]
/// uncountable: [sheep_data]
/// plural:
/// - ["(?i)(ba)$", "${1}es"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InflectionOverrides {
    #[serde(default)]
    pub plural: Vec<(String, String)>,
    #[serde(default)]
    pub singular: Vec<(String, String)>,
    /// Pairs of (singular, plural); exact match beats every regex rule.
    #[serde(default)]
    pub irregular: Vec<(String, String)>,
    #[serde(default)]
    pub uncountable: Vec<String>,
    /// Cased acronym forms (e.g. `API`); affects case folding only,
    /// never pluralization.
    #[serde(default)]
    pub acronym: Vec<String>,
}

impl InflectionOverrides {
    pub fn from_str(document: &str) -> Result<Self, InflectionError> {
        Ok(serde_yaml_ng::from_str::<Option<Self>>(document)?.unwrap_or_default())
    }

    pub fn from_path(path: &Path) -> Result<Self, InflectionError> {
        let content = std::fs::read_to_string(path).map_err(|source| InflectionError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_str(&content)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InflectionError {
    #[error("invalid inflection rule pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("failed to read inflections file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed inflections document: {0}")]
    Parse(#[from] serde_yaml_ng::Error),
}

/// The inflection engine: rule tables plus the three override tables.
#[derive(Debug, Clone)]
pub struct Inflector {
    plural_rules: Vec<Rule>,
    singular_rules: Vec<Rule>,
    irregular_plural: HashMap<String, String>,
    irregular_singular: HashMap<String, String>,
    uncountable: HashSet<String>,
    /// downcased acronym → cased form
    acronyms: HashMap<String, String>,
    camel_boundary: Regex,
    snake_boundary: Regex,
}

impl Default for Inflector {
    fn default() -> Self {
        // Built-in tables are compile-checked by the test suite; failure
        // here means a broken source tree, not bad user input.
        Self::with_overrides(&InflectionOverrides::default())
            .expect("built-in inflection rules must compile")
    }
}

impl Inflector {
    /// Build an engine with `overrides` layered on top of the defaults.
    /// Override rules are tried before built-in rules, in declaration
    /// order.
    pub fn with_overrides(overrides: &InflectionOverrides) -> Result<Self, InflectionError> {
        let mut plural_rules = Vec::new();
        for (pattern, replacement) in &overrides.plural {
            plural_rules.push(Rule::compile(pattern, replacement)?);
        }
        for (pattern, replacement) in rules::PLURAL_RULES {
            plural_rules.push(Rule::compile(pattern, replacement)?);
        }

        let mut singular_rules = Vec::new();
        for (pattern, replacement) in &overrides.singular {
            singular_rules.push(Rule::compile(pattern, replacement)?);
        }
        for (pattern, replacement) in rules::SINGULAR_RULES {
            singular_rules.push(Rule::compile(pattern, replacement)?);
        }

        let mut irregular_plural = HashMap::new();
        let mut irregular_singular = HashMap::new();
        for (singular, plural) in rules::IRREGULAR
            .iter()
            .map(|(s, p)| (s.to_string(), p.to_string()))
            .chain(overrides.irregular.iter().cloned())
        {
            irregular_plural.insert(singular.to_lowercase(), plural.to_lowercase());
            irregular_singular.insert(plural.to_lowercase(), singular.to_lowercase());
        }

        let uncountable = rules::UNCOUNTABLE
            .iter()
            .map(|w| w.to_string())
            .chain(overrides.uncountable.iter().cloned())
            .map(|w| w.to_lowercase())
            .collect();

        let acronyms = overrides
            .acronym
            .iter()
            .map(|a| (a.to_lowercase(), a.clone()))
            .collect();

        Ok(Self {
            plural_rules,
            singular_rules,
            irregular_plural,
            irregular_singular,
            uncountable,
            acronyms,
            camel_boundary: Regex::new(r"([A-Z\d]+)([A-Z][a-z])")?,
            snake_boundary: Regex::new(r"([a-z\d])([A-Z])")?,
        })
    }

    /// Convert `word` to its plural form.
    pub fn pluralize(&self, word: &str) -> String {
        self.transform(word, &self.irregular_plural, &self.plural_rules)
    }

    /// Convert `word` to its singular form.
    pub fn singularize(&self, word: &str) -> String {
        self.transform(word, &self.irregular_singular, &self.singular_rules)
    }

    fn transform(
        &self,
        word: &str,
        irregular: &HashMap<String, String>,
        rules: &[Rule],
    ) -> String {
        if word.is_empty() {
            return String::new();
        }

        let lower = word.to_lowercase();
        if self.uncountable.contains(&lower) {
            return word.to_string();
        }
        if let Some(replacement) = irregular.get(&lower) {
            return match_case(replacement, word);
        }

        for rule in rules {
            if let Some(result) = rule.apply(word) {
                return result;
            }
        }
        word.to_string()
    }

    /// Convert a camel-cased constant segment to its path form
    /// (`SalesOrder` → `sales_order`, `::` → `/`). Registered acronyms
    /// fold as one word (`HTTPClient` → `http_client` even when `HTTPC`
    /// would otherwise be split oddly, `RESTful` → `restful`).
    pub fn underscore(&self, word: &str) -> String {
        let mut s = word.replace("::", "/");
        for cased in self.acronyms.values() {
            if s.contains(cased.as_str()) {
                s = s.replace(cased.as_str(), &capitalize(&cased.to_lowercase()));
            }
        }
        let s = self.camel_boundary.replace_all(&s, "${1}_${2}");
        let s = self.snake_boundary.replace_all(&s, "${1}_${2}");
        s.replace('-', "_").to_lowercase()
    }

    /// Convert a path segment back to constant form (`sales_order` →
    /// `SalesOrder`, `/` → `::`). Registered acronyms take their cased
    /// form (`api_client` → `APIClient`).
    pub fn camelize(&self, path: &str) -> String {
        path.split('/')
            .map(|part| {
                part.split('_')
                    .filter(|s| !s.is_empty())
                    .map(|segment| match self.acronyms.get(segment) {
                        Some(cased) => cased.clone(),
                        None => capitalize(segment),
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("::")
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Carry the original word's leading capitalization onto `replacement`.
fn match_case(replacement: &str, original: &str) -> String {
    if original.chars().next().is_some_and(|c| c.is_uppercase()) {
        capitalize(replacement)
    } else {
        replacement.to_string()
    }
}
