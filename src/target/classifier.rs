// src/target/classifier.rs

//! Source-path-to-target classification based on literal prefixes

use serde::{Deserialize, Serialize};

/// Target used when no prefix rule matches
pub const CATCH_ALL_TARGET: &str = "mage";

/// Default prefix table, most specific prefixes first
const DEFAULT_RULES: &[(&str, &str)] = &[
    ("app/code/community/", "magecommunity"),
    ("app/code/core/", "magecore"),
    ("app/code/local/", "magelocal"),
    ("app/design/", "magedesign"),
    ("app/etc/", "mageetc"),
    ("app/locale/", "magelocale"),
    ("lib/", "magelib"),
    ("media/", "magemedia"),
    ("skin/", "mageskin"),
    ("Test/", "magetest"),
];

/// A single `prefix -> target` rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRule {
    /// Literal prefix matched against the start of the source path
    pub prefix: String,
    /// Target name recorded in package.xml
    pub target: String,
}

impl TargetRule {
    pub fn new(prefix: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            target: target.into(),
        }
    }
}

/// Result of classifying one source path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedPath {
    /// Installation target name
    pub target: String,
    /// Path under the target directory
    pub relative_path: String,
}

/// Classifies archive paths into installation targets
///
/// Matching is a pure byte-prefix test in rule order: no separator
/// normalization, no case folding, no matching below the start of the path.
#[derive(Debug, Clone)]
pub struct TargetClassifier {
    rules: Vec<TargetRule>,
    catch_all: String,
}

impl Default for TargetClassifier {
    fn default() -> Self {
        Self::new(
            DEFAULT_RULES
                .iter()
                .map(|(prefix, target)| TargetRule::new(*prefix, *target))
                .collect(),
            CATCH_ALL_TARGET,
        )
    }
}

impl TargetClassifier {
    /// Create a classifier with explicit rules, checked in the given order
    pub fn new(rules: Vec<TargetRule>, catch_all: impl Into<String>) -> Self {
        Self {
            rules,
            catch_all: catch_all.into(),
        }
    }

    /// Configured rules in match order
    pub fn rules(&self) -> &[TargetRule] {
        &self.rules
    }

    /// Name of the fallback target
    pub fn catch_all(&self) -> &str {
        &self.catch_all
    }

    /// Classify a source path
    ///
    /// The first rule whose prefix starts the path wins and the prefix is
    /// stripped. Only once every rule has been tried does the path fall
    /// through to the catch-all target, unmodified.
    pub fn classify(&self, path: &str) -> ClassifiedPath {
        for rule in &self.rules {
            if let Some(rest) = path.strip_prefix(rule.prefix.as_str()) {
                return ClassifiedPath {
                    target: rule.target.clone(),
                    relative_path: rest.to_string(),
                };
            }
        }

        ClassifiedPath {
            target: self.catch_all.clone(),
            relative_path: path.to_string(),
        }
    }

    /// Map a target-relative path back to the source path it came from
    ///
    /// Returns `None` for targets this classifier does not know.
    pub fn source_path(&self, target: &str, relative_path: &str) -> Option<String> {
        if let Some(rule) = self.rules.iter().find(|r| r.target == target) {
            return Some(format!("{}{}", rule.prefix, relative_path));
        }

        (target == self.catch_all).then(|| relative_path.to_string())
    }
}
