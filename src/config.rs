// src/config.rs
//! Packager configuration (magepkg.toml)
//!
//! Everything is optional; command-line flags override the file.
//!
//! ```toml
//! [package]
//! name = "Foo_Bar"
//! version = "1.2.3"
//! stability = "stable"
//! license = "OSL v3.0"
//! license_uri = "http://opensource.org/licenses/osl-3.0.php"
//!
//! [output]
//! directory = "dist"
//! compression = "gzip"
//!
//! [descriptor]
//! mode = "0664"
//!
//! [targets]
//! catch_all = "mage"
//!
//! [[targets.rules]]
//! prefix = "app/code/local/"
//! target = "magelocal"
//! ```

use crate::archive::EntryOwner;
use crate::compression::CompressionFormat;
use crate::descriptor::{PackageMetadata, DESCRIPTOR_FILE};
use crate::packager::{DescriptorEntry, PackagerOptions};
use crate::target::{TargetClassifier, TargetRule, CATCH_ALL_TARGET};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Root structure of magepkg.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackagerConfig {
    #[serde(default)]
    pub package: PackageFields,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub descriptor: DescriptorConfig,

    #[serde(default)]
    pub targets: TargetsConfig,
}

impl PackagerConfig {
    /// Load config from a file path
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse config from a TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: PackagerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.compression()?;
        self.descriptor_mode()?;
        for rule in &self.targets.rules {
            if rule.prefix.is_empty() || rule.target.is_empty() {
                return Err(ConfigError::Invalid(
                    "target rules need a non-empty prefix and target".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Output compression, gzip unless configured
    pub fn compression(&self) -> Result<CompressionFormat, ConfigError> {
        match &self.output.compression {
            Some(name) => name
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("unknown compression '{}'", name))),
            None => Ok(CompressionFormat::default()),
        }
    }

    fn descriptor_mode(&self) -> Result<u32, ConfigError> {
        u32::from_str_radix(self.descriptor.mode.trim_start_matches("0o"), 8).map_err(|_| {
            ConfigError::Invalid(format!("invalid descriptor mode '{}'", self.descriptor.mode))
        })
    }

    /// Classifier from the configured rules, or the default table
    pub fn classifier(&self) -> TargetClassifier {
        let catch_all = self
            .targets
            .catch_all
            .as_deref()
            .unwrap_or(CATCH_ALL_TARGET);

        if self.targets.rules.is_empty() {
            let defaults = TargetClassifier::default();
            TargetClassifier::new(defaults.rules().to_vec(), catch_all)
        } else {
            TargetClassifier::new(self.targets.rules.clone(), catch_all)
        }
    }

    /// Packager options; `owner` fills in ids the config leaves unset
    pub fn options(&self, owner: EntryOwner) -> Result<PackagerOptions, ConfigError> {
        Ok(PackagerOptions {
            classifier: self.classifier(),
            compression: self.compression()?,
            descriptor: DescriptorEntry {
                name: self.descriptor.name.clone(),
                mode: self.descriptor_mode()?,
                owner: EntryOwner::new(
                    self.descriptor.uid.unwrap_or(owner.uid),
                    self.descriptor.gid.unwrap_or(owner.gid),
                ),
            },
        })
    }

    /// Apply the `[package]` fields to descriptor metadata
    pub fn apply_fields(&self, metadata: &mut PackageMetadata) {
        self.package.apply(metadata);
    }
}

/// Scalar descriptor fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageFields {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub stability: Option<String>,

    #[serde(default)]
    pub license: Option<String>,

    /// Becomes the `uri` attribute of `<license>`
    #[serde(default)]
    pub license_uri: Option<String>,

    #[serde(default)]
    pub channel: Option<String>,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,

    /// Any other element, written verbatim
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl PackageFields {
    fn apply(&self, metadata: &mut PackageMetadata) {
        let simple = [
            ("name", &self.name),
            ("version", &self.version),
            ("stability", &self.stability),
            ("channel", &self.channel),
            ("summary", &self.summary),
            ("description", &self.description),
            ("notes", &self.notes),
        ];
        for (field, value) in simple {
            if let Some(value) = value {
                metadata.set_field(field, Some(value.as_str()), &[]);
            }
        }

        if let Some(license) = &self.license {
            match &self.license_uri {
                Some(uri) => {
                    metadata.set_field("license", Some(license.as_str()), &[("uri", uri.as_str())])
                }
                None => metadata.set_field("license", Some(license.as_str()), &[]),
            }
        }

        for (field, value) in &self.extra {
            metadata.set_field(field, Some(value.as_str()), &[]);
        }
    }
}

/// Where and how the package is written
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// none, gzip, xz or zstd
    #[serde(default)]
    pub compression: Option<String>,
}

/// The generated descriptor entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptorConfig {
    #[serde(default = "default_descriptor_name")]
    pub name: String,

    /// Octal permission bits
    #[serde(default = "default_descriptor_mode")]
    pub mode: String,

    #[serde(default)]
    pub uid: Option<u64>,

    #[serde(default)]
    pub gid: Option<u64>,
}

impl Default for DescriptorConfig {
    fn default() -> Self {
        Self {
            name: default_descriptor_name(),
            mode: default_descriptor_mode(),
            uid: None,
            gid: None,
        }
    }
}

fn default_descriptor_name() -> String {
    DESCRIPTOR_FILE.to_string()
}

fn default_descriptor_mode() -> String {
    "0664".to_string()
}

/// Target classification rules
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetsConfig {
    #[serde(default)]
    pub catch_all: Option<String>,

    /// Checked in order; replaces the default table when non-empty
    #[serde(default)]
    pub rules: Vec<TargetRule>,
}
