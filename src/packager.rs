// src/packager.rs

//! Source tarball to Magento Connect package
//!
//! A [`Packager`] owns one input archive, one output directory and one set
//! of descriptor metadata for the duration of a single run:
//!
//! 1. every input entry is copied unchanged into the package,
//! 2. regular files are hashed and classified into installation targets,
//! 3. the resulting `<contents>` tree is rendered into package.xml, which is
//!    appended as the last entry.

use crate::archive::{EntryOwner, InputArchive, InputSource, OutputArchive};
use crate::compression::CompressionFormat;
use crate::descriptor::{self, ClassifiedFile, PackageMetadata, DESCRIPTOR_FILE};
use crate::error::{Error, Result};
use crate::hash;
use crate::target::TargetClassifier;
use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Lifecycle of a packaging run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackagerState {
    Created,
    MetadataInitialized,
    Saving,
    Saved,
}

/// How the generated descriptor entry is stamped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorEntry {
    /// Entry name inside the package
    pub name: String,
    /// Permission bits
    pub mode: u32,
    /// Owner ids
    pub owner: EntryOwner,
}

impl Default for DescriptorEntry {
    fn default() -> Self {
        Self {
            name: DESCRIPTOR_FILE.to_string(),
            mode: 0o664,
            owner: EntryOwner::current(),
        }
    }
}

/// Everything about a run that is not package metadata
#[derive(Debug, Clone, Default)]
pub struct PackagerOptions {
    pub classifier: TargetClassifier,
    pub compression: CompressionFormat,
    pub descriptor: DescriptorEntry,
}

/// Outcome of a successful save
#[derive(Debug, Clone)]
pub struct SaveReport {
    /// Path of the written package
    pub output_path: PathBuf,
    /// Entries copied from the input archive
    pub entries: usize,
    /// Regular files recorded in package.xml
    pub files: usize,
    /// File count per target, in descriptor order
    pub targets: Vec<(String, usize)>,
    /// Whether an existing file at the output path was replaced
    pub replaced: bool,
}

/// Repackages one source tarball
pub struct Packager {
    input: InputArchive,
    output_dir: PathBuf,
    metadata: PackageMetadata,
    options: PackagerOptions,
    state: PackagerState,
}

impl Packager {
    /// Open the input and initialize metadata
    ///
    /// `output_dir` defaults to the current directory and `metadata` to an
    /// empty `<package/>`.
    pub fn new(
        input: InputSource,
        output_dir: Option<&Path>,
        metadata: Option<PackageMetadata>,
        options: PackagerOptions,
    ) -> Result<Self> {
        let input = InputArchive::open(input)?;
        let mut packager = Self {
            input,
            output_dir: output_dir.map_or_else(|| PathBuf::from("."), Path::to_path_buf),
            metadata: PackageMetadata::new(),
            options,
            state: PackagerState::Created,
        };
        packager.init_metadata(metadata);
        Ok(packager)
    }

    fn init_metadata(&mut self, metadata: Option<PackageMetadata>) {
        if let Some(metadata) = metadata {
            self.metadata = metadata;
        }
        self.state = PackagerState::MetadataInitialized;
    }

    pub fn state(&self) -> PackagerState {
        self.state
    }

    pub fn metadata(&self) -> &PackageMetadata {
        &self.metadata
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Set a scalar descriptor field
    pub fn set_field(&mut self, name: &str, value: Option<&str>, attributes: &[(&str, &str)]) {
        self.metadata.set_field(name, value, attributes);
    }

    /// Set the release `date` and `time` fields
    pub fn set_release_date<Tz>(&mut self, date: &DateTime<Tz>)
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        self.metadata.set_release_date(date);
    }

    /// `<output_dir>/<name>-<version>.<ext>`
    pub fn output_path(&self) -> Result<PathBuf> {
        let (name, version) = match (self.metadata.name(), self.metadata.version()) {
            (Some(name), Some(version)) => (name, version),
            _ => {
                return Err(Error::Validation(
                    "name and version are needed to name the package".to_string(),
                ));
            }
        };
        Ok(self.output_dir.join(format!(
            "{}-{}.{}",
            name,
            version,
            self.options.compression.archive_extension()
        )))
    }

    /// Fail before any output is touched if required metadata is missing
    fn validate_metadata(&self) -> Result<()> {
        self.metadata.validate()
    }

    /// Write the package
    pub fn save(&mut self) -> Result<SaveReport> {
        if self.state != PackagerState::MetadataInitialized {
            return Err(Error::InvalidState(self.state));
        }

        self.validate_metadata()?;
        let output_path = self.output_path()?;
        self.state = PackagerState::Saving;

        let replaced = output_path.is_file();
        if replaced {
            info!("Replacing existing package {}", output_path.display());
            fs::remove_file(&output_path).map_err(|e| Error::Output {
                path: output_path.clone(),
                source: e,
            })?;
        }

        info!(
            "Packaging {} into {}",
            self.input.source_name(),
            output_path.display()
        );
        let mut output = OutputArchive::create(&output_path, self.options.compression)?;
        let classifier = &self.options.classifier;
        let descriptor_name = &self.options.descriptor.name;
        let mut files = Vec::new();

        self.input.for_each_entry(|entry| {
            output.append_entry(&entry.info, &entry.content)?;

            if entry.info.name == *descriptor_name {
                warn!(
                    "Source archive already contains {}; the generated one is appended after it",
                    descriptor_name
                );
            }

            if entry.info.is_regular_file() {
                let classified = classifier.classify(&entry.info.name);
                debug!(
                    "{} -> {}:{}",
                    entry.info.name, classified.target, classified.relative_path
                );
                files.push(ClassifiedFile::new(classified, hash::md5(&entry.content)));
            }
            Ok(())
        })?;
        let entries = output.entry_count();

        descriptor::build(&files, &mut self.metadata);
        let xml = self.metadata.to_xml()?;

        let descriptor = &self.options.descriptor;
        output.append_file(
            &descriptor.name,
            xml.as_bytes(),
            descriptor.mode,
            descriptor.owner,
            source_date_epoch(),
        )?;
        let output_path = output.finish()?;

        self.state = PackagerState::Saved;

        let targets = self
            .metadata
            .contents()
            .targets()
            .iter()
            .map(|t| (t.name().to_string(), t.root().file_count()))
            .collect();

        info!(
            "Wrote {} ({} entries, {} files)",
            output_path.display(),
            entries,
            files.len()
        );

        Ok(SaveReport {
            output_path,
            entries,
            files: files.len(),
            targets,
            replaced,
        })
    }
}

/// Timestamp for generated entries: `SOURCE_DATE_EPOCH` if set, else now
fn source_date_epoch() -> u64 {
    std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or_else(|| chrono::Utc::now().timestamp().max(0) as u64)
}
