// src/inspector.rs
//! Package inspection
//!
//! Reads a generated package back: its entry listing, the embedded
//! package.xml, and whether the recorded hashes still match the shipped
//! files.

use crate::archive::{EntryInfo, InputArchive, InputSource};
use crate::compression::CompressionFormat;
use crate::descriptor::PackageMetadata;
use crate::error::{Error, Result};
use crate::hash::{self, ContentHash, VerifyError};
use crate::target::TargetClassifier;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A package opened for inspection
#[derive(Debug)]
pub struct InspectedPackage {
    pub path: PathBuf,
    pub compression: CompressionFormat,
    /// Every entry, in archive order
    pub entries: Vec<EntryInfo>,
    pub metadata: PackageMetadata,
    /// md5 of every regular file except the descriptor itself
    hashes: HashMap<String, ContentHash>,
}

/// Result of checking package.xml hashes against the shipped files
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    pub checked: usize,
    /// Source paths whose content hash differs from the recorded one
    pub mismatched: Vec<(String, VerifyError)>,
    /// Listed files with no matching entry
    pub missing: Vec<String>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.mismatched.is_empty() && self.missing.is_empty()
    }
}

impl InspectedPackage {
    /// Load a package whose descriptor entry is called `descriptor_name`
    ///
    /// The descriptor is the last regular entry with that name. Earlier
    /// entries with the same name were copied from the source archive and
    /// are treated as ordinary files.
    pub fn from_file(path: &Path, descriptor_name: &str) -> Result<Self> {
        let archive = InputArchive::open(InputSource::Path(path.to_path_buf()))?;

        let mut entries = Vec::new();
        let mut files: Vec<(String, ContentHash)> = Vec::new();
        let mut descriptor: Option<(usize, Vec<u8>)> = None;

        archive.for_each_entry(|entry| {
            if entry.info.is_regular_file() {
                if entry.info.name == descriptor_name {
                    descriptor = Some((files.len(), entry.content.clone()));
                }
                files.push((entry.info.name.clone(), hash::md5_hash(&entry.content)));
            }
            entries.push(entry.info);
            Ok(())
        })?;

        let (index, content) = descriptor.ok_or_else(|| {
            Error::Validation(format!("{} has no {}", path.display(), descriptor_name))
        })?;
        files.remove(index);

        let xml = String::from_utf8(content)
            .map_err(|e| Error::Validation(format!("{} is not UTF-8: {}", descriptor_name, e)))?;
        let metadata = PackageMetadata::parse(&xml)?;

        Ok(Self {
            path: path.to_path_buf(),
            compression: archive.compression(),
            entries,
            metadata,
            hashes: files.into_iter().collect(),
        })
    }

    pub fn name(&self) -> &str {
        self.metadata.name().unwrap_or("<unnamed>")
    }

    pub fn version(&self) -> &str {
        self.metadata.version().unwrap_or("<unversioned>")
    }

    /// Files listed in package.xml
    pub fn file_count(&self) -> usize {
        self.metadata.contents().file_count()
    }

    /// Check every listed file against the archive
    ///
    /// Targets the classifier does not know are reported as missing.
    pub fn verify(&self, classifier: &TargetClassifier) -> VerifyReport {
        let mut report = VerifyReport::default();

        for target in self.metadata.contents().targets() {
            target.root().walk_files(&mut |relative, recorded| {
                report.checked += 1;
                let source = classifier
                    .source_path(target.name(), relative)
                    .unwrap_or_else(|| format!("{}:{}", target.name(), relative));

                match self.hashes.get(&source).map(|actual| actual.verify(recorded)) {
                    Some(Ok(())) => debug!("{} ok", source),
                    Some(Err(e)) => report.mismatched.push((source, e)),
                    None => report.missing.push(source),
                }
            });
        }

        report
    }
}

/// Print package summary
pub fn print_summary(pkg: &InspectedPackage) {
    println!("Package: {} v{}", pkg.name(), pkg.version());
    if let Some(summary) = pkg.metadata.field("summary") {
        println!("Summary: {}", summary);
    }
    if let Some(license) = pkg.metadata.field("license") {
        println!("License: {}", license);
    }
    if let (Some(date), Some(time)) = (pkg.metadata.field("date"), pkg.metadata.field("time")) {
        println!("Released: {} {}", date, time);
    }

    println!();
    println!("Archive: {} ({})", pkg.path.display(), pkg.compression);
    println!("Entries: {}", pkg.entries.len());
    println!("Listed files: {}", pkg.file_count());

    println!();
    println!("Targets:");
    for target in pkg.metadata.contents().targets() {
        println!("  {} - {} files", target.name(), target.root().file_count());
    }
}

/// Print the file listing of package.xml
pub fn print_files(pkg: &InspectedPackage) {
    println!("Files ({}):", pkg.file_count());
    for target in pkg.metadata.contents().targets() {
        target.root().walk_files(&mut |relative, hash| {
            println!("  {} {}:{}", hash, target.name(), relative);
        });
    }
}
