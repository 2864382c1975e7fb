// src/archive/writer.rs

//! Package tarball writer

use super::reader::EntryInfo;
use crate::compression::{create_encoder, CompressionFormat, Encoder};
use crate::error::{Error, Result};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tar::{Builder, EntryType, Header};
use tracing::debug;

/// Owner ids stamped on entries the packager creates itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryOwner {
    pub uid: u64,
    pub gid: u64,
}

impl EntryOwner {
    pub fn new(uid: u64, gid: u64) -> Self {
        Self { uid, gid }
    }

    /// Effective uid/gid of the running process
    pub fn current() -> Self {
        Self {
            uid: u64::from(nix::unistd::geteuid().as_raw()),
            gid: u64::from(nix::unistd::getegid().as_raw()),
        }
    }
}

/// A package tarball being written
pub struct OutputArchive {
    builder: Builder<Encoder<File>>,
    path: PathBuf,
    entries: usize,
}

impl OutputArchive {
    /// Create (or truncate) the package file
    pub fn create(path: &Path, compression: CompressionFormat) -> Result<Self> {
        let file = File::create(path).map_err(|e| output_err(path, e))?;
        let encoder = create_encoder(file, compression)?;
        debug!("Writing {} package to {}", compression, path.display());

        Ok(Self {
            builder: Builder::new(encoder),
            path: path.to_path_buf(),
            entries: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries written so far
    pub fn entry_count(&self) -> usize {
        self.entries
    }

    /// Copy a source entry, keeping its header metadata
    pub fn append_entry(&mut self, info: &EntryInfo, content: &[u8]) -> Result<()> {
        let mut header = info.header.clone();
        let is_link = matches!(info.entry_type(), EntryType::Symlink | EntryType::Link);

        let written = match (&info.link_name, is_link) {
            (Some(target), true) => self.builder.append_link(&mut header, &info.name, target),
            _ => {
                header.set_size(content.len() as u64);
                self.builder.append_data(&mut header, &info.name, content)
            }
        };
        written.map_err(|e| output_err(&self.path, e))?;

        self.entries += 1;
        Ok(())
    }

    /// Add a generated regular file
    pub fn append_file(
        &mut self,
        name: &str,
        content: &[u8],
        mode: u32,
        owner: EntryOwner,
        mtime: u64,
    ) -> Result<()> {
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Regular);
        header.set_mode(mode);
        header.set_uid(owner.uid);
        header.set_gid(owner.gid);
        header.set_mtime(mtime);
        header.set_size(content.len() as u64);

        self.builder
            .append_data(&mut header, name, content)
            .map_err(|e| output_err(&self.path, e))?;

        self.entries += 1;
        Ok(())
    }

    /// Write the tar trailer, finish compression and flush to disk
    pub fn finish(self) -> Result<PathBuf> {
        let path = self.path;
        let encoder = self
            .builder
            .into_inner()
            .map_err(|e| output_err(&path, e))?;
        let file = encoder.finish().map_err(|e| output_err(&path, e))?;
        file.sync_all().map_err(|e| output_err(&path, e))?;
        Ok(path)
    }
}

fn output_err(path: &Path, source: io::Error) -> Error {
    Error::Output {
        path: path.to_path_buf(),
        source,
    }
}
