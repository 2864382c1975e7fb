// src/archive/mod.rs

//! Tar archive access for the packager
//!
//! [`InputArchive`] reads a source tarball (plain or compressed), spooling
//! non-seekable sources to a temporary file so the archive can be scanned
//! more than once. [`OutputArchive`] writes the package tarball.

mod reader;
mod writer;

pub use reader::{ArchiveEntry, EntryInfo, InputArchive, InputSource};
pub use writer::{EntryOwner, OutputArchive};
