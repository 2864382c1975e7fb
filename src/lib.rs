// src/lib.rs

//! magepkg: Magento Connect package builder
//!
//! Turns a source tarball of a Magento extension into an installable
//! Connect package: every source entry is copied unchanged and a generated
//! package.xml, listing each regular file by installation target with its
//! md5, is appended as the last entry.
//!
//! # Architecture
//!
//! - `archive`: source tarball reading (with stdin spooling) and package writing
//! - `target`: path prefix to Magento installation target classification
//! - `descriptor`: package.xml metadata and the `<contents>` tree
//! - `packager`: one packaging run from source to package
//! - `inspector`: reading a package back and re-checking its hashes

pub mod archive;
pub mod compression;
pub mod config;
pub mod descriptor;
mod error;
pub mod hash;
pub mod inspector;
pub mod packager;
pub mod target;

pub use archive::{EntryOwner, InputSource};
pub use config::PackagerConfig;
pub use descriptor::PackageMetadata;
pub use error::{Error, Result};
pub use inspector::InspectedPackage;
pub use packager::{Packager, PackagerOptions, PackagerState, SaveReport};
pub use target::TargetClassifier;
