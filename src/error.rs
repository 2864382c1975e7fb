// src/error.rs

//! Crate-wide error type

use crate::compression::CompressionError;
use crate::config::ConfigError;
use crate::packager::PackagerState;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while packaging
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read input archive {source_name}: {source}")]
    Input {
        source_name: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write package {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid package metadata: {0}")]
    Validation(String),

    #[error("Malformed metadata document: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Failed to serialize package descriptor: {0}")]
    Serialize(String),

    #[error(transparent)]
    Compression(#[from] CompressionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Packager cannot save from state {0:?}")]
    InvalidState(PackagerState),
}

/// Result alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;
