// src/commands/mod.rs
//! Command handlers for the magepkg CLI

mod build;
mod classify;
mod inspect;

pub use build::{cmd_build, BuildArgs};
pub use classify::cmd_classify;
pub use inspect::cmd_inspect;

use anyhow::{Context, Result};
use magepkg::PackagerConfig;
use std::path::Path;

/// Load the config file if one was given, else the defaults
fn load_config(path: Option<&str>) -> Result<PackagerConfig> {
    match path {
        Some(path) => PackagerConfig::from_file(Path::new(path))
            .with_context(|| format!("Failed to load config {}", path)),
        None => Ok(PackagerConfig::default()),
    }
}
