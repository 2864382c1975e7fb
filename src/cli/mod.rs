// src/cli/mod.rs
//! CLI definitions for magepkg
//!
//! This module contains the command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "magepkg")]
#[command(version)]
#[command(about = "Build Magento Connect packages from source tarballs", long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Repackage a source tarball with a generated package.xml
    Build {
        /// Source tarball, or '-' for stdin
        #[arg(default_value = "-")]
        input: String,

        /// Output directory (default: [output] directory, then '.')
        #[arg(short, long)]
        output: Option<String>,

        /// Path to magepkg.toml
        #[arg(short, long)]
        config: Option<String>,

        /// package.xml skeleton to start from
        #[arg(short, long)]
        metadata: Option<String>,

        /// Package name
        #[arg(long)]
        name: Option<String>,

        /// Package version
        #[arg(long = "version")]
        package_version: Option<String>,

        /// Additional descriptor field (repeatable)
        #[arg(long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,

        /// Release timestamp, RFC 3339 (default: now)
        #[arg(long)]
        release_date: Option<String>,

        /// Output compression: none, gzip, xz, zstd
        #[arg(long)]
        compression: Option<String>,
    },

    /// Show the descriptor of a built package
    Inspect {
        /// Path to the package file
        package: String,

        /// List every file recorded in package.xml
        #[arg(long)]
        files: bool,

        /// Re-check recorded hashes against the shipped files
        #[arg(long)]
        verify: bool,

        /// Path to magepkg.toml (for custom target rules)
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Show the installation target of source paths
    Classify {
        /// Paths relative to the Magento root
        #[arg(required = true)]
        paths: Vec<String>,

        /// Path to magepkg.toml (for custom target rules)
        #[arg(short, long)]
        config: Option<String>,
    },
}
