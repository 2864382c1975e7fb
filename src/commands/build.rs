// src/commands/build.rs

//! Package building
//!
//! Layers metadata in order: skeleton file, config `[package]`, then
//! command-line fields. The release date is always set last.

use anyhow::{Context, Result};
use magepkg::{EntryOwner, InputSource, PackageMetadata, Packager, SaveReport};
use std::path::{Path, PathBuf};
use tracing::info;

/// Arguments of `magepkg build`
pub struct BuildArgs {
    pub input: String,
    pub output: Option<String>,
    pub config: Option<String>,
    pub metadata: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub fields: Vec<String>,
    pub release_date: Option<String>,
    pub compression: Option<String>,
}

/// Build a package from a source tarball
pub fn cmd_build(args: BuildArgs) -> Result<()> {
    let config = super::load_config(args.config.as_deref())?;

    let mut options = config
        .options(EntryOwner::current())
        .context("Invalid packager configuration")?;
    if let Some(compression) = &args.compression {
        options.compression = compression
            .parse()
            .with_context(|| format!("Unknown compression '{}'", compression))?;
    }

    let mut metadata = match &args.metadata {
        Some(path) => PackageMetadata::from_file(Path::new(path))
            .with_context(|| format!("Failed to load metadata skeleton {}", path))?,
        None => PackageMetadata::new(),
    };
    config.apply_fields(&mut metadata);

    let output_dir: PathBuf = args
        .output
        .map(PathBuf::from)
        .or_else(|| config.output.directory.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&output_dir).with_context(|| {
        format!("Failed to create output directory {}", output_dir.display())
    })?;

    let mut packager = Packager::new(
        InputSource::from_arg(&args.input),
        Some(&output_dir),
        Some(metadata),
        options,
    )
    .with_context(|| format!("Failed to open source archive {}", args.input))?;

    if let Some(name) = &args.name {
        packager.set_field("name", Some(name.as_str()), &[]);
    }
    if let Some(version) = &args.version {
        packager.set_field("version", Some(version.as_str()), &[]);
    }
    for field in &args.fields {
        let (key, value) = parse_field(field)?;
        packager.set_field(key, Some(value), &[]);
    }

    match &args.release_date {
        Some(date) => {
            let date = chrono::DateTime::parse_from_rfc3339(date)
                .with_context(|| format!("Invalid release date '{}'", date))?;
            packager.set_release_date(&date);
        }
        None => packager.set_release_date(&chrono::Local::now()),
    }

    if let (Some(name), Some(version)) = (packager.metadata().name(), packager.metadata().version())
    {
        println!("Building {} v{}", name, version);
    }

    let report = packager.save().context("Failed to build package")?;
    print_build_summary(&report);
    Ok(())
}

/// Split a `KEY=VALUE` argument
fn parse_field(field: &str) -> Result<(&str, &str)> {
    match field.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => anyhow::bail!("Invalid field '{}', expected KEY=VALUE", field),
    }
}

fn print_build_summary(report: &SaveReport) {
    println!();
    println!("Copied {} entries, recorded {} files:", report.entries, report.files);
    for (target, count) in &report.targets {
        println!("  {} - {} files", target, count);
    }
    println!();
    if report.replaced {
        info!("Previous package at {} was replaced", report.output_path.display());
    }
    println!("Created: {}", report.output_path.display());
}
