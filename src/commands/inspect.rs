// src/commands/inspect.rs

//! Package inspection and verification

use anyhow::{Context, Result};
use magepkg::inspector::{self, InspectedPackage};
use std::path::Path;

/// Inspect a built package
pub fn cmd_inspect(
    package: &str,
    show_files: bool,
    verify: bool,
    config: Option<&str>,
) -> Result<()> {
    let path = Path::new(package);

    if !path.exists() {
        anyhow::bail!("Package not found: {}", package);
    }

    let config = super::load_config(config)?;
    let pkg = InspectedPackage::from_file(path, &config.descriptor.name)
        .context("Failed to read package")?;

    inspector::print_summary(&pkg);

    if show_files {
        println!();
        inspector::print_files(&pkg);
    }

    if verify {
        let report = pkg.verify(&config.classifier());

        println!();
        println!("Verified {} files", report.checked);
        for (source, e) in &report.mismatched {
            println!("  MISMATCH {} ({})", source, e);
        }
        for source in &report.missing {
            println!("  MISSING  {}", source);
        }

        if !report.is_ok() {
            anyhow::bail!(
                "{} files failed verification",
                report.mismatched.len() + report.missing.len()
            );
        }
        println!("All hashes match");
    }

    Ok(())
}
