// src/commands/classify.rs

//! Target classification preview

use anyhow::Result;

/// Print the target and target-relative path of each source path
pub fn cmd_classify(paths: &[String], config: Option<&str>) -> Result<()> {
    let classifier = super::load_config(config)?.classifier();

    for path in paths {
        let classified = classifier.classify(path);
        println!(
            "{:<14} {:<40} {}",
            classified.target, path, classified.relative_path
        );
    }

    Ok(())
}
