// src/main.rs

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::BuildArgs;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Build {
            input,
            output,
            config,
            metadata,
            name,
            package_version,
            fields,
            release_date,
            compression,
        }) => commands::cmd_build(BuildArgs {
            input,
            output,
            config,
            metadata,
            name,
            version: package_version,
            fields,
            release_date,
            compression,
        }),

        Some(Commands::Inspect {
            package,
            files,
            verify,
            config,
        }) => commands::cmd_inspect(&package, files, verify, config.as_deref()),

        Some(Commands::Classify { paths, config }) => {
            commands::cmd_classify(&paths, config.as_deref())
        }

        None => {
            println!("magepkg v{}", env!("CARGO_PKG_VERSION"));
            println!("Run 'magepkg --help' for usage information");
            Ok(())
        }
    }
}
