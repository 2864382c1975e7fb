// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: config file
fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .value_name("PATH")
        .help("Path to magepkg.toml")
}

fn build_cli() -> Command {
    Command::new("magepkg")
        .version(env!("CARGO_PKG_VERSION"))
        .author("magepkg Contributors")
        .about("Build Magento Connect packages from source tarballs")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .subcommand(
            Command::new("build")
                .about("Repackage a source tarball with a generated package.xml")
                .arg(Arg::new("input").default_value("-").help("Source tarball, or '-' for stdin"))
                .arg(Arg::new("output").short('o').long("output").help("Output directory"))
                .arg(config_arg())
                .arg(
                    Arg::new("metadata")
                        .short('m')
                        .long("metadata")
                        .help("package.xml skeleton to start from"),
                )
                .arg(Arg::new("name").long("name").help("Package name"))
                .arg(Arg::new("version").long("version").help("Package version"))
                .arg(
                    Arg::new("field")
                        .long("field")
                        .value_name("KEY=VALUE")
                        .action(ArgAction::Append)
                        .help("Additional descriptor field (repeatable)"),
                )
                .arg(
                    Arg::new("release_date")
                        .long("release-date")
                        .help("Release timestamp, RFC 3339 (default: now)"),
                )
                .arg(
                    Arg::new("compression")
                        .long("compression")
                        .value_parser(["none", "gzip", "xz", "zstd"])
                        .help("Output compression"),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Show the descriptor of a built package")
                .arg(Arg::new("package").required(true).help("Path to the package file"))
                .arg(
                    Arg::new("files")
                        .long("files")
                        .action(ArgAction::SetTrue)
                        .help("List every file recorded in package.xml"),
                )
                .arg(
                    Arg::new("verify")
                        .long("verify")
                        .action(ArgAction::SetTrue)
                        .help("Re-check recorded hashes against the shipped files"),
                )
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("classify")
                .about("Show the installation target of source paths")
                .arg(
                    Arg::new("paths")
                        .required(true)
                        .num_args(1..)
                        .help("Paths relative to the Magento root"),
                )
                .arg(config_arg()),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("magepkg.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
