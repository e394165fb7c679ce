#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use lintrc::cli_support::expand_config_data;
use lintrc::config::{Overrides, discover_config};

/// Show which configuration `lintrc` would use for a directory.
///
/// Prints two lines: the config source (empty when the built-in default
/// applies) and the base directory that `ignorePatterns` and `overrides`
/// globs are anchored at.
#[derive(Parser, Debug)]
#[command(name = "discover_config_bin")]
struct Args {
    #[arg(value_name = "DIR", default_value = ".")]
    dir: PathBuf,

    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    config_file: Option<PathBuf>,

    #[arg(short = 'd', long = "config-data", value_name = "YAML")]
    config_data: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let overrides = Overrides {
        config_file: args.config_file,
        config_data: args.config_data.as_deref().map(expand_config_data),
    };
    match discover_config(&[args.dir], &overrides) {
        Ok(ctx) => {
            let source = ctx
                .source
                .as_deref()
                .map_or_else(String::new, |p| p.display().to_string());
            println!("{source}");
            println!("{}", ctx.base_dir.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error[{}]: {e}", e.kind());
            ExitCode::from(2)
        }
    }
}
