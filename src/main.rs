#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use lintrc::check::{Level, check};
use lintrc::cli_support::{expand_config_data, gather_files, resolve_ctx};
use lintrc::config::{CONFIG_FILE_ENV, ConfigContext, Overrides, discover_config};
use lintrc::model::config_schema;
use lintrc::{ConfigError, ResolvedConfig};
use rayon::prelude::*;
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "lintrc",
    version,
    about = "Resolve layered lint configuration into one flat config"
)]
struct Cli {
    /// Files and/or directories to resolve configuration for (default: .)
    #[arg(value_name = "PATH_OR_FILE")]
    inputs: Vec<PathBuf>,

    /// Path to configuration file (yaml, json or toml)
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    config_file: Option<PathBuf>,

    /// Inline configuration data (yaml), or a preset name
    #[arg(short = 'd', long = "config-data", value_name = "YAML")]
    config_data: Option<String>,

    /// List files under the inputs that are not ignored by ignorePatterns
    #[arg(long = "list-files", default_value_t = false)]
    list_files: bool,

    /// Report malformed entries and unknown presets; exit 1 on warnings
    #[arg(long = "check", default_value_t = false)]
    check: bool,

    /// Print effective globals (environment sets plus explicit globals)
    #[arg(long = "print-globals", default_value_t = false)]
    print_globals: bool,

    /// Print the JSON schema of the configuration file format
    #[arg(long = "print-schema", default_value_t = false)]
    print_schema: bool,

    /// Log discovery and resolution details to stderr
    #[arg(short = 'v', long = "verbose", default_value_t = false)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env("LINTRC_LOG")
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn build_global_cfg(inputs: &[PathBuf], cli: &Cli) -> Result<Option<Arc<ConfigContext>>, ConfigError> {
    if cli.config_data.is_none()
        && cli.config_file.is_none()
        && std::env::var(CONFIG_FILE_ENV).is_err()
    {
        return Ok(None);
    }
    let overrides = Overrides {
        config_file: cli.config_file.clone(),
        config_data: cli.config_data.as_deref().map(expand_config_data),
    };
    discover_config(inputs, &overrides).map(|ctx| Some(Arc::new(ctx)))
}

fn render(config: &ResolvedConfig, globals: bool) -> serde_json::Result<Value> {
    if globals {
        serde_json::to_value(config.effective_globals())
    } else {
        config.to_json()
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.print_schema {
        return match config_schema().and_then(|schema| serde_json::to_string_pretty(&schema)) {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{e}");
                ExitCode::from(2)
            }
        };
    }

    let inputs = if cli.inputs.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        cli.inputs.clone()
    };

    // A global config applies to every input; otherwise each input discovers its own.
    let global_cfg = match build_global_cfg(&inputs, &cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    let targets = if cli.list_files {
        gather_files(&inputs)
    } else {
        inputs
    };

    let mut cache: HashMap<PathBuf, Arc<ConfigContext>> = HashMap::new();
    let mut resolved_targets: Vec<(PathBuf, Arc<ConfigContext>)> = Vec::new();
    for target in targets {
        match resolve_ctx(&target, global_cfg.as_ref(), &mut cache) {
            Ok(ctx) => resolved_targets.push((target, ctx)),
            Err(e) => {
                eprintln!("{e}");
                return ExitCode::from(2);
            }
        }
    }

    if cli.list_files {
        for (path, ctx) in &resolved_targets {
            if !ctx.is_file_ignored(path) {
                println!("{}", path.display());
            }
        }
        return ExitCode::SUCCESS;
    }

    if cli.check {
        return run_check(&resolved_targets);
    }

    let rendered: serde_json::Result<Vec<(String, Value)>> = resolved_targets
        .par_iter()
        .map(|(path, ctx)| {
            let config = if path.is_dir() {
                ctx.config.resolved().clone()
            } else {
                ctx.resolve_for(path)
            };
            render(&config, cli.print_globals).map(|value| (path.display().to_string(), value))
        })
        .collect();

    let output = rendered.and_then(|mut rendered| {
        let output = if rendered.len() == 1 {
            rendered.pop().map_or(Value::Null, |(_, value)| value)
        } else {
            Value::Object(rendered.into_iter().collect::<Map<String, Value>>())
        };
        serde_json::to_string_pretty(&output)
    });
    match output {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(2)
        }
    }
}

fn run_check(targets: &[(PathBuf, Arc<ConfigContext>)]) -> ExitCode {
    let mut seen: Vec<&Arc<ConfigContext>> = Vec::new();
    let mut has_warning = false;
    for (path, ctx) in targets {
        if seen.iter().any(|done| Arc::ptr_eq(done, ctx)) {
            continue;
        }
        seen.push(ctx);
        let problems = check(&ctx.config);
        if problems.is_empty() {
            continue;
        }
        let header = ctx
            .source
            .as_ref()
            .map_or_else(|| path.display().to_string(), |p| p.display().to_string());
        eprintln!("{header}");
        for problem in &problems {
            eprintln!("{problem}");
            has_warning |= problem.level == Level::Warning;
        }
        eprintln!();
    }
    if has_warning {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
