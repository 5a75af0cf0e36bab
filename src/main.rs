use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use rayon::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use overwrite::{CommonCache, Outcome, Pipeline, ProjectConfig};

/// Validate and generate overwritten Java sources for every platform module
/// of a project.
#[derive(Parser)]
#[command(name = "overwrite-validator")]
#[command(version, about)]
struct Cli {
    /// Project file describing the common and platform modules
    #[arg(short, long, default_value = "overwrite.toml", env = "OVERWRITE_CONFIG")]
    config: PathBuf,

    /// Only run the named module (repeatable)
    #[arg(short, long = "module", value_name = "NAME")]
    modules: Vec<String>,

    /// Rewrite marked classes into the output directories
    #[arg(long)]
    generate_code: bool,
}

fn main() -> ExitCode {
    init_tracing();
    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Runs the selected modules; returns whether all of them passed.
fn run(cli: Cli) -> Result<bool> {
    let mut config = ProjectConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if cli.generate_code {
        config.generate_code = true;
    }

    for name in &cli.modules {
        if config.module(name).is_none() {
            bail!("unknown module '{name}'");
        }
    }
    let selected: Vec<_> = config
        .all_modules()
        .filter(|m| cli.modules.is_empty() || cli.modules.contains(&m.name))
        .collect();

    let pipeline = Pipeline::new(CommonCache::global());
    let results: Vec<_> = selected
        .par_iter()
        .map(|module| {
            let outcome = pipeline.run(&module.to_module(), &config.options_for(module));
            (module.name.as_str(), outcome)
        })
        .collect();

    let mut failures = Vec::new();
    for (name, result) in results {
        match result {
            Ok(Outcome::Validated {
                compile_sources: Some(dir),
                emitted,
            }) => info!(module = name, emitted, "compile sources: {}", dir.display()),
            Ok(Outcome::Validated { .. }) => info!(module = name, "valid"),
            Ok(Outcome::Skipped | Outcome::CommonModule) => {}
            Err(err) => failures.push(format!("{name}: {err}")),
        }
    }

    if failures.is_empty() {
        return Ok(true);
    }
    eprintln!("{} module(s) failed:", failures.len());
    for failure in &failures {
        eprintln!("  {failure}");
    }
    Ok(false)
}
