//! Command handlers for the `pyglass` CLI.
//!
//! The binary is a thin collaborator over the core: it assembles search
//! paths, drives loads, and renders what the library produced. Exit codes
//! are decided here; `check` exits nonzero when any breakage is found.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pyglass_core::{load, load_git, LoadOptions, Loader};
use pyglass_diff::{check, Snapshot, Style};
use pyglass_model::JsonEncoder;
use tracing::warn;

#[derive(Debug, Parser)]
#[command(name = "pyglass", version, about = "Extract and diff Python API surfaces")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Dump the API of one or more packages as JSON.
    Dump {
        /// Packages to load.
        #[arg(required = true)]
        packages: Vec<String>,
        /// Output file; stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Extra search directories, tried before PYTHONPATH.
        #[arg(short = 's', long = "search")]
        search: Vec<PathBuf>,
        /// Extension specs handled by the host application.
        #[arg(short = 'e', long = "extensions")]
        extensions: Vec<String>,
        /// Emit all computed fields, not just the base set.
        #[arg(long)]
        full: bool,
        /// Resolve aliases before dumping.
        #[arg(short = 'r', long)]
        resolve: bool,
    },
    /// Compare two snapshots of a package and report API breakages.
    Check {
        package: String,
        /// Git reference of the old snapshot.
        #[arg(short = 'b', long = "base-ref", default_value = "HEAD")]
        base: String,
        /// Git reference of the new snapshot; the working tree when
        /// omitted.
        #[arg(short = 'a', long = "against")]
        against: Option<String>,
        /// Extra search directories, tried before PYTHONPATH.
        #[arg(short = 's', long = "search")]
        search: Vec<PathBuf>,
        /// Output style: oneline, verbose, markdown or github.
        #[arg(short = 'f', long = "format", default_value = "oneline")]
        format: String,
        /// Repository to take refs from.
        #[arg(long, default_value = ".")]
        repo: PathBuf,
    },
}

/// Console colors: `FORCE_COLOR` overrides terminal detection.
pub fn init_colors() {
    if let Ok(force) = std::env::var("FORCE_COLOR") {
        colored::control::set_override(force != "0");
    }
}

/// Stderr logging, filtered through `RUST_LOG`.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

/// CLI dirs first, then PYTHONPATH entries, then the working directory.
pub fn assemble_search_paths(cli_dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = cli_dirs.to_vec();
    if let Some(pythonpath) = std::env::var_os("PYTHONPATH") {
        paths.extend(std::env::split_paths(&pythonpath));
    }
    if let Ok(current) = std::env::current_dir() {
        paths.push(current);
    }
    paths
}

#[allow(clippy::fn_params_excessive_bools)]
pub fn dump_command(
    packages: &[String],
    search: &[PathBuf],
    output: Option<&PathBuf>,
    extension_specs: &[String],
    full: bool,
    resolve: bool,
) -> Result<()> {
    if !extension_specs.is_empty() {
        warn!("extension specs are resolved by the host application; ignoring");
    }
    let mut loaders: Vec<(String, Loader)> = Vec::new();
    for package in packages {
        let options = LoadOptions {
            search_paths: assemble_search_paths(search),
            resolve_aliases: resolve,
            resolve_implicit: resolve,
            ..LoadOptions::default()
        };
        let loader = load(package, options)
            .with_context(|| format!("failed to load package {package}"))?;
        loaders.push((package.clone(), loader));
    }

    let encoder = JsonEncoder::new().full(full);
    let mut dump = serde_json::Map::new();
    for (package, loader) in &loaders {
        if let Some(root) = loader.root(package) {
            dump.insert(package.clone(), encoder.encode(root));
        }
    }
    let rendered = serde_json::to_string_pretty(&serde_json::Value::Object(dump))?;

    match output {
        Some(path) => {
            fs::write(path, rendered).with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{rendered}")?;
        }
    }
    Ok(())
}

/// Returns `true` when breakages were found (nonzero exit).
pub fn check_command(
    package: &str,
    base: &str,
    against: Option<&str>,
    search: &[PathBuf],
    format: Style,
    repo: &Path,
) -> Result<bool> {
    let old_options = LoadOptions {
        search_paths: assemble_search_paths(search),
        ..LoadOptions::default()
    };
    let old_loader = load_git(package, repo, base, old_options)
        .with_context(|| format!("failed to load {package} at {base}"))?;

    let new_options = LoadOptions {
        search_paths: assemble_search_paths(search),
        ..LoadOptions::default()
    };
    let new_loader = match against {
        Some(reference) => load_git(package, repo, reference, new_options)
            .with_context(|| format!("failed to load {package} at {reference}"))?,
        None => load(package, new_options)
            .with_context(|| format!("failed to load {package} from the working tree"))?,
    };

    let old_root = old_loader
        .root(package)
        .context("old snapshot has no root module")?;
    let new_root = new_loader
        .root(package)
        .context("new snapshot has no root module")?;

    let breakages = check(
        Snapshot::new(old_root, &old_loader.collection),
        Snapshot::new(new_root, &new_loader.collection),
    );
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    for breakage in &breakages {
        writeln!(handle, "{}", breakage.render(format))?;
    }
    Ok(!breakages.is_empty())
}
