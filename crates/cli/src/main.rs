//! featlab command-line driver
//!
//! Usage:
//!   featlab audit [--data PATH] [--units-dir DIR] [--rows N] [--config FILE]
//!                 [--workers N] [--timeout-ms N] [--tolerance X] [--json OUT]
//!   featlab compute --data PATH [--rows N] [--feature CODE ...] --out FILE
//!   featlab list
//!
//! The audit report goes to stdout; logs go to stderr (`RUST_LOG`, default `info`).

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use featlab_audit::run_audit_with;
use featlab_core::Config;
use featlab_features::{FeatureEngine, FeatureRegistry};
use featlab_ingestion::{load_with_options, LoadOptions};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// Exit status for configuration, data and I/O failures.
const FATAL_EXIT: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "featlab")]
#[command(about = "Look-ahead bias auditor for bar-based feature units")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Audit feature units for look-ahead bias
    Audit(AuditArgs),
    /// Compute feature columns over a reference file
    Compute(ComputeArgs),
    /// List the built-in feature units
    List,
}

#[derive(Args, Debug)]
struct AuditArgs {
    /// JSON configuration file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Reference OHLCV file
    #[arg(long)]
    data: Option<PathBuf>,

    /// Directory of unit manifests (omit to audit the built-in catalogue)
    #[arg(long)]
    units_dir: Option<PathBuf>,

    /// Rows kept from the start of the reference file
    #[arg(long)]
    rows: Option<usize>,

    /// Parallel workers (0 = all cores, 1 = sequential)
    #[arg(long)]
    workers: Option<usize>,

    /// Per-unit time budget in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Absolute comparison tolerance
    #[arg(long)]
    tolerance: Option<f64>,

    /// Also write the report as JSON
    #[arg(long)]
    json: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ComputeArgs {
    /// Reference OHLCV file
    #[arg(long)]
    data: PathBuf,

    /// Rows kept from the start of the reference file
    #[arg(long, default_value = "1000")]
    rows: usize,

    /// Unit codes to compute (repeatable; default: the whole catalogue)
    #[arg(long = "feature")]
    features: Vec<String>,

    /// Output CSV path
    #[arg(long)]
    out: PathBuf,
}

impl AuditArgs {
    fn into_config(self) -> Result<(Config, Option<PathBuf>)> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(data) = self.data {
            config.data.reference_path = data;
        }
        if let Some(dir) = self.units_dir {
            config.audit.units_dir = Some(dir);
        }
        if let Some(rows) = self.rows {
            config.data.row_limit = rows;
        }
        if let Some(workers) = self.workers {
            config.audit.workers = workers;
        }
        if let Some(ms) = self.timeout_ms {
            config.audit.unit_timeout_ms = Some(ms);
        }
        if let Some(tolerance) = self.tolerance {
            config.audit.tolerance = tolerance;
        }

        config.validate().context("invalid configuration")?;
        Ok((config, self.json))
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let outcome = match cli.command {
        Command::Audit(args) => audit(args),
        Command::Compute(args) => compute(args).map(|()| 0),
        Command::List => {
            list();
            Ok(0)
        }
    };

    match outcome {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(FATAL_EXIT)
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

fn audit(args: AuditArgs) -> Result<u8> {
    let (config, json_out) = args.into_config()?;
    info!(
        data = %config.data.reference_path.display(),
        rows = config.data.row_limit,
        workers = config.audit.workers,
        "Starting audit"
    );

    let report = run_audit_with(&config, &FeatureRegistry::builtin()).context("audit failed")?;
    print!("{}", report.render_text());

    if let Some(path) = json_out {
        report
            .save_json(&path)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(report.exit_code())
}

fn compute(args: ComputeArgs) -> Result<()> {
    let registry = FeatureRegistry::builtin();
    let engine = if args.features.is_empty() {
        FeatureEngine::from_registry(&registry)
    } else {
        FeatureEngine::new(registry.select(&args.features)?)
    };

    let options = LoadOptions {
        row_limit: args.rows,
        ..LoadOptions::default()
    };
    let table = load_with_options(&args.data, options)
        .with_context(|| format!("loading {}", args.data.display()))?;

    let matrix = engine.compute(&table)?;
    matrix
        .save_csv(&args.out)
        .with_context(|| format!("writing {}", args.out.display()))?;
    info!(rows = matrix.rows(), columns = matrix.columns().len(), "Feature matrix written");
    Ok(())
}

fn list() {
    let registry = FeatureRegistry::builtin();
    for unit in registry.iter() {
        let family = unit.family().map(|f| f.name()).unwrap_or("-");
        println!(
            "{:<40} {:<12} {:>4}  {}",
            unit.code(),
            family,
            unit.warmup(),
            unit.summary()
        );
    }
}
