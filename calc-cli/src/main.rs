use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use calc_core::CalculatorRegistry;
use clap::{Parser, Subcommand};
use tracing::debug;

use calc_cli::app;
use calc_cli::config::{Config, Settings};
use calc_cli::logging;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// A suite of everyday calculators: finance, health, science, math and dates.
///
/// Inputs are given as `field=value` pairs; `calc schema <id>` lists the
/// fields a calculator accepts. Omitted fields take their defaults.
#[derive(Debug, Parser)]
#[command(name = "calc", version)]
struct Cli {
    /// TOML config file. Defaults to `calc.toml` in the working directory
    /// when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `calc_core=trace`. Overrides the config
    /// file and `RUST_LOG`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Append log output to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every calculator.
    List,

    /// Show the input fields of a calculator.
    Schema {
        /// Calculator id, see `calc list`.
        id: String,
    },

    /// Evaluate a calculator once.
    Run {
        id: String,

        /// Input values as `field=value`.
        assignments: Vec<String>,

        /// Also print the chart specification as TOML.
        #[arg(long)]
        chart: bool,
    },

    /// Evaluate a calculator for every row of a CSV file.
    Batch {
        id: String,

        /// CSV file whose header row names the input fields.
        #[arg(long)]
        file: PathBuf,
    },

    /// Run date calculations in one session and print its history.
    ///
    /// Each argument is one calculation, e.g.
    /// `"start=2024-01-01 end=2024-12-25"` or `"mode=add days=90"`.
    Dates {
        #[arg(required = true)]
        calculations: Vec<String>,
    },
}

// ─── logging ─────────────────────────────────────────────────────────────────

fn apply_logging(settings: &Settings) -> Result<()> {
    if let Some(level) = &settings.log_level {
        logging::set_log_level(level)?;
    }
    if let Some(path) = &settings.log_file {
        logging::enable_file_logging(path)?;
    }
    debug!(level = settings.effective_log_level(), "logging configured");
    Ok(())
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> Result<ExitCode> {
    logging::init_logging();

    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    let settings = Settings::resolve(config, cli.log_level, cli.log_file)?;
    apply_logging(&settings)?;

    let registry = CalculatorRegistry::builtin();
    let mut out = io::stdout().lock();

    let ok = match cli.command {
        Command::List => app::list(&registry, &mut out).map(|()| true)?,
        Command::Schema { id } => app::schema(&registry, &id, &mut out).map(|()| true)?,
        Command::Run {
            id,
            assignments,
            chart,
        } => app::run(&registry, &id, &assignments, chart, &settings, &mut out).map(|()| true)?,
        Command::Batch { id, file } => app::batch(&registry, &id, &file, &settings, &mut out)?,
        Command::Dates { calculations } => app::dates(&calculations, &settings, &mut out)?,
    };

    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
