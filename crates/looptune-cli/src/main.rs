//! `looptune-cli` – command line front end for the gain calculator.
//!
//! Resolves the tuning inputs (flags, then an optional profile file, then the
//! built-in defaults), runs one calculation through
//! [`looptune_core::tune`], and prints the gains in both the standard and
//! Rockwell unit conventions.

mod config;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use colored::Colorize;
use tracing::{debug, info};

use config::Profile;
use looptune_types::{LoopType, Objective, TuneError};

/// Report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable console report
    Text,
    /// A single JSON document
    Json,
}

/// Open-loop PID tuning from a step-test reaction curve.
#[derive(Parser, Debug)]
#[command(name = "looptune")]
#[command(version)]
#[command(about = "Compute P, I and D gains from a reaction-curve step test")]
pub struct Args {
    /// Tuning objective: setpoint_change or load_change [default: setpoint_change]
    #[arg(long)]
    pub tune_for: Option<String>,

    /// Loop type: P, PI or PID [default: PID]
    #[arg(long)]
    pub loop_type: Option<String>,

    /// Controller scan time in seconds [default: 0.01]
    #[arg(long, allow_negative_numbers = true)]
    pub scan_time: Option<f64>,

    /// Change in the process variable [default: 0.045]
    #[arg(long, allow_negative_numbers = true)]
    pub delta_pv: Option<f64>,

    /// Change in the manipulated variable [default: 0.08333]
    #[arg(long, allow_negative_numbers = true)]
    pub delta_mv: Option<f64>,

    /// Measured hysteresis; accepted but not used [default: 0.0447]
    #[arg(long, allow_negative_numbers = true)]
    pub hysteresis: Option<f64>,

    /// Time of the MV step in seconds [default: 0.0]
    #[arg(long, allow_negative_numbers = true)]
    pub t0: Option<f64>,

    /// Time at 25% of the PV response in seconds [default: 0.21]
    #[arg(long, allow_negative_numbers = true)]
    pub t25: Option<f64>,

    /// Time at 75% of the PV response in seconds [default: 0.63]
    #[arg(long, allow_negative_numbers = true)]
    pub t75: Option<f64>,

    /// TOML tuning profile supplying any of the inputs above
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the resolved inputs to this profile after a successful run
    #[arg(long)]
    pub save_profile: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Show the derived process characteristics and debug logs
    #[arg(short, long)]
    pub verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Structured logging to stderr.
///
/// The filter comes from `RUST_LOG`, defaulting to `warn` (or `debug` with
/// `--verbose`). Set `LOOPTUNE_LOG_FORMAT=json` for newline-delimited JSON.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    if std::env::var("LOOPTUNE_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .compact()
            .init();
    }
}

/// Resolve inputs, run the calculation and render the report.
fn run(args: &Args) -> Result<String, TuneError> {
    let base = match &args.config {
        Some(path) => {
            info!(path = %path.display(), "loading tuning profile");
            config::load_from(path)?
        }
        None => Profile::default(),
    };
    let profile = resolve_profile(args, base);
    debug!(?profile, "resolved tuning inputs");

    let objective: Objective = profile.tune_for.parse()?;
    let loop_type: LoopType = profile.loop_type.parse()?;
    let report = looptune_core::tune(objective, loop_type, &profile.sample())?;

    if let Some(path) = &args.save_profile {
        config::save_to(&profile, path)?;
        info!(path = %path.display(), "saved tuning profile");
    }

    match args.format {
        OutputFormat::Text => Ok(report::render_text(&report, args.verbose)),
        OutputFormat::Json => report::render_json(&report),
    }
}

/// Overlay explicitly given flags on top of `base`.
fn resolve_profile(args: &Args, base: Profile) -> Profile {
    Profile {
        tune_for: args.tune_for.clone().unwrap_or(base.tune_for),
        loop_type: args.loop_type.clone().unwrap_or(base.loop_type),
        scan_time: args.scan_time.unwrap_or(base.scan_time),
        delta_pv: args.delta_pv.unwrap_or(base.delta_pv),
        delta_mv: args.delta_mv.unwrap_or(base.delta_mv),
        hysteresis: args.hysteresis.unwrap_or(base.hysteresis),
        t0: args.t0.unwrap_or(base.t0),
        t25: args.t25.unwrap_or(base.t25),
        t75: args.t75.unwrap_or(base.t75),
    }
}
