//! Console and JSON rendering of a [`TuningReport`].

use std::fmt::Write;

use colored::Colorize;
use looptune_types::{TuneError, TuningReport};

const RULE: &str = "==================";

/// Human-readable report: both unit conventions, plus the derived process
/// model when `verbose` is set.
pub fn render_text(report: &TuningReport, verbose: bool) -> String {
    let mut out = String::new();
    let seconds = &report.gains;
    let minutes = &report.gains_minutes;

    // Writing to a String cannot fail.
    if verbose {
        let c = &report.characteristics;
        let _ = writeln!(out, "{}", "CALCULATION PARAMETERS".bold());
        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(out, "Tune For: {}", report.objective);
        let _ = writeln!(out, "Loop Type: {}", report.loop_type);
        let _ = writeln!(out, "Time Constant: {}", c.time_constant);
        let _ = writeln!(out, "Dead Time: {}", c.dead_time);
        let _ = writeln!(out, "Process Gain: {}", c.process_gain);
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "{}", "Standard PID Units".bold().cyan());
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "P: {}", seconds.p);
    let _ = writeln!(out, "I: {} sec/repeat", seconds.i);
    let _ = writeln!(out, "D: {} sec", seconds.d);
    let _ = writeln!(out);

    let _ = writeln!(out, "{}", "Rockwell PID Units".bold().cyan());
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "P: {}", minutes.p);
    let _ = writeln!(out, "I: {} min/repeat", minutes.i);
    let _ = writeln!(out, "D: {} min", minutes.d);

    out
}

/// Machine-readable report.
pub fn render_json(report: &TuningReport) -> Result<String, TuneError> {
    serde_json::to_string_pretty(report)
        .map_err(|e| TuneError::Output(format!("Failed to serialize report: {}", e)))
}
