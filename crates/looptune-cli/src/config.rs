//! Tuning profiles – optional TOML files holding the nine tuning inputs.
//!
//! Every key is optional; anything missing falls back to the built-in
//! defaults below. Values given on the command line take precedence over the
//! profile.

use std::fs;
use std::path::Path;

use looptune_types::{ReactionCurveSample, TuneError};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TUNE_FOR: &str = "setpoint_change";
pub const DEFAULT_LOOP_TYPE: &str = "PID";
pub const DEFAULT_SCAN_TIME: f64 = 0.01;
pub const DEFAULT_DELTA_PV: f64 = 0.045;
pub const DEFAULT_DELTA_MV: f64 = 0.08333;
pub const DEFAULT_HYSTERESIS: f64 = 0.0447;
pub const DEFAULT_T0: f64 = 0.0;
pub const DEFAULT_T25: f64 = 0.21;
pub const DEFAULT_T75: f64 = 0.63;

/// Tuning inputs as stored in a profile file.
///
/// The selectors stay as strings here so that an unrecognized value in a
/// profile is reported the same way as one typed on the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default = "default_tune_for")]
    pub tune_for: String,

    #[serde(default = "default_loop_type")]
    pub loop_type: String,

    #[serde(default = "default_scan_time")]
    pub scan_time: f64,

    #[serde(default = "default_delta_pv")]
    pub delta_pv: f64,

    #[serde(default = "default_delta_mv")]
    pub delta_mv: f64,

    /// Recorded for completeness; no correlation uses it.
    #[serde(default = "default_hysteresis")]
    pub hysteresis: f64,

    #[serde(default = "default_t0")]
    pub t0: f64,

    #[serde(default = "default_t25")]
    pub t25: f64,

    #[serde(default = "default_t75")]
    pub t75: f64,
}

fn default_tune_for() -> String {
    DEFAULT_TUNE_FOR.to_string()
}
fn default_loop_type() -> String {
    DEFAULT_LOOP_TYPE.to_string()
}
fn default_scan_time() -> f64 {
    DEFAULT_SCAN_TIME
}
fn default_delta_pv() -> f64 {
    DEFAULT_DELTA_PV
}
fn default_delta_mv() -> f64 {
    DEFAULT_DELTA_MV
}
fn default_hysteresis() -> f64 {
    DEFAULT_HYSTERESIS
}
fn default_t0() -> f64 {
    DEFAULT_T0
}
fn default_t25() -> f64 {
    DEFAULT_T25
}
fn default_t75() -> f64 {
    DEFAULT_T75
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            tune_for: default_tune_for(),
            loop_type: default_loop_type(),
            scan_time: DEFAULT_SCAN_TIME,
            delta_pv: DEFAULT_DELTA_PV,
            delta_mv: DEFAULT_DELTA_MV,
            hysteresis: DEFAULT_HYSTERESIS,
            t0: DEFAULT_T0,
            t25: DEFAULT_T25,
            t75: DEFAULT_T75,
        }
    }
}

impl Profile {
    /// The measured part of the profile.
    pub fn sample(&self) -> ReactionCurveSample {
        ReactionCurveSample {
            scan_time: self.scan_time,
            delta_pv: self.delta_pv,
            delta_mv: self.delta_mv,
            hysteresis: self.hysteresis,
            t0: self.t0,
            t25: self.t25,
            t75: self.t75,
        }
    }
}

/// Load a profile from `path`. A missing file is an error: profiles are only
/// read when the user names one.
pub fn load_from(path: &Path) -> Result<Profile, TuneError> {
    let raw = fs::read_to_string(path).map_err(|e| {
        TuneError::Profile(format!("Failed to read profile at {}: {}", path.display(), e))
    })?;
    toml::from_str(&raw).map_err(|e| {
        TuneError::Profile(format!("Failed to parse profile at {}: {}", path.display(), e))
    })
}

/// Write `profile` to `path`, creating parent directories as needed.
pub fn save_to(profile: &Profile, path: &Path) -> Result<(), TuneError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| {
            TuneError::Profile(format!("Failed to create profile directory: {}", e))
        })?;
    }
    let raw = toml::to_string_pretty(profile)
        .map_err(|e| TuneError::Profile(format!("Failed to serialize profile: {}", e)))?;
    fs::write(path, raw).map_err(|e| {
        TuneError::Profile(format!("Failed to write profile at {}: {}", path.display(), e))
    })
}
