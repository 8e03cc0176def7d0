//! `looptune-types` – value types shared across the looptune workspace.
//!
//! Everything here is plain immutable data: the tuning selectors
//! ([`Objective`], [`LoopType`]), the measured [`ReactionCurveSample`], the
//! [`DerivedCharacteristics`] computed from it, the resulting [`GainTriple`],
//! and the single error type [`TuneError`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Seconds per minute, used to convert the I and D gains between the
/// standard (seconds) and Rockwell (minutes) conventions.
pub const SECONDS_PER_MINUTE: f64 = 60.0;

// ─────────────────────────────────────────────────────────────────────────────
// Selectors
// ─────────────────────────────────────────────────────────────────────────────

/// What the loop is being tuned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Track a step in the set-point.
    SetpointChange,
    /// Reject a load disturbance.
    LoadChange,
}

impl Objective {
    pub const ALL: [Objective; 2] = [Objective::SetpointChange, Objective::LoadChange];

    pub fn as_str(&self) -> &'static str {
        match self {
            Objective::SetpointChange => "setpoint_change",
            Objective::LoadChange => "load_change",
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Objective {
    type Err = TuneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "setpoint_change" => Ok(Objective::SetpointChange),
            "load_change" => Ok(Objective::LoadChange),
            other => Err(TuneError::InvalidSelector {
                selector: Selector::TuneFor,
                value: other.to_string(),
            }),
        }
    }
}

/// Which controller terms are in play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoopType {
    P,
    PI,
    PID,
}

impl LoopType {
    pub const ALL: [LoopType; 3] = [LoopType::P, LoopType::PI, LoopType::PID];

    pub fn as_str(&self) -> &'static str {
        match self {
            LoopType::P => "P",
            LoopType::PI => "PI",
            LoopType::PID => "PID",
        }
    }

    /// `true` for loops with an integral term.
    pub fn has_integral(&self) -> bool {
        matches!(self, LoopType::PI | LoopType::PID)
    }

    /// `true` for loops with a derivative term.
    pub fn has_derivative(&self) -> bool {
        matches!(self, LoopType::PID)
    }
}

impl fmt::Display for LoopType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoopType {
    type Err = TuneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "P" => Ok(LoopType::P),
            "PI" => Ok(LoopType::PI),
            "PID" => Ok(LoopType::PID),
            other => Err(TuneError::InvalidSelector {
                selector: Selector::LoopType,
                value: other.to_string(),
            }),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Measurements and results
// ─────────────────────────────────────────────────────────────────────────────

/// One open-loop step test, read off the reaction curve.
///
/// Times are in seconds; `delta_pv` and `delta_mv` share whatever engineering
/// unit (percent, normalized) the loop uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReactionCurveSample {
    /// Controller scan period.
    pub scan_time: f64,
    /// Change in the process variable over the test.
    pub delta_pv: f64,
    /// Size of the manipulated-variable step.
    pub delta_mv: f64,
    /// Measured valve/actuator hysteresis. Recorded with the sample but not
    /// used by any correlation.
    pub hysteresis: f64,
    /// Time of the MV step.
    pub t0: f64,
    /// Time at which the PV reached 25 % of its total change.
    pub t25: f64,
    /// Time at which the PV reached 75 % of its total change.
    pub t75: f64,
}

/// Process model derived from a [`ReactionCurveSample`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedCharacteristics {
    pub process_gain: f64,
    pub time_constant: f64,
    pub dead_time: f64,
}

impl DerivedCharacteristics {
    /// Dimensionless controllability ratio `dead_time / time_constant`.
    pub fn ratio(&self) -> f64 {
        self.dead_time / self.time_constant
    }
}

/// Proportional, integral and derivative gains.
///
/// Inactive terms are exactly `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GainTriple {
    pub p: f64,
    pub i: f64,
    pub d: f64,
}

impl GainTriple {
    pub fn new(p: f64, i: f64, d: f64) -> Self {
        Self { p, i, d }
    }

    /// Convert seconds-based I (sec/repeat) and D (sec) into minutes.
    /// P is dimensionless and passes through unchanged.
    pub fn to_minutes(&self) -> GainTriple {
        GainTriple {
            p: self.p,
            i: self.i / SECONDS_PER_MINUTE,
            d: self.d / SECONDS_PER_MINUTE,
        }
    }
}

/// Full result of one tuning run, suitable for display or serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuningReport {
    pub objective: Objective,
    pub loop_type: LoopType,
    pub sample: ReactionCurveSample,
    pub characteristics: DerivedCharacteristics,
    /// I in sec/repeat, D in sec.
    pub gains: GainTriple,
    /// I in min/repeat, D in min.
    pub gains_minutes: GainTriple,
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Which string selector failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selector {
    TuneFor,
    LoopType,
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::TuneFor => f.write_str("tune_for"),
            Selector::LoopType => f.write_str("loop_type"),
        }
    }
}

/// A derived quantity that can make the calculation degenerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quantity {
    ProcessGain,
    TimeConstant,
    ProportionalGain,
    IntegralGain,
    DerivativeGain,
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Quantity::ProcessGain => "process gain",
            Quantity::TimeConstant => "time constant",
            Quantity::ProportionalGain => "P gain",
            Quantity::IntegralGain => "I gain",
            Quantity::DerivativeGain => "D gain",
        };
        f.write_str(name)
    }
}

/// Every way a tuning run can fail. All of them are terminal.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TuneError {
    #[error("Unsupported combination: cannot tune a {loop_type} loop for {objective}")]
    UnsupportedCombination {
        objective: Objective,
        loop_type: LoopType,
    },

    #[error("Unrecognized option for {selector}: {value:?}")]
    InvalidSelector { selector: Selector, value: String },

    #[error("Degenerate inputs: {quantity} is {value}")]
    DegenerateInputs { quantity: Quantity, value: f64 },

    #[error("Profile error: {0}")]
    Profile(String),

    #[error("Output error: {0}")]
    Output(String),
}
