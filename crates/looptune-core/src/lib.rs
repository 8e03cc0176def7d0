//! `looptune-core` – open-loop PID tuning from a reaction curve.
//!
//! # Modules
//!
//! - [`constants`] – the static correlation table: `(A, B)` pairs per term,
//!   keyed by [`Objective`][looptune_types::Objective] and
//!   [`LoopType`][looptune_types::LoopType].
//! - [`calculator`] – [`calculate_loop_gains`]: derives process gain, time
//!   constant and dead time from a
//!   [`ReactionCurveSample`][looptune_types::ReactionCurveSample] and turns
//!   them into a [`GainTriple`][looptune_types::GainTriple]. [`tune`] returns
//!   the same gains together with the derived characteristics.

pub mod calculator;
pub mod constants;

pub use calculator::{calculate_loop_gains, calculate_loop_gains_str, derive_characteristics, tune};
pub use constants::{tuning_constants, CoefficientSet, TermCoefficients};
