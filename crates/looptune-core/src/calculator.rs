//! Open-loop gain calculation from a reaction curve.
//!
//! The calculation is a single straight-line pass:
//!
//! 1. Derive the first-order-plus-dead-time model
//!    ([`DerivedCharacteristics`]) from the [`ReactionCurveSample`].
//! 2. Look up the correlation coefficients for the objective and loop type.
//! 3. Evaluate each active term from the ratio `r = dead_time / time_constant`:
//!    - `P = A_p · r^B_p / process_gain`
//!    - `I = time_constant / (A_i · r^B_i)`
//!    - `D = A_d · r^B_d · time_constant`
//!
//! Inactive terms are reported as exactly `0.0`. Nothing here holds state,
//! so every function is safe to call from any number of threads.

use looptune_types::{
    DerivedCharacteristics, GainTriple, LoopType, Objective, Quantity, ReactionCurveSample,
    TuneError, TuningReport,
};
use tracing::debug;

use crate::constants::{tuning_constants, TermCoefficients};

/// Fraction of the 25 %–75 % rise interval taken as the time constant.
const TIME_CONSTANT_FACTOR: f64 = 0.9;

/// Multiple of the time constant subtracted from the t0–t75 interval to get
/// the dead time.
const DEAD_TIME_FACTOR: f64 = 1.4;

/// Derive process gain, time constant and dead time from a step test.
///
/// # Errors
///
/// [`TuneError::DegenerateInputs`] when the process gain or time constant is
/// zero or not finite (e.g. `delta_mv == 0` or `t25 == t75`), since both end
/// up as divisors in the gain formulas.
pub fn derive_characteristics(
    sample: &ReactionCurveSample,
) -> Result<DerivedCharacteristics, TuneError> {
    let process_gain = sample.delta_pv / sample.delta_mv;
    let time_constant = TIME_CONSTANT_FACTOR * (sample.t75 - sample.t25);
    let dead_time = (sample.t75 - sample.t0) - DEAD_TIME_FACTOR * time_constant + sample.scan_time;

    ensure_divisor(Quantity::ProcessGain, process_gain)?;
    ensure_divisor(Quantity::TimeConstant, time_constant)?;

    Ok(DerivedCharacteristics {
        process_gain,
        time_constant,
        dead_time,
    })
}

/// Run a full tuning pass and return the gains together with the derived
/// characteristics they were computed from.
///
/// # Example
///
/// ```
/// use looptune_core::tune;
/// use looptune_types::{LoopType, Objective, ReactionCurveSample};
///
/// let sample = ReactionCurveSample {
///     scan_time: 0.01,
///     delta_pv: 0.045,
///     delta_mv: 0.08333,
///     hysteresis: 0.0447,
///     t0: 0.0,
///     t25: 0.21,
///     t75: 0.63,
/// };
/// let report = tune(Objective::LoadChange, LoopType::PI, &sample).unwrap();
/// assert_eq!(report.gains.d, 0.0);
/// assert_eq!(report.gains_minutes.i, report.gains.i / 60.0);
/// ```
pub fn tune(
    objective: Objective,
    loop_type: LoopType,
    sample: &ReactionCurveSample,
) -> Result<TuningReport, TuneError> {
    let characteristics = derive_characteristics(sample)?;
    debug!(
        process_gain = characteristics.process_gain,
        time_constant = characteristics.time_constant,
        dead_time = characteristics.dead_time,
        "derived process characteristics"
    );

    let unsupported = || TuneError::UnsupportedCombination {
        objective,
        loop_type,
    };
    let coefficients = tuning_constants(objective, loop_type).ok_or_else(unsupported)?;

    let ratio = characteristics.ratio();

    let p_term = coefficients.p.ok_or_else(unsupported)?;
    let p = p_term.apply(ratio) / characteristics.process_gain;
    ensure_finite(Quantity::ProportionalGain, p)?;

    let i = if loop_type.has_integral() {
        let i_term = coefficients.i.ok_or_else(unsupported)?;
        integral_gain(&i_term, ratio, characteristics.time_constant)?
    } else {
        0.0
    };

    let d = if loop_type.has_derivative() {
        let d_term = coefficients.d.ok_or_else(unsupported)?;
        let d = d_term.apply(ratio) * characteristics.time_constant;
        ensure_finite(Quantity::DerivativeGain, d)?;
        d
    } else {
        0.0
    };

    let gains = GainTriple::new(p, i, d);
    debug!(%objective, %loop_type, ratio, p, i, d, "computed loop gains");

    Ok(TuningReport {
        objective,
        loop_type,
        sample: *sample,
        characteristics,
        gains,
        gains_minutes: gains.to_minutes(),
    })
}

/// Compute the (P, I, D) gains for one loop.
///
/// `sample.hysteresis` is carried for completeness and does not affect the
/// result.
///
/// # Errors
///
/// - [`TuneError::UnsupportedCombination`] for a P loop tuned for setpoint
///   change.
/// - [`TuneError::DegenerateInputs`] when a divisor is zero or a gain would
///   not be finite.
pub fn calculate_loop_gains(
    objective: Objective,
    loop_type: LoopType,
    sample: &ReactionCurveSample,
) -> Result<GainTriple, TuneError> {
    tune(objective, loop_type, sample).map(|report| report.gains)
}

/// [`calculate_loop_gains`] with string selectors, e.g. `"load_change"` and
/// `"PID"`.
///
/// # Errors
///
/// [`TuneError::InvalidSelector`] for an unrecognized `tune_for` or
/// `loop_type`, in addition to the errors of [`calculate_loop_gains`].
pub fn calculate_loop_gains_str(
    tune_for: &str,
    loop_type: &str,
    sample: &ReactionCurveSample,
) -> Result<GainTriple, TuneError> {
    let objective: Objective = tune_for.parse()?;
    let loop_type: LoopType = loop_type.parse()?;
    calculate_loop_gains(objective, loop_type, sample)
}

fn integral_gain(term: &TermCoefficients, ratio: f64, time_constant: f64) -> Result<f64, TuneError> {
    let denominator = term.apply(ratio);
    if denominator == 0.0 {
        return Err(TuneError::DegenerateInputs {
            quantity: Quantity::IntegralGain,
            value: f64::INFINITY,
        });
    }
    let i = time_constant / denominator;
    ensure_finite(Quantity::IntegralGain, i)?;
    Ok(i)
}

fn ensure_divisor(quantity: Quantity, value: f64) -> Result<(), TuneError> {
    if value == 0.0 || !value.is_finite() {
        return Err(TuneError::DegenerateInputs { quantity, value });
    }
    Ok(())
}

fn ensure_finite(quantity: Quantity, value: f64) -> Result<(), TuneError> {
    if !value.is_finite() {
        return Err(TuneError::DegenerateInputs { quantity, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_sample() -> ReactionCurveSample {
        ReactionCurveSample {
            scan_time: 0.01,
            delta_pv: 0.045,
            delta_mv: 0.08333,
            hysteresis: 0.0447,
            t0: 0.0,
            t25: 0.21,
            t75: 0.63,
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        let tolerance = 1e-9 * expected.abs().max(1.0);
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn derived_characteristics_follow_formulas() {
        let c = derive_characteristics(&default_sample()).unwrap();
        assert_close(c.process_gain, 0.045 / 0.08333);
        assert_close(c.time_constant, 0.378);
        assert_close(c.dead_time, 0.1108);
        assert!((c.process_gain - 0.54002).abs() < 1e-5);
    }

    #[test]
    fn load_change_pid_matches_hand_calculation() {
        let gains =
            calculate_loop_gains(Objective::LoadChange, LoopType::PID, &default_sample()).unwrap();

        let pg = 0.045 / 0.08333;
        let tc = 0.9 * (0.63 - 0.21);
        let dt = (0.63 - 0.0) - 1.4 * tc + 0.01;
        let r: f64 = dt / tc;

        assert_close(gains.p, 1.435 * r.powf(-0.921) / pg);
        assert_close(gains.i, tc / (0.8787 * r.powf(-0.749)));
        assert_close(gains.d, 0.482 * r.powf(1.137) * tc);

        assert!((gains.p - 8.22791).abs() < 1e-4);
        assert!((gains.i - 0.171581).abs() < 1e-5);
        assert!((gains.d - 0.045141).abs() < 1e-5);
    }

    #[test]
    fn setpoint_change_pid_matches_hand_calculation() {
        let gains =
            calculate_loop_gains(Objective::SetpointChange, LoopType::PID, &default_sample())
                .unwrap();
        assert!((gains.p - 5.84190).abs() < 1e-4);
        assert!((gains.i - 0.435488).abs() < 1e-5);
        assert!((gains.d - 0.042850).abs() < 1e-5);
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let sample = default_sample();
        for objective in Objective::ALL {
            for loop_type in LoopType::ALL {
                let first = calculate_loop_gains(objective, loop_type, &sample);
                let second = calculate_loop_gains(objective, loop_type, &sample);
                match (first, second) {
                    (Ok(a), Ok(b)) => {
                        assert_eq!(a.p.to_bits(), b.p.to_bits());
                        assert_eq!(a.i.to_bits(), b.i.to_bits());
                        assert_eq!(a.d.to_bits(), b.d.to_bits());
                    }
                    (Err(a), Err(b)) => assert_eq!(a, b),
                    _ => panic!("{objective}/{loop_type} changed outcome between calls"),
                }
            }
        }
    }

    #[test]
    fn p_loop_has_only_proportional_gain() {
        let gains =
            calculate_loop_gains(Objective::LoadChange, LoopType::P, &default_sample()).unwrap();
        assert!((gains.p - 5.59440).abs() < 1e-4);
        assert_eq!(gains.i, 0.0);
        assert_eq!(gains.d, 0.0);
    }

    #[test]
    fn pi_loop_has_no_derivative_gain() {
        for objective in Objective::ALL {
            let gains = calculate_loop_gains(objective, LoopType::PI, &default_sample()).unwrap();
            assert!(gains.p > 0.0);
            assert!(gains.i > 0.0);
            assert_eq!(gains.d, 0.0, "{objective}");
        }
    }

    #[test]
    fn setpoint_p_is_unsupported() {
        let err = calculate_loop_gains(Objective::SetpointChange, LoopType::P, &default_sample())
            .unwrap_err();
        assert_eq!(
            err,
            TuneError::UnsupportedCombination {
                objective: Objective::SetpointChange,
                loop_type: LoopType::P,
            }
        );
    }

    #[test]
    fn invalid_tune_for_is_rejected() {
        let err = calculate_loop_gains_str("banana", "PID", &default_sample()).unwrap_err();
        assert!(matches!(err, TuneError::InvalidSelector { ref value, .. } if value == "banana"));
    }

    #[test]
    fn invalid_loop_type_is_rejected() {
        let err = calculate_loop_gains_str("load_change", "PD", &default_sample()).unwrap_err();
        assert!(matches!(err, TuneError::InvalidSelector { .. }));
    }

    #[test]
    fn string_selectors_match_typed_selectors() {
        let sample = default_sample();
        let by_str = calculate_loop_gains_str("setpoint_change", "PI", &sample).unwrap();
        let typed = calculate_loop_gains(Objective::SetpointChange, LoopType::PI, &sample).unwrap();
        assert_eq!(by_str, typed);
    }

    #[test]
    fn zero_delta_mv_is_degenerate() {
        let sample = ReactionCurveSample {
            delta_mv: 0.0,
            ..default_sample()
        };
        let err = calculate_loop_gains(Objective::LoadChange, LoopType::PID, &sample).unwrap_err();
        assert!(matches!(
            err,
            TuneError::DegenerateInputs { quantity: Quantity::ProcessGain, .. }
        ));
    }

    #[test]
    fn zero_delta_pv_is_degenerate() {
        let sample = ReactionCurveSample {
            delta_pv: 0.0,
            ..default_sample()
        };
        let err = calculate_loop_gains(Objective::LoadChange, LoopType::P, &sample).unwrap_err();
        assert!(matches!(
            err,
            TuneError::DegenerateInputs { quantity: Quantity::ProcessGain, .. }
        ));
    }

    #[test]
    fn equal_t25_and_t75_is_degenerate() {
        let sample = ReactionCurveSample {
            t25: 0.5,
            t75: 0.5,
            ..default_sample()
        };
        let err = calculate_loop_gains(Objective::LoadChange, LoopType::PID, &sample).unwrap_err();
        assert!(matches!(
            err,
            TuneError::DegenerateInputs { quantity: Quantity::TimeConstant, .. }
        ));
    }

    #[test]
    fn negative_dead_time_never_yields_nan() {
        // t0 after t75 drives the dead time, and so the ratio, negative.
        let sample = ReactionCurveSample {
            t0: 1.0,
            ..default_sample()
        };
        let err = calculate_loop_gains(Objective::LoadChange, LoopType::PID, &sample).unwrap_err();
        assert!(matches!(
            err,
            TuneError::DegenerateInputs { quantity: Quantity::ProportionalGain, .. }
        ));
    }

    #[test]
    fn hysteresis_does_not_affect_gains() {
        let base = default_sample();
        let other = ReactionCurveSample {
            hysteresis: 12.5,
            ..base
        };
        assert_eq!(
            calculate_loop_gains(Objective::SetpointChange, LoopType::PID, &base).unwrap(),
            calculate_loop_gains(Objective::SetpointChange, LoopType::PID, &other).unwrap()
        );
    }

    #[test]
    fn minutes_are_seconds_divided_by_sixty() {
        for objective in Objective::ALL {
            for loop_type in LoopType::ALL {
                let Ok(report) = tune(objective, loop_type, &default_sample()) else {
                    continue;
                };
                assert_eq!(report.gains_minutes.p, report.gains.p);
                assert_eq!(report.gains_minutes.i, report.gains.i / 60.0);
                assert_eq!(report.gains_minutes.d, report.gains.d / 60.0);
            }
        }
    }

    #[test]
    fn tune_reports_characteristics_without_changing_gains() {
        let sample = default_sample();
        let report = tune(Objective::LoadChange, LoopType::PID, &sample).unwrap();
        assert_eq!(report.characteristics, derive_characteristics(&sample).unwrap());
        assert_eq!(
            report.gains,
            calculate_loop_gains(Objective::LoadChange, LoopType::PID, &sample).unwrap()
        );
        assert_eq!(report.sample, sample);
    }

    #[test]
    fn calculation_is_callable_across_threads() {
        let sample = default_sample();
        let expected = calculate_loop_gains(Objective::LoadChange, LoopType::PID, &sample).unwrap();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                std::thread::spawn(move || {
                    calculate_loop_gains(Objective::LoadChange, LoopType::PID, &sample).unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }
}
