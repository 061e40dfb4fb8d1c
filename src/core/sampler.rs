//! Three-regime measurement sampler and limit classification
//!
//! Points are drawn from a mixture that mimics a stable process:
//!
//! | share | regime            | band (multiples of variation) |
//! |-------|-------------------|-------------------------------|
//! | 95%   | in control        | `[-2.5, +2.5]`                |
//! | 4%    | control excursion | `[-3.5, -3.1]` or `[+3.1, +3.5]` |
//! | 1%    | spec excursion    | `[-6.0, -5.1]` or `[+5.1, +6.0]` |
//!
//! Classification uses the exact control (`±3`) and spec (`±5`) thresholds.
//! The bands above never touch those thresholds, so every draw lands in the
//! class matching its regime. Keep the two tables in sync.

use rand::Rng;
use thiserror::Error;

use crate::entities::Annotation;

/// Control limits sit this many variations from target
pub const CONTROL_SIGMA: f64 = 3.0;

/// Spec limits sit this many variations from target
pub const SPEC_SIGMA: f64 = 5.0;

/// Cumulative probability bound of the in-control regime
pub const IN_CONTROL_SHARE: f64 = 0.95;

/// Cumulative probability bound of the control-excursion regime
pub const CONTROL_EXCURSION_SHARE: f64 = 0.99;

const IN_CONTROL_BAND: f64 = 2.5;
const CONTROL_EXCURSION_BAND: (f64, f64) = (3.1, 3.5);
const SPEC_EXCURSION_BAND: (f64, f64) = (5.1, 6.0);

/// Errors raised by the sampler
#[derive(Debug, Error, PartialEq)]
pub enum SampleError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Mixture component a draw comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    InControl,
    ControlExcursion,
    SpecExcursion,
}

impl Regime {
    /// Map a uniform variate in `[0, 1)` to its regime
    pub fn from_uniform(u: f64) -> Self {
        if u <= IN_CONTROL_SHARE {
            Regime::InControl
        } else if u <= CONTROL_EXCURSION_SHARE {
            Regime::ControlExcursion
        } else {
            Regime::SpecExcursion
        }
    }

    /// Annotation every draw from this regime receives
    pub fn expected_annotation(&self) -> Annotation {
        match self {
            Regime::InControl => Annotation::InControl,
            Regime::ControlExcursion => Annotation::OutOfControl,
            Regime::SpecExcursion => Annotation::OutOfSpec,
        }
    }
}

/// Control and spec limits derived from a target and variation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    pub control_lower: f64,
    pub control_upper: f64,
    pub spec_lower: f64,
    pub spec_upper: f64,
}

impl Limits {
    /// Compute limits at `±3` and `±5` variations around `target`
    pub fn new(target: f64, variation: f64) -> Self {
        Self {
            control_lower: target - variation * CONTROL_SIGMA,
            control_upper: target + variation * CONTROL_SIGMA,
            spec_lower: target - variation * SPEC_SIGMA,
            spec_upper: target + variation * SPEC_SIGMA,
        }
    }

    /// Classify a point; spec breaches take precedence over control breaches
    pub fn classify(&self, point: f64) -> Annotation {
        if point < self.spec_lower || point > self.spec_upper {
            Annotation::OutOfSpec
        } else if point < self.control_lower || point > self.control_upper {
            Annotation::OutOfControl
        } else {
            Annotation::InControl
        }
    }
}

fn validate(target: f64, variation: f64) -> Result<(), SampleError> {
    if !target.is_finite() {
        return Err(SampleError::InvalidArgument(format!(
            "target must be finite, got {}",
            target
        )));
    }
    if !variation.is_finite() || variation <= 0.0 {
        return Err(SampleError::InvalidArgument(format!(
            "variation must be a positive finite number, got {}",
            variation
        )));
    }
    Ok(())
}

/// Draw uniformly from one of two mirrored bands `[t - hi·v, t - lo·v]` / `[t + lo·v, t + hi·v]`
fn sample_mirrored<R: Rng + ?Sized>(
    target: f64,
    variation: f64,
    (lo, hi): (f64, f64),
    rng: &mut R,
) -> f64 {
    if rng.random_bool(0.5) {
        rng.random_range((target - variation * hi)..=(target - variation * lo))
    } else {
        rng.random_range((target + variation * lo)..=(target + variation * hi))
    }
}

/// Draw a point from a known regime
pub fn sample_regime<R: Rng + ?Sized>(
    regime: Regime,
    target: f64,
    variation: f64,
    rng: &mut R,
) -> Result<f64, SampleError> {
    validate(target, variation)?;

    let point = match regime {
        Regime::InControl => rng.random_range(
            (target - variation * IN_CONTROL_BAND)..=(target + variation * IN_CONTROL_BAND),
        ),
        Regime::ControlExcursion => {
            sample_mirrored(target, variation, CONTROL_EXCURSION_BAND, rng)
        }
        Regime::SpecExcursion => sample_mirrored(target, variation, SPEC_EXCURSION_BAND, rng),
    };

    Ok(point)
}

/// Draw one simulated measurement around `target`
///
/// Returns `InvalidArgument` when `variation` is not strictly positive or
/// either argument is not finite.
pub fn sample<R: Rng + ?Sized>(target: f64, variation: f64, rng: &mut R) -> Result<f64, SampleError> {
    validate(target, variation)?;
    let u: f64 = rng.random();
    sample_regime(Regime::from_uniform(u), target, variation, rng)
}
