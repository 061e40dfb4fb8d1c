//! Record synthesizer
//!
//! Builds collections of [`MeasurementRecord`]s by picking categorical
//! attributes, drawing a target and variation, sampling a point and
//! classifying it against the derived limits.

use chrono::Duration;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::debug;

use crate::core::clock::{Clock, SystemClock};
use crate::core::config::DatasetConfig;
use crate::core::lot_id::generate_lot_id;
use crate::core::sampler::{sample, Limits, SampleError};
use crate::entities::{Annotation, MeasurementRecord};

/// Format used for the record timestamp
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Highest wafer number (inclusive)
pub const MAX_WAFER: u32 = 999;

/// Smallest variation whose limits survive rounding to stored precision
///
/// Sampling bands sit `0.1 * variation` from each threshold; that gap must
/// exceed the 0.005 limit-rounding error plus the 0.0005 point-rounding error.
pub const MIN_VARIATION: f64 = 0.06;

/// Errors raised while generating datasets
#[derive(Debug, Error, PartialEq)]
pub enum DatasetError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Sample(#[from] SampleError),
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Validate a caller-supplied record count
pub fn checked_count(count: i64) -> Result<usize, DatasetError> {
    usize::try_from(count).map_err(|_| {
        DatasetError::InvalidArgument(format!("count must be non-negative, got {}", count))
    })
}

fn check_range(name: &str, range: [f64; 2]) -> Result<(), DatasetError> {
    let [lo, hi] = range;
    if !lo.is_finite() || !hi.is_finite() || lo > hi {
        return Err(DatasetError::InvalidArgument(format!(
            "{} must be a finite [min, max] pair, got [{}, {}]",
            name, lo, hi
        )));
    }
    Ok(())
}

fn validate_config(config: &DatasetConfig) -> Result<(), DatasetError> {
    let enumerations = [
        ("facilities", &config.facilities),
        ("generation_nodes", &config.generation_nodes),
        ("metrology_equipment", &config.metrology_equipment),
        ("products", &config.products),
        ("process_equipment", &config.process_equipment),
    ];
    for (name, values) in enumerations {
        if values.is_empty() {
            return Err(DatasetError::InvalidArgument(format!(
                "{} must not be empty",
                name
            )));
        }
    }

    check_range("target_range", config.target_range)?;
    check_range("variation_range", config.variation_range)?;
    if config.variation_range[0] < MIN_VARIATION {
        return Err(DatasetError::InvalidArgument(format!(
            "variation_range minimum must be at least {}, got {}",
            MIN_VARIATION, config.variation_range[0]
        )));
    }

    if config.window_end < config.window_start {
        return Err(DatasetError::InvalidArgument(format!(
            "window_end {} is before window_start {}",
            config.window_end, config.window_start
        )));
    }

    Ok(())
}

/// Generates measurement records from a configuration, clock and RNG
pub struct Synthesizer<C: Clock, R: Rng> {
    config: DatasetConfig,
    clock: C,
    rng: R,
    window_minutes: i64,
}

impl<C: Clock> Synthesizer<C, StdRng> {
    /// Create a reproducible synthesizer from a seed
    pub fn seeded(config: DatasetConfig, clock: C, seed: u64) -> Result<Self, DatasetError> {
        Self::new(config, clock, StdRng::seed_from_u64(seed))
    }
}

impl<C: Clock, R: Rng> Synthesizer<C, R> {
    /// Create a synthesizer, rejecting configurations that cannot produce valid records
    pub fn new(config: DatasetConfig, clock: C, rng: R) -> Result<Self, DatasetError> {
        validate_config(&config)?;
        let window_minutes = (config.window_end - config.window_start).num_minutes();
        Ok(Self {
            config,
            clock,
            rng,
            window_minutes,
        })
    }

    /// Generate exactly `count` records in index order
    pub fn generate(&mut self, count: usize) -> Result<Vec<MeasurementRecord>, DatasetError> {
        let mut records = Vec::with_capacity(count);
        for index in 0..count {
            records.push(self.record(index)?);
        }

        if tracing::enabled!(tracing::Level::DEBUG) {
            let tally = |a: Annotation| records.iter().filter(|r| r.annotation == a).count();
            debug!(
                count,
                in_control = tally(Annotation::InControl),
                ooc = tally(Annotation::OutOfControl),
                oos = tally(Annotation::OutOfSpec),
                "generated dataset"
            );
        }

        Ok(records)
    }

    /// Generate the record at position `index`
    pub fn record(&mut self, index: usize) -> Result<MeasurementRecord, DatasetError> {
        let facility = self.pick(|c| &c.facilities);
        let generation_node = self.pick(|c| &c.generation_nodes);
        let metrology_equipment = self.pick(|c| &c.metrology_equipment);
        let product = self.pick(|c| &c.products);
        let process_equipment = self.pick(|c| &c.process_equipment);

        let [target_lo, target_hi] = self.config.target_range;
        let [var_lo, var_hi] = self.config.variation_range;
        let target = self.rng.random_range(target_lo..=target_hi);
        let variation = self.rng.random_range(var_lo..=var_hi);

        let point = sample(target, variation, &mut self.rng)?;
        let limits = Limits::new(target, variation);
        let annotation = limits.classify(point);

        let wafer_id = format!("WAF-{:03}", self.rng.random_range(1..=MAX_WAFER));
        let sequence = u32::try_from(index).map_err(|_| {
            DatasetError::InvalidArgument(format!("record index {} is out of range", index))
        })?;
        let lot_id = generate_lot_id(&self.clock, sequence);

        let offset = self.rng.random_range(0..=self.window_minutes);
        let timestamp = (self.config.window_start + Duration::minutes(offset))
            .format(TIMESTAMP_FORMAT)
            .to_string();

        Ok(MeasurementRecord {
            facility,
            generation_node,
            product,
            process_equipment,
            metrology_equipment,
            lot_id,
            wafer_id,
            timestamp,
            target,
            control_lower_limit: round_to(limits.control_lower, 2),
            control_upper_limit: round_to(limits.control_upper, 2),
            spec_lower_limit: round_to(limits.spec_lower, 2),
            spec_upper_limit: round_to(limits.spec_upper, 2),
            point: round_to(point, 3),
            annotation,
        })
    }

    fn pick(&mut self, values: impl Fn(&DatasetConfig) -> &Vec<String>) -> String {
        values(&self.config)
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_default()
    }
}

/// Generate `count` records with the default configuration, wall clock and a fresh RNG
///
/// A negative count is rejected before anything is generated.
pub fn generate_dataset(count: i64) -> Result<Vec<MeasurementRecord>, DatasetError> {
    let count = checked_count(count)?;
    let mut synth = Synthesizer::new(DatasetConfig::default(), SystemClock, rand::rng())?;
    synth.generate(count)
}
