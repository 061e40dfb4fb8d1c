//! Shared utilities for CLI commands

use miette::{IntoDiagnostic, Result};
use tracing::debug;

use crate::cli::GlobalOpts;
use crate::core::{checked_count, Clock, Config, FixedClock, SystemClock, Synthesizer};
use crate::entities::MeasurementRecord;

/// Load configuration honoring `--config`
pub fn load_config(global: &GlobalOpts) -> Result<Config> {
    Config::resolve(global.config.as_deref()).map_err(|e| miette::miette!("{}", e))
}

/// Generate records using the configured dataset, `--seed` and `--lot-date`
pub fn generate_records(
    global: &GlobalOpts,
    config: &Config,
    count: Option<i64>,
) -> Result<Vec<MeasurementRecord>> {
    let count = checked_count(count.unwrap_or(config.output.default_count)).into_diagnostic()?;
    let clock = FixedClock(global.lot_date.unwrap_or_else(|| SystemClock.today()));
    debug!(count, seed = ?global.seed, lot_date = %clock.0, "generating records");

    let records = match global.seed {
        Some(seed) => Synthesizer::seeded(config.dataset.clone(), clock, seed)
            .into_diagnostic()?
            .generate(count),
        None => Synthesizer::new(config.dataset.clone(), clock, rand::rng())
            .into_diagnostic()?
            .generate(count),
    };

    records.into_diagnostic()
}
