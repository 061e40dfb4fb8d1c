//! Lot identifier generation
//!
//! Lot IDs look like `LOT-250601-0005`: a `YYMMDD` stamp of the day the
//! dataset was generated followed by the zero-padded record sequence.

use crate::core::clock::Clock;

/// Prefix shared by every lot identifier
pub const LOT_PREFIX: &str = "LOT";

/// Build a lot identifier for the given sequence number
///
/// The date component comes from `clock`, not from the record's simulated
/// process time. Sequences above 9999 widen the numeric field.
pub fn generate_lot_id(clock: &dyn Clock, sequence: u32) -> String {
    format!(
        "{}-{}-{:04}",
        LOT_PREFIX,
        clock.today().format("%y%m%d"),
        sequence
    )
}
