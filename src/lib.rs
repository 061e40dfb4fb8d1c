//! spcgen: synthetic SPC measurement datasets
//!
//! Generates Statistical Process Control measurements with realistic
//! in-control, out-of-control and out-of-spec shares, and groups arbitrary
//! record collections into nested aggregates for charting.

pub mod cli;
pub mod core;
pub mod entities;

pub use crate::core::{
    generate_dataset, generate_lot_id, group_by, group_by_multi, group_by_multi_with,
    group_by_with, sample,
};
pub use crate::entities::{Annotation, MeasurementRecord};
