//! Entity type definitions

pub mod measurement;

pub use measurement::{Annotation, MeasurementRecord};
