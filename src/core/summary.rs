//! Reducers for measurement groups
//!
//! Used as the terminal step of a grouping: `count` for any element type and
//! [`GroupSummary`] for measurement records.

use std::borrow::Borrow;

use serde::Serialize;

use crate::entities::{Annotation, MeasurementRecord};

/// Number of elements in a group
pub fn count<T>(group: Vec<T>) -> usize {
    group.len()
}

/// Classification counts and point statistics for a group of records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub count: usize,
    pub in_control: usize,
    pub out_of_control: usize,
    pub out_of_spec: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl GroupSummary {
    /// Summarize owned or borrowed records
    pub fn of<B: Borrow<MeasurementRecord>>(records: &[B]) -> Self {
        let mut summary = GroupSummary {
            count: records.len(),
            in_control: 0,
            out_of_control: 0,
            out_of_spec: 0,
            mean: None,
            min: None,
            max: None,
        };

        let mut sum = 0.0;
        for record in records {
            let record: &MeasurementRecord = record.borrow();
            match record.annotation {
                Annotation::InControl => summary.in_control += 1,
                Annotation::OutOfControl => summary.out_of_control += 1,
                Annotation::OutOfSpec => summary.out_of_spec += 1,
            }
            sum += record.point;
            summary.min = Some(summary.min.map_or(record.point, |m| m.min(record.point)));
            summary.max = Some(summary.max.map_or(record.point, |m| m.max(record.point)));
        }

        if !records.is_empty() {
            summary.mean = Some(sum / records.len() as f64);
        }
        summary
    }

    /// Fraction of records outside the control limits but inside spec
    pub fn ooc_rate(&self) -> f64 {
        self.rate(self.out_of_control)
    }

    /// Fraction of records outside the spec limits
    pub fn oos_rate(&self) -> f64 {
        self.rate(self.out_of_spec)
    }

    fn rate(&self, n: usize) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            n as f64 / self.count as f64
        }
    }
}
