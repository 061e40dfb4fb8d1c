//! Measurement record entity
//!
//! One simulated SPC measurement: where it was taken, the limits it is judged
//! against, the measured point and its classification. Serialized field names
//! match what chart consumers read (`fab`, `lcl`, `comment`, ...).

use serde::{Deserialize, Serialize};

use crate::core::grouping::FieldAccess;

/// Classification of a point against its control and spec limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Annotation {
    /// Inside the control limits
    #[default]
    #[serde(rename = "")]
    InControl,
    /// Outside the control limits, inside the spec limits
    #[serde(rename = "OOC Detected")]
    OutOfControl,
    /// Outside the spec limits
    #[serde(rename = "OOS Detected")]
    OutOfSpec,
}

impl Annotation {
    /// Comment text attached to the record
    pub fn as_str(&self) -> &'static str {
        match self {
            Annotation::InControl => "",
            Annotation::OutOfControl => "OOC Detected",
            Annotation::OutOfSpec => "OOS Detected",
        }
    }

    /// Short label for terminal output
    pub fn label(&self) -> &'static str {
        match self {
            Annotation::InControl => "ok",
            Annotation::OutOfControl => "OOC",
            Annotation::OutOfSpec => "OOS",
        }
    }

    /// All annotations, in severity order
    pub fn all() -> &'static [Annotation] {
        &[
            Annotation::InControl,
            Annotation::OutOfControl,
            Annotation::OutOfSpec,
        ]
    }
}

impl std::fmt::Display for Annotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single synthetic measurement
///
/// Records are produced once by the synthesizer and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    /// Fabrication facility
    #[serde(rename = "fab")]
    pub facility: String,

    /// Technology generation node
    #[serde(rename = "generation")]
    pub generation_node: String,

    /// Product code
    pub product: String,

    /// Process tool that produced the wafer
    #[serde(rename = "processEqp")]
    pub process_equipment: String,

    /// Metrology tool that measured the wafer
    #[serde(rename = "metEqp")]
    pub metrology_equipment: String,

    /// Lot identifier (`LOT-YYMMDD-NNNN`)
    #[serde(rename = "lotId")]
    pub lot_id: String,

    /// Wafer identifier (`WAF-NNN`)
    #[serde(rename = "waferId")]
    pub wafer_id: String,

    /// Process time (`YYYY-MM-DD HH:mm:ss`)
    #[serde(rename = "processTime")]
    pub timestamp: String,

    /// Process center value
    pub target: f64,

    /// Lower control limit
    #[serde(rename = "lcl")]
    pub control_lower_limit: f64,

    /// Upper control limit
    #[serde(rename = "ucl")]
    pub control_upper_limit: f64,

    /// Lower spec limit
    #[serde(rename = "lsl")]
    pub spec_lower_limit: f64,

    /// Upper spec limit
    #[serde(rename = "usl")]
    pub spec_upper_limit: f64,

    /// Measured value
    pub point: f64,

    /// Classification of `point`
    #[serde(rename = "comment")]
    pub annotation: Annotation,
}

impl MeasurementRecord {
    /// Whether the point breaches the control limits (OOC or OOS)
    pub fn is_excursion(&self) -> bool {
        self.annotation != Annotation::InControl
    }

    /// Column names in wire order, used for CSV/TSV headers
    pub fn columns() -> &'static [&'static str] {
        &[
            "fab",
            "generation",
            "product",
            "processEqp",
            "metEqp",
            "lotId",
            "waferId",
            "processTime",
            "target",
            "lcl",
            "ucl",
            "lsl",
            "usl",
            "point",
            "comment",
        ]
    }
}

impl FieldAccess for MeasurementRecord {
    fn field(&self, name: &str) -> Option<String> {
        let value = match name {
            "fab" | "facility" => self.facility.clone(),
            "generation" | "generation_node" | "generationNode" => self.generation_node.clone(),
            "product" => self.product.clone(),
            "processEqp" | "process_equipment" | "processEquipment" => {
                self.process_equipment.clone()
            }
            "metEqp" | "metrology_equipment" | "metrologyEquipment" => {
                self.metrology_equipment.clone()
            }
            "lotId" | "lot_id" => self.lot_id.clone(),
            "waferId" | "wafer_id" => self.wafer_id.clone(),
            "processTime" | "timestamp" => self.timestamp.clone(),
            "target" => self.target.to_string(),
            "lcl" | "control_lower_limit" | "controlLowerLimit" => {
                self.control_lower_limit.to_string()
            }
            "ucl" | "control_upper_limit" | "controlUpperLimit" => {
                self.control_upper_limit.to_string()
            }
            "lsl" | "spec_lower_limit" | "specLowerLimit" => self.spec_lower_limit.to_string(),
            "usl" | "spec_upper_limit" | "specUpperLimit" => self.spec_upper_limit.to_string(),
            "point" => self.point.to_string(),
            "comment" | "annotation" => self.annotation.as_str().to_string(),
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> MeasurementRecord {
        MeasurementRecord {
            facility: "fab1".to_string(),
            generation_node: "g2".to_string(),
            product: "A100".to_string(),
            process_equipment: "EQP-001".to_string(),
            metrology_equipment: "MET1-CHA".to_string(),
            lot_id: "LOT-250601-0000".to_string(),
            wafer_id: "WAF-007".to_string(),
            timestamp: "2025-06-03 14:22:00".to_string(),
            target: 100.0,
            control_lower_limit: 94.0,
            control_upper_limit: 106.0,
            spec_lower_limit: 90.0,
            spec_upper_limit: 110.0,
            point: 106.5,
            annotation: Annotation::OutOfControl,
        }
    }

    #[test]
    fn test_annotation_strings() {
        assert_eq!(Annotation::InControl.as_str(), "");
        assert_eq!(Annotation::OutOfControl.as_str(), "OOC Detected");
        assert_eq!(Annotation::OutOfSpec.as_str(), "OOS Detected");
    }

    #[test]
    fn test_annotation_serde_uses_comment_text() {
        let json = serde_json::to_string(&Annotation::OutOfSpec).unwrap();
        assert_eq!(json, "\"OOS Detected\"");
        let parsed: Annotation = serde_json::from_str("\"\"").unwrap();
        assert_eq!(parsed, Annotation::InControl);
    }

    #[test]
    fn test_record_serializes_with_wire_names() {
        let value = serde_json::to_value(sample_record()).unwrap();
        let obj = value.as_object().unwrap();
        let mut keys: Vec<&str> = obj.keys().map(|k| k.as_str()).collect();
        let mut expected = MeasurementRecord::columns().to_vec();
        keys.sort_unstable();
        expected.sort_unstable();
        assert_eq!(keys, expected);
        assert_eq!(obj["fab"], "fab1");
        assert_eq!(obj["comment"], "OOC Detected");
    }

    #[test]
    fn test_field_access_by_wire_and_rust_names() {
        let record = sample_record();
        assert_eq!(record.field("fab").as_deref(), Some("fab1"));
        assert_eq!(record.field("facility").as_deref(), Some("fab1"));
        assert_eq!(record.field("metEqp").as_deref(), Some("MET1-CHA"));
        assert_eq!(record.field("comment").as_deref(), Some("OOC Detected"));
        assert_eq!(record.field("point").as_deref(), Some("106.5"));
        assert_eq!(record.field("nope"), None);
    }

    #[test]
    fn test_is_excursion() {
        let mut record = sample_record();
        assert!(record.is_excursion());
        record.annotation = Annotation::InControl;
        assert!(!record.is_excursion());
    }
}
