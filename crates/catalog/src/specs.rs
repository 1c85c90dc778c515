//! Category-specific product attributes.
//!
//! Parts from different categories carry different technical specs (a CPU has a
//! socket, a GPU has VRAM, a PSU has a wattage). Instead of one rigid column per
//! attribute, products keep an open `attribute -> value` map that is checked at
//! the boundary against a fixed table of known attribute names and kinds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use rigshop_core::FieldViolation;

/// Open attribute map, flattened into the product's JSON representation.
pub type Specs = BTreeMap<String, SpecValue>;

/// A single spec attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpecValue {
    Number(f64),
    Text(String),
}

impl SpecValue {
    pub fn kind(&self) -> SpecKind {
        match self {
            SpecValue::Number(_) => SpecKind::Number,
            SpecValue::Text(_) => SpecKind::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecKind {
    Text,
    Number,
}

/// Known spec attributes, grouped by the part family they describe.
pub const SPEC_ATTRIBUTES: &[(&str, SpecKind)] = &[
    // CPU
    ("socket", SpecKind::Text),
    ("cpuSeries", SpecKind::Text),
    ("coresThreads", SpecKind::Text),
    ("baseClock", SpecKind::Text),
    ("boostClock", SpecKind::Text),
    ("cache", SpecKind::Text),
    // GPU
    ("gpuSeries", SpecKind::Text),
    ("gpuModel", SpecKind::Text),
    ("vram", SpecKind::Text),
    ("busWidth", SpecKind::Text),
    ("cudaCores", SpecKind::Number),
    // Mainboard & RAM
    ("chipset", SpecKind::Text),
    ("formFactor", SpecKind::Text),
    ("memoryType", SpecKind::Text),
    ("memorySlot", SpecKind::Number),
    ("maxCapacity", SpecKind::Text),
    // Case
    ("caseType", SpecKind::Text),
    ("maxGpuLength", SpecKind::Text),
    ("maxCpuCoolerHeight", SpecKind::Text),
    ("radiatorSupport", SpecKind::Text),
    // PSU & power
    ("wattage", SpecKind::Text),
    ("efficiencyRating", SpecKind::Text),
    ("powerRequirement", SpecKind::Text),
];

pub fn spec_kind(name: &str) -> Option<SpecKind> {
    SPEC_ATTRIBUTES
        .iter()
        .find(|(attr, _)| *attr == name)
        .map(|(_, kind)| *kind)
}

/// Check every attribute against the schema, collecting one violation per bad key.
pub fn validate_specs(specs: &Specs) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    for (name, value) in specs {
        match spec_kind(name) {
            None => violations.push(FieldViolation::new(
                name.as_str(),
                format!("property {name} should not exist"),
            )),
            Some(SpecKind::Number) => match value {
                SpecValue::Number(n) if n.is_finite() && *n >= 0.0 => {}
                SpecValue::Number(_) => violations.push(FieldViolation::new(
                    name.as_str(),
                    format!("{name} must not be less than 0"),
                )),
                SpecValue::Text(_) => violations.push(FieldViolation::new(
                    name.as_str(),
                    format!("{name} must be a number"),
                )),
            },
            Some(SpecKind::Text) => {
                if value.kind() != SpecKind::Text {
                    violations.push(FieldViolation::new(
                        name.as_str(),
                        format!("{name} must be a string"),
                    ));
                }
            }
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs(pairs: &[(&str, SpecValue)]) -> Specs {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn known_attributes_of_the_right_kind_pass() {
        let s = specs(&[
            ("socket", SpecValue::Text("AM5".into())),
            ("cudaCores", SpecValue::Number(16384.0)),
        ]);
        assert!(validate_specs(&s).is_empty());
    }

    #[test]
    fn unknown_attribute_is_rejected() {
        let s = specs(&[("flux", SpecValue::Text("capacitor".into()))]);
        let v = validate_specs(&s);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].field, "flux");
        assert_eq!(v[0].message, "property flux should not exist");
    }

    #[test]
    fn wrong_kind_is_rejected() {
        let s = specs(&[
            ("memorySlot", SpecValue::Text("four".into())),
            ("vram", SpecValue::Number(24.0)),
        ]);
        let fields: Vec<_> = validate_specs(&s).into_iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["memorySlot", "vram"]);
    }

    #[test]
    fn untagged_values_deserialize_by_json_type() {
        let s: Specs = serde_json::from_str(r#"{"cudaCores": 128, "vram": "8GB"}"#).unwrap();
        assert_eq!(s["cudaCores"], SpecValue::Number(128.0));
        assert_eq!(s["vram"], SpecValue::Text("8GB".into()));
    }
}
