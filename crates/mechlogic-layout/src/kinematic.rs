//! # Kinematic Model
//!
//! Logic values are rotation directions. A 2:1 multiplexer routes input A
//! or input B to the output through the dog clutch, chosen by S.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Logic value carried by a shaft's rotation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogicValue {
    /// Clockwise
    Zero,
    /// Counterclockwise
    One,
}

impl LogicValue {
    pub const ALL: [LogicValue; 2] = [LogicValue::Zero, LogicValue::One];

    pub fn as_u8(self) -> u8 {
        match self {
            LogicValue::Zero => 0,
            LogicValue::One => 1,
        }
    }
}

impl From<bool> for LogicValue {
    fn from(value: bool) -> Self {
        if value {
            LogicValue::One
        } else {
            LogicValue::Zero
        }
    }
}

impl fmt::Display for LogicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// A path through the gear train from an input to an output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GearPath {
    pub path_id: String,
    pub input: String,
    pub output: String,
    /// Part ids along the path.
    pub gear_stages: Vec<String>,
    /// Combined ratio, negative when the direction inverts.
    pub total_ratio: f64,
}

/// Truth table and gear paths of a logic element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KinematicModel {
    /// `(A, B, S) -> O`
    pub truth_table: BTreeMap<(LogicValue, LogicValue, LogicValue), LogicValue>,
    pub paths: BTreeMap<String, GearPath>,
    /// Active path id for each S value.
    pub active_paths: BTreeMap<LogicValue, String>,
}

impl KinematicModel {
    /// 2:1 multiplexer, `O = S ? B : A`.
    pub fn mux() -> Self {
        let mut model = Self::default();
        for (id, input, gear) in [("path_a", "a", "gear_a"), ("path_b", "b", "gear_b")] {
            model.paths.insert(
                id.to_string(),
                GearPath {
                    path_id: id.to_string(),
                    input: input.to_string(),
                    output: "o".to_string(),
                    gear_stages: vec![gear.to_string(), "dog_clutch".to_string()],
                    total_ratio: 1.0,
                },
            );
        }
        model
            .active_paths
            .insert(LogicValue::Zero, "path_a".to_string());
        model
            .active_paths
            .insert(LogicValue::One, "path_b".to_string());

        for a in LogicValue::ALL {
            for b in LogicValue::ALL {
                model.truth_table.insert((a, b, LogicValue::Zero), a);
                model.truth_table.insert((a, b, LogicValue::One), b);
            }
        }
        model
    }

    /// Expected output for the given inputs.
    pub fn output(&self, a: LogicValue, b: LogicValue, s: LogicValue) -> Option<LogicValue> {
        self.truth_table.get(&(a, b, s)).copied()
    }

    /// Gear path engaged for a select value.
    pub fn active_path(&self, s: LogicValue) -> Option<&GearPath> {
        self.active_paths
            .get(&s)
            .and_then(|path_id| self.paths.get(path_id))
    }

    /// Check that the table is complete and behaves as a multiplexer.
    ///
    /// Returns one message per problem; an empty list means the table is valid.
    pub fn verify(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for a in LogicValue::ALL {
            for b in LogicValue::ALL {
                for s in LogicValue::ALL {
                    if !self.truth_table.contains_key(&(a, b, s)) {
                        errors.push(format!(
                            "Missing truth table entry for (A={}, B={}, S={})",
                            a, b, s
                        ));
                    }
                }
            }
        }
        for a in LogicValue::ALL {
            for b in LogicValue::ALL {
                for (s, expected) in [(LogicValue::Zero, a), (LogicValue::One, b)] {
                    if let Some(actual) = self.output(a, b, s) {
                        if actual != expected {
                            errors.push(format!(
                                "MUX violation at (A={}, B={}, S={}): expected O={}, got O={}",
                                a, b, s, expected, actual
                            ));
                        }
                    }
                }
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mux_truth_table() {
        let model = KinematicModel::mux();
        assert!(model.verify().is_empty());
        assert_eq!(model.truth_table.len(), 8);
        for a in LogicValue::ALL {
            for b in LogicValue::ALL {
                assert_eq!(model.output(a, b, LogicValue::Zero), Some(a));
                assert_eq!(model.output(a, b, LogicValue::One), Some(b));
            }
        }
    }

    #[test]
    fn test_active_path() {
        let model = KinematicModel::mux();
        let path = model.active_path(LogicValue::One).unwrap();
        assert_eq!(path.input, "b");
        assert_eq!(path.gear_stages, vec!["gear_b", "dog_clutch"]);
    }

    #[test]
    fn test_verify_reports_violation_and_gap() {
        let mut model = KinematicModel::mux();
        model.truth_table.insert(
            (LogicValue::One, LogicValue::Zero, LogicValue::Zero),
            LogicValue::Zero,
        );
        model
            .truth_table
            .remove(&(LogicValue::Zero, LogicValue::Zero, LogicValue::One));
        let errors = model.verify();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains(&"Missing truth table entry for (A=0, B=0, S=1)".to_string()));
        assert!(errors
            .contains(&"MUX violation at (A=1, B=0, S=0): expected O=1, got O=0".to_string()));
    }

    #[test]
    fn test_logic_value_from_bool() {
        assert_eq!(LogicValue::from(true), LogicValue::One);
        assert_eq!(LogicValue::Zero.to_string(), "0");
    }
}
