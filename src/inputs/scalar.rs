//! Numeric input leaves that may carry a sweep range
//!
//! On the wire a leaf is either a bare number or
//! `{ "value": v, "range": { "min", "max", "default", "useRange" } }`.
//! Both shapes are normalized once at deserialization time.

use serde::{Deserialize, Serialize};

/// A numeric input, optionally marked as sweepable
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "ScalarRepr", into = "ScalarRepr")]
pub enum Scalar {
    /// Plain value with no range attached
    Fixed(f64),
    /// Value with a sweep range; `enabled` mirrors the `useRange` toggle
    Ranged {
        value: f64,
        min: f64,
        max: f64,
        default: f64,
        enabled: bool,
    },
}

impl Scalar {
    pub fn value(&self) -> f64 {
        match *self {
            Scalar::Fixed(value) => value,
            Scalar::Ranged { value, .. } => value,
        }
    }

    /// Copy of this scalar with its value replaced; range metadata is kept
    pub fn with_value(self, new_value: f64) -> Self {
        match self {
            Scalar::Fixed(_) => Scalar::Fixed(new_value),
            Scalar::Ranged { min, max, default, enabled, .. } => Scalar::Ranged {
                value: new_value,
                min,
                max,
                default,
                enabled,
            },
        }
    }

    /// `(min, max)` when a range is attached and switched on
    pub fn active_range(&self) -> Option<(f64, f64)> {
        match *self {
            Scalar::Ranged { min, max, enabled: true, .. } => Some((min, max)),
            _ => None,
        }
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Fixed(value)
    }
}

impl Default for Scalar {
    fn default() -> Self {
        Scalar::Fixed(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ScalarRepr {
    Plain(f64),
    Object {
        value: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<RangeRepr>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RangeRepr {
    min: f64,
    max: f64,
    default: f64,
    #[serde(default)]
    use_range: bool,
}

impl From<ScalarRepr> for Scalar {
    fn from(repr: ScalarRepr) -> Self {
        match repr {
            ScalarRepr::Plain(value) => Scalar::Fixed(value),
            ScalarRepr::Object { value, range: None } => Scalar::Fixed(value),
            ScalarRepr::Object { value, range: Some(range) } => Scalar::Ranged {
                value,
                min: range.min,
                max: range.max,
                default: range.default,
                enabled: range.use_range,
            },
        }
    }
}

impl From<Scalar> for ScalarRepr {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Fixed(value) => ScalarRepr::Plain(value),
            Scalar::Ranged { value, min, max, default, enabled } => ScalarRepr::Object {
                value,
                range: Some(RangeRepr {
                    min,
                    max,
                    default,
                    use_range: enabled,
                }),
            },
        }
    }
}
