//! Shape calculator: the six supported shapes, their parameter sets, and the
//! closed-form area/volume formulas.
//!
//! Parameters are modelled as a tagged variant per shape so that an
//! incomplete or malformed submission is rejected at construction and never
//! reaches persistence.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::json;

/// The supported shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Square,
    Triangle,
    Circle,
    Cube,
    Pyramid,
    Cylinder,
}

/// Whether a shape's formula yields an area or a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Area,
    Volume,
}

impl Shape {
    /// All shapes, in presentation order (area shapes first).
    pub const ALL: [Shape; 6] = [
        Shape::Square,
        Shape::Triangle,
        Shape::Circle,
        Shape::Cube,
        Shape::Pyramid,
        Shape::Cylinder,
    ];

    /// The category is a pure function of the shape.
    pub fn category(self) -> Category {
        match self {
            Shape::Square | Shape::Triangle | Shape::Circle => Category::Area,
            Shape::Cube | Shape::Pyramid | Shape::Cylinder => Category::Volume,
        }
    }

    /// Stable wire name, matching the stored `shape` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Shape::Square => "square",
            Shape::Triangle => "triangle",
            Shape::Circle => "circle",
            Shape::Cube => "cube",
            Shape::Pyramid => "pyramid",
            Shape::Cylinder => "cylinder",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Shape {
    type Err = InvalidParameters;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "square" => Ok(Shape::Square),
            "triangle" => Ok(Shape::Triangle),
            "circle" => Ok(Shape::Circle),
            "cube" => Ok(Shape::Cube),
            "pyramid" => Ok(Shape::Pyramid),
            "cylinder" => Ok(Shape::Cylinder),
            _ => Err(InvalidParameters::UnknownShape {
                name: value.to_owned(),
            }),
        }
    }
}

impl Category {
    /// Stable wire name, matching the stored `type` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Area => "area",
            Category::Volume => "volume",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "area" => Ok(Category::Area),
            "volume" => Ok(Category::Volume),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// Rejection reasons for a shape submission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidParameters {
    /// The shape name is not one of the six supported shapes.
    #[error("unknown shape: {name}")]
    UnknownShape { name: String },
    /// A required parameter is absent from the submission.
    #[error("missing parameter: {field}")]
    Missing { field: &'static str },
    /// A parameter is present but is not a finite non-negative number.
    #[error("parameter {field} is not a valid length: {value}")]
    NotALength { field: &'static str, value: String },
}

/// Validated parameters for one shape, carrying exactly the lengths its
/// formula needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeParams {
    Square { side: f64 },
    Triangle { base: f64, height: f64 },
    Circle { radius: f64 },
    Cube { side: f64 },
    Pyramid { base_side: f64, height: f64 },
    Cylinder { radius: f64, height: f64 },
}

/// Result of evaluating a shape formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Computation {
    pub result: f64,
    pub category: Category,
}

fn required(raw: &HashMap<String, String>, field: &'static str) -> Result<f64, InvalidParameters> {
    let value = raw
        .get(field)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or(InvalidParameters::Missing { field })?;
    let parsed: f64 = value.parse().map_err(|_| InvalidParameters::NotALength {
        field,
        value: value.to_owned(),
    })?;
    if !parsed.is_finite() || parsed < 0.0 {
        return Err(InvalidParameters::NotALength {
            field,
            value: value.to_owned(),
        });
    }
    Ok(parsed)
}

impl ShapeParams {
    /// Parse raw form values (keyed `s`, `a`, `t`, `r`, `h`) for `shape`.
    ///
    /// Rejects missing parameters and values that do not parse to a finite
    /// non-negative number. Extra keys are ignored.
    pub fn from_raw(
        shape: Shape,
        raw: &HashMap<String, String>,
    ) -> Result<Self, InvalidParameters> {
        match shape {
            Shape::Square => Ok(ShapeParams::Square {
                side: required(raw, "s")?,
            }),
            Shape::Triangle => Ok(ShapeParams::Triangle {
                base: required(raw, "a")?,
                height: required(raw, "t")?,
            }),
            Shape::Circle => Ok(ShapeParams::Circle {
                radius: required(raw, "r")?,
            }),
            Shape::Cube => Ok(ShapeParams::Cube {
                side: required(raw, "s")?,
            }),
            Shape::Pyramid => Ok(ShapeParams::Pyramid {
                base_side: required(raw, "s")?,
                height: required(raw, "t")?,
            }),
            Shape::Cylinder => Ok(ShapeParams::Cylinder {
                radius: required(raw, "r")?,
                height: required(raw, "h")?,
            }),
        }
    }

    /// The shape these parameters belong to.
    pub fn shape(&self) -> Shape {
        match self {
            ShapeParams::Square { .. } => Shape::Square,
            ShapeParams::Triangle { .. } => Shape::Triangle,
            ShapeParams::Circle { .. } => Shape::Circle,
            ShapeParams::Cube { .. } => Shape::Cube,
            ShapeParams::Pyramid { .. } => Shape::Pyramid,
            ShapeParams::Cylinder { .. } => Shape::Cylinder,
        }
    }

    /// Evaluate the formula. Accepted inputs always yield a finite,
    /// non-negative result.
    pub fn compute(&self) -> Computation {
        let result = match *self {
            ShapeParams::Square { side } => side * side,
            ShapeParams::Triangle { base, height } => 0.5 * base * height,
            ShapeParams::Circle { radius } => PI * radius * radius,
            ShapeParams::Cube { side } => side * side * side,
            ShapeParams::Pyramid { base_side, height } => base_side * base_side * height / 3.0,
            ShapeParams::Cylinder { radius, height } => PI * radius * radius * height,
        };
        Computation {
            result,
            category: self.shape().category(),
        }
    }

    /// Persistence form: the short parameter keys mapped to the submitted
    /// values, rendered as numeric strings like the original form fields.
    pub fn to_json(&self) -> serde_json::Value {
        match *self {
            ShapeParams::Square { side } | ShapeParams::Cube { side } => {
                json!({ "s": side.to_string() })
            }
            ShapeParams::Triangle { base, height } => {
                json!({ "a": base.to_string(), "t": height.to_string() })
            }
            ShapeParams::Circle { radius } => json!({ "r": radius.to_string() }),
            ShapeParams::Pyramid { base_side, height } => {
                json!({ "s": base_side.to_string(), "t": height.to_string() })
            }
            ShapeParams::Cylinder { radius, height } => {
                json!({ "r": radius.to_string(), "h": height.to_string() })
            }
        }
    }
}

#[cfg(test)]
#[path = "shape_tests.rs"]
mod tests;
