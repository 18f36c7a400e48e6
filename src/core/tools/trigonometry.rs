//! # Trigonometry Tools
//!
//! Angles are in degrees. Forward functions report six decimals, inverse
//! functions four.

use schemars::JsonSchema;
use serde::Deserialize;

use super::format::{fixed, num};
use super::{Tool, ToolError};

/// `cos` values closer to zero than this make the tangent undefined.
const COS_EPSILON: f64 = 1e-10;

#[derive(Deserialize, JsonSchema)]
pub struct AngleArgs {
    /// Angle in degrees
    pub angle: f64,
}

#[derive(Deserialize, JsonSchema)]
pub struct RatioArgs {
    /// The ratio value
    pub value: f64,
}

fn unit_interval(function: &str, value: f64) -> Result<f64, ToolError> {
    if !(-1.0..=1.0).contains(&value) {
        return Err(ToolError::domain(format!(
            "The {function} input must be between -1 and 1 (got {})",
            num(value)
        )));
    }
    Ok(value)
}

// ── Forward ─────────────────────────────────────────────────────────────────

pub struct SineTool;

impl Tool for SineTool {
    const NAME: &'static str = "sine";
    const DESCRIPTION: &'static str = "Calculates the sine of an angle given in degrees.";
    type Args = AngleArgs;

    fn call(&self, args: AngleArgs) -> Result<String, ToolError> {
        let value = args.angle.to_radians().sin();
        Ok(format!("sin({}°) = {}", num(args.angle), fixed(value, 6)))
    }
}

pub struct CosineTool;

impl Tool for CosineTool {
    const NAME: &'static str = "cosine";
    const DESCRIPTION: &'static str = "Calculates the cosine of an angle given in degrees.";
    type Args = AngleArgs;

    fn call(&self, args: AngleArgs) -> Result<String, ToolError> {
        let value = args.angle.to_radians().cos();
        Ok(format!("cos({}°) = {}", num(args.angle), fixed(value, 6)))
    }
}

pub struct TangentTool;

impl Tool for TangentTool {
    const NAME: &'static str = "tangent";
    const DESCRIPTION: &'static str =
        "Calculates the tangent of an angle given in degrees (undefined at 90°, 270°, ...).";
    type Args = AngleArgs;

    fn call(&self, args: AngleArgs) -> Result<String, ToolError> {
        let radians = args.angle.to_radians();
        if radians.cos().abs() < COS_EPSILON {
            return Err(ToolError::domain(format!(
                "tan({}°) is undefined because cos({}°) = 0",
                num(args.angle),
                num(args.angle)
            )));
        }
        Ok(format!("tan({}°) = {}", num(args.angle), fixed(radians.tan(), 6)))
    }
}

// ── Inverse ─────────────────────────────────────────────────────────────────

pub struct ArcsineTool;

impl Tool for ArcsineTool {
    const NAME: &'static str = "arcsine";
    const DESCRIPTION: &'static str =
        "Calculates the inverse sine of a value in [-1, 1], returning degrees.";
    type Args = RatioArgs;

    fn call(&self, args: RatioArgs) -> Result<String, ToolError> {
        let value = unit_interval("arcsine", args.value)?;
        Ok(format!(
            "arcsin({}) = {}°",
            num(value),
            fixed(value.asin().to_degrees(), 4)
        ))
    }
}

pub struct ArccosineTool;

impl Tool for ArccosineTool {
    const NAME: &'static str = "arccosine";
    const DESCRIPTION: &'static str =
        "Calculates the inverse cosine of a value in [-1, 1], returning degrees.";
    type Args = RatioArgs;

    fn call(&self, args: RatioArgs) -> Result<String, ToolError> {
        let value = unit_interval("arccosine", args.value)?;
        Ok(format!(
            "arccos({}) = {}°",
            num(value),
            fixed(value.acos().to_degrees(), 4)
        ))
    }
}

pub struct ArctangentTool;

impl Tool for ArctangentTool {
    const NAME: &'static str = "arctangent";
    const DESCRIPTION: &'static str =
        "Calculates the inverse tangent of any real value, returning degrees.";
    type Args = RatioArgs;

    fn call(&self, args: RatioArgs) -> Result<String, ToolError> {
        Ok(format!(
            "arctan({}) = {}°",
            num(args.value),
            fixed(args.value.atan().to_degrees(), 4)
        ))
    }
}
