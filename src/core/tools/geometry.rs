//! # Geometry Tools
//!
//! Areas, volumes and the Pythagorean theorem. Results use four decimals.

use std::f64::consts::PI;

use schemars::JsonSchema;
use serde::Deserialize;

use super::format::{fixed, num};
use super::{Tool, ToolError, finite};

fn non_negative(name: &str, value: f64) -> Result<f64, ToolError> {
    if value < 0.0 {
        return Err(ToolError::domain(format!(
            "The {name} cannot be negative (got {})",
            num(value)
        )));
    }
    Ok(value)
}

// ── Circles ─────────────────────────────────────────────────────────────────

#[derive(Deserialize, JsonSchema)]
pub struct RadiusArgs {
    /// Radius of the circle or sphere
    pub radius: f64,
}

pub struct AreaCircleTool;

impl Tool for AreaCircleTool {
    const NAME: &'static str = "area_circle";
    const DESCRIPTION: &'static str = "Calculates the area of a circle from its radius (πr²).";
    type Args = RadiusArgs;

    fn call(&self, args: RadiusArgs) -> Result<String, ToolError> {
        let r = non_negative("radius", args.radius)?;
        Ok(format!(
            "The area of a circle with radius {} is {} square units",
            num(r),
            fixed(finite(PI * r * r)?, 4)
        ))
    }
}

pub struct CircumferenceCircleTool;

impl Tool for CircumferenceCircleTool {
    const NAME: &'static str = "circumference_circle";
    const DESCRIPTION: &'static str =
        "Calculates the circumference of a circle from its radius (2πr).";
    type Args = RadiusArgs;

    fn call(&self, args: RadiusArgs) -> Result<String, ToolError> {
        let r = non_negative("radius", args.radius)?;
        Ok(format!(
            "The circumference of a circle with radius {} is {} units",
            num(r),
            fixed(finite(2.0 * PI * r)?, 4)
        ))
    }
}

// ── Polygons ────────────────────────────────────────────────────────────────

pub struct AreaRectangleTool;

#[derive(Deserialize, JsonSchema)]
pub struct AreaRectangleArgs {
    /// Length of the rectangle
    pub length: f64,
    /// Width of the rectangle
    pub width: f64,
}

impl Tool for AreaRectangleTool {
    const NAME: &'static str = "area_rectangle";
    const DESCRIPTION: &'static str = "Calculates the area of a rectangle (length × width).";
    type Args = AreaRectangleArgs;

    fn call(&self, args: AreaRectangleArgs) -> Result<String, ToolError> {
        let length = non_negative("length", args.length)?;
        let width = non_negative("width", args.width)?;
        Ok(format!(
            "The area of a rectangle with length {} and width {} is {} square units",
            num(length),
            num(width),
            fixed(finite(length * width)?, 4)
        ))
    }
}

pub struct AreaTriangleTool;

#[derive(Deserialize, JsonSchema)]
pub struct AreaTriangleArgs {
    /// Base of the triangle
    pub base: f64,
    /// Perpendicular height of the triangle
    pub height: f64,
}

impl Tool for AreaTriangleTool {
    const NAME: &'static str = "area_triangle";
    const DESCRIPTION: &'static str = "Calculates the area of a triangle (½ × base × height).";
    type Args = AreaTriangleArgs;

    fn call(&self, args: AreaTriangleArgs) -> Result<String, ToolError> {
        let base = non_negative("base", args.base)?;
        let height = non_negative("height", args.height)?;
        Ok(format!(
            "The area of a triangle with base {} and height {} is {} square units",
            num(base),
            num(height),
            fixed(finite(0.5 * base * height)?, 4)
        ))
    }
}

pub struct AreaTrapezoidTool;

#[derive(Deserialize, JsonSchema)]
pub struct AreaTrapezoidArgs {
    /// Length of the first parallel side
    pub a: f64,
    /// Length of the second parallel side
    pub b: f64,
    /// Distance between the parallel sides
    pub height: f64,
}

impl Tool for AreaTrapezoidTool {
    const NAME: &'static str = "area_trapezoid";
    const DESCRIPTION: &'static str =
        "Calculates the area of a trapezoid from its parallel sides and height (½(a + b)h).";
    type Args = AreaTrapezoidArgs;

    fn call(&self, args: AreaTrapezoidArgs) -> Result<String, ToolError> {
        let a = non_negative("side a", args.a)?;
        let b = non_negative("side b", args.b)?;
        let height = non_negative("height", args.height)?;
        Ok(format!(
            "The area of a trapezoid with parallel sides {} and {} and height {} is {} square units",
            num(a),
            num(b),
            num(height),
            fixed(finite(0.5 * (a + b) * height)?, 4)
        ))
    }
}

// ── Solids ──────────────────────────────────────────────────────────────────

pub struct VolumeCubeTool;

#[derive(Deserialize, JsonSchema)]
pub struct VolumeCubeArgs {
    /// Length of one side of the cube
    pub side: f64,
}

impl Tool for VolumeCubeTool {
    const NAME: &'static str = "volume_cube";
    const DESCRIPTION: &'static str = "Calculates the volume of a cube (side³).";
    type Args = VolumeCubeArgs;

    fn call(&self, args: VolumeCubeArgs) -> Result<String, ToolError> {
        let side = non_negative("side", args.side)?;
        Ok(format!(
            "The volume of a cube with side {} is {} cubic units",
            num(side),
            fixed(finite(side.powi(3))?, 4)
        ))
    }
}

pub struct VolumeCuboidTool;

#[derive(Deserialize, JsonSchema)]
pub struct VolumeCuboidArgs {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl Tool for VolumeCuboidTool {
    const NAME: &'static str = "volume_cuboid";
    const DESCRIPTION: &'static str =
        "Calculates the volume of a cuboid (length × width × height).";
    type Args = VolumeCuboidArgs;

    fn call(&self, args: VolumeCuboidArgs) -> Result<String, ToolError> {
        let length = non_negative("length", args.length)?;
        let width = non_negative("width", args.width)?;
        let height = non_negative("height", args.height)?;
        Ok(format!(
            "The volume of a cuboid with dimensions {} × {} × {} is {} cubic units",
            num(length),
            num(width),
            num(height),
            fixed(finite(length * width * height)?, 4)
        ))
    }
}

#[derive(Deserialize, JsonSchema)]
pub struct RadiusHeightArgs {
    /// Radius of the base
    pub radius: f64,
    /// Height of the solid
    pub height: f64,
}

pub struct VolumeCylinderTool;

impl Tool for VolumeCylinderTool {
    const NAME: &'static str = "volume_cylinder";
    const DESCRIPTION: &'static str = "Calculates the volume of a cylinder (πr²h).";
    type Args = RadiusHeightArgs;

    fn call(&self, args: RadiusHeightArgs) -> Result<String, ToolError> {
        let r = non_negative("radius", args.radius)?;
        let h = non_negative("height", args.height)?;
        Ok(format!(
            "The volume of a cylinder with radius {} and height {} is {} cubic units",
            num(r),
            num(h),
            fixed(finite(PI * r * r * h)?, 4)
        ))
    }
}

pub struct VolumeSphereTool;

impl Tool for VolumeSphereTool {
    const NAME: &'static str = "volume_sphere";
    const DESCRIPTION: &'static str = "Calculates the volume of a sphere (4/3 πr³).";
    type Args = RadiusArgs;

    fn call(&self, args: RadiusArgs) -> Result<String, ToolError> {
        let r = non_negative("radius", args.radius)?;
        Ok(format!(
            "The volume of a sphere with radius {} is {} cubic units",
            num(r),
            fixed(finite(4.0 / 3.0 * PI * r.powi(3))?, 4)
        ))
    }
}

pub struct VolumeConeTool;

impl Tool for VolumeConeTool {
    const NAME: &'static str = "volume_cone";
    const DESCRIPTION: &'static str = "Calculates the volume of a cone (1/3 πr²h).";
    type Args = RadiusHeightArgs;

    fn call(&self, args: RadiusHeightArgs) -> Result<String, ToolError> {
        let r = non_negative("radius", args.radius)?;
        let h = non_negative("height", args.height)?;
        Ok(format!(
            "The volume of a cone with radius {} and height {} is {} cubic units",
            num(r),
            num(h),
            fixed(finite(PI * r * r * h / 3.0)?, 4)
        ))
    }
}

// ── Pythagorean theorem ─────────────────────────────────────────────────────

pub struct PythagoreanTheoremTool;

#[derive(Deserialize, JsonSchema)]
pub struct PythagoreanArgs {
    /// First leg (omit to solve for it)
    #[serde(default)]
    pub a: Option<f64>,
    /// Second leg (omit to solve for it)
    #[serde(default)]
    pub b: Option<f64>,
    /// Hypotenuse (omit to solve for it)
    #[serde(default)]
    pub c: Option<f64>,
}

fn positive_side(name: &str, value: f64) -> Result<f64, ToolError> {
    if value <= 0.0 {
        return Err(ToolError::domain(format!(
            "Side {name} must be positive (got {})",
            num(value)
        )));
    }
    Ok(value)
}

fn missing_leg(missing: &str, (name, leg): (&str, f64), c: f64) -> Result<String, ToolError> {
    let leg = positive_side(name, leg)?;
    let c = positive_side("c", c)?;
    if c <= leg {
        return Err(ToolError::domain(format!(
            "The hypotenuse ({}) must be longer than the leg ({})",
            num(c),
            num(leg)
        )));
    }
    Ok(format!(
        "The missing leg {missing} = √({}² - {}²) = {}",
        num(c),
        num(leg),
        fixed(finite((c * c - leg * leg).sqrt())?, 4)
    ))
}

impl Tool for PythagoreanTheoremTool {
    const NAME: &'static str = "pythagorean_theorem";
    const DESCRIPTION: &'static str = "Finds the missing side of a right triangle (a² + b² = c²). \
         Provide exactly two of a, b (legs) and c (hypotenuse).";
    type Args = PythagoreanArgs;

    fn call(&self, args: PythagoreanArgs) -> Result<String, ToolError> {
        match (args.a, args.b, args.c) {
            (Some(a), Some(b), None) => {
                let a = positive_side("a", a)?;
                let b = positive_side("b", b)?;
                Ok(format!(
                    "The hypotenuse c = √({}² + {}²) = {}",
                    num(a),
                    num(b),
                    fixed(finite(a.hypot(b))?, 4)
                ))
            }
            (Some(a), None, Some(c)) => missing_leg("b", ("a", a), c),
            (None, Some(b), Some(c)) => missing_leg("a", ("b", b), c),
            _ => Err(ToolError::invalid_arguments(
                "Provide exactly two of a, b and c; the missing side is calculated",
            )),
        }
    }
}
