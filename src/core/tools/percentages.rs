//! # Percentage and Ratio Tools

use schemars::JsonSchema;
use serde::Deserialize;

use super::format::{fixed, num};
use super::{Tool, ToolError};

// ── Percentages ─────────────────────────────────────────────────────────────

pub struct PercentageTool;

#[derive(Deserialize, JsonSchema)]
pub struct PercentageArgs {
    /// The part
    pub part: f64,
    /// The whole
    pub whole: f64,
}

impl Tool for PercentageTool {
    const NAME: &'static str = "percentage";
    const DESCRIPTION: &'static str = "Calculates what percentage the part is of the whole.";
    type Args = PercentageArgs;

    fn call(&self, args: PercentageArgs) -> Result<String, ToolError> {
        if args.whole == 0.0 {
            return Err(ToolError::domain("The whole cannot be zero"));
        }
        Ok(format!(
            "{} is {}% of {}",
            num(args.part),
            fixed(args.part / args.whole * 100.0, 2),
            num(args.whole)
        ))
    }
}

pub struct PercentageOfTool;

#[derive(Deserialize, JsonSchema)]
pub struct PercentageOfArgs {
    /// The percentage to take, e.g. 15 for 15%
    pub percentage: f64,
    /// The number to take it of
    pub number: f64,
}

impl Tool for PercentageOfTool {
    const NAME: &'static str = "percentage_of";
    const DESCRIPTION: &'static str = "Calculates a percentage of a number, e.g. 15% of 80.";
    type Args = PercentageOfArgs;

    fn call(&self, args: PercentageOfArgs) -> Result<String, ToolError> {
        Ok(format!(
            "{}% of {} is {}",
            num(args.percentage),
            num(args.number),
            num(args.percentage * args.number / 100.0)
        ))
    }
}

// ── Ratios ──────────────────────────────────────────────────────────────────

pub struct SimplifyRatioTool;

#[derive(Deserialize, JsonSchema)]
pub struct SimplifyRatioArgs {
    /// First term of the ratio
    pub a: f64,
    /// Second term of the ratio
    pub b: f64,
}

/// `Some(n)` when the value is an exact integer small enough to reduce.
fn exact_integer(value: f64) -> Option<i64> {
    (value.fract() == 0.0 && value.abs() < 9.0e15).then_some(value as i64)
}

fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl Tool for SimplifyRatioTool {
    const NAME: &'static str = "simplify_ratio";
    const DESCRIPTION: &'static str =
        "Simplifies the ratio a:b to lowest terms when both terms are whole numbers.";
    type Args = SimplifyRatioArgs;

    fn call(&self, args: SimplifyRatioArgs) -> Result<String, ToolError> {
        if args.b == 0.0 {
            return Err(ToolError::domain("The second term of a ratio cannot be zero"));
        }
        match (exact_integer(args.a), exact_integer(args.b)) {
            (Some(a), Some(b)) => {
                let divisor = gcd(a, b);
                Ok(format!(
                    "The ratio {a}:{b} simplifies to {}:{}",
                    a / divisor,
                    b / divisor
                ))
            }
            _ => Ok(format!(
                "The ratio {}:{} cannot be simplified further (terms are not whole numbers)",
                num(args.a),
                num(args.b)
            )),
        }
    }
}
