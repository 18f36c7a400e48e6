//! # Arithmetic Tools
//!
//! Basic calculator, powers and square roots.
//! Each tool is a unit struct implementing the `Tool` trait.

use schemars::JsonSchema;
use serde::Deserialize;

use super::format::num;
use super::{Tool, ToolError};

// ── Calculator ──────────────────────────────────────────────────────────────

pub struct CalculatorTool;

fn default_operation() -> String {
    "add".to_string()
}

#[derive(Deserialize, JsonSchema)]
pub struct CalculatorArgs {
    /// First number
    pub a: f64,
    /// Second number
    pub b: f64,
    /// The operation to perform: add, subtract, multiply or divide
    #[serde(default = "default_operation")]
    pub operation: String,
}

impl Tool for CalculatorTool {
    const NAME: &'static str = "calculator";
    const DESCRIPTION: &'static str =
        "Performs basic arithmetic on two numbers: add, subtract, multiply or divide.";
    type Args = CalculatorArgs;

    fn call(&self, args: CalculatorArgs) -> Result<String, ToolError> {
        let (a, b) = (args.a, args.b);
        match args.operation.trim().to_lowercase().as_str() {
            "add" => Ok(format!("The sum of {} and {} is {}", num(a), num(b), num(a + b))),
            "subtract" => Ok(format!(
                "The difference of {} and {} is {}",
                num(a),
                num(b),
                num(a - b)
            )),
            "multiply" => Ok(format!(
                "The product of {} and {} is {}",
                num(a),
                num(b),
                num(a * b)
            )),
            "divide" => {
                if b == 0.0 {
                    return Err(ToolError::domain("Cannot divide by zero"));
                }
                Ok(format!(
                    "The division of {} by {} is {}",
                    num(a),
                    num(b),
                    num(a / b)
                ))
            }
            _ => Err(ToolError::invalid_arguments(format!(
                "Unknown operation: {} (expected add, subtract, multiply or divide)",
                args.operation
            ))),
        }
    }
}

// ── Power ───────────────────────────────────────────────────────────────────

pub struct PowerTool;

#[derive(Deserialize, JsonSchema)]
pub struct PowerArgs {
    /// The base number
    pub base: f64,
    /// The exponent/power
    pub exponent: f64,
}

impl Tool for PowerTool {
    const NAME: &'static str = "power";
    const DESCRIPTION: &'static str = "Raises a base to an exponent (base^exponent).";
    type Args = PowerArgs;

    fn call(&self, args: PowerArgs) -> Result<String, ToolError> {
        let PowerArgs { base, exponent } = args;
        if base < 0.0 && exponent.fract() != 0.0 {
            return Err(ToolError::domain(format!(
                "Cannot raise the negative number {} to the fractional power {}: the result is not a real number",
                num(base),
                num(exponent)
            )));
        }
        if base == 0.0 && exponent < 0.0 {
            return Err(ToolError::domain(
                "Cannot raise 0 to a negative power (division by zero)",
            ));
        }
        let result = base.powf(exponent);
        if !result.is_finite() {
            return Err(ToolError::domain(format!(
                "{} raised to the power of {} is too large to represent",
                num(base),
                num(exponent)
            )));
        }
        Ok(format!(
            "{} raised to the power of {} is {}",
            num(base),
            num(exponent),
            num(result)
        ))
    }
}

// ── Square root ─────────────────────────────────────────────────────────────

pub struct SquareRootTool;

#[derive(Deserialize, JsonSchema)]
pub struct SquareRootArgs {
    /// The number to find the square root of
    pub number: f64,
}

impl Tool for SquareRootTool {
    const NAME: &'static str = "square_root";
    const DESCRIPTION: &'static str = "Calculates the square root of a non-negative number.";
    type Args = SquareRootArgs;

    fn call(&self, args: SquareRootArgs) -> Result<String, ToolError> {
        if args.number < 0.0 {
            return Err(ToolError::domain(
                "Cannot calculate square root of a negative number",
            ));
        }
        Ok(format!(
            "The square root of {} is {}",
            num(args.number),
            num(args.number.sqrt())
        ))
    }
}
