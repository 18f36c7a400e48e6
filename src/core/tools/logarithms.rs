//! # Logarithm Tools

use schemars::JsonSchema;
use serde::Deserialize;

use super::format::{fixed, num};
use super::{Tool, ToolError};

fn positive_number(value: f64) -> Result<f64, ToolError> {
    if value <= 0.0 {
        return Err(ToolError::domain(format!(
            "Logarithms are only defined for positive numbers (got {})",
            num(value)
        )));
    }
    Ok(value)
}

#[derive(Deserialize, JsonSchema)]
pub struct NumberArgs {
    /// A positive number
    pub number: f64,
}

// ── Arbitrary base ──────────────────────────────────────────────────────────

pub struct LogarithmTool;

#[derive(Deserialize, JsonSchema)]
pub struct LogarithmArgs {
    /// The number to take the logarithm of
    pub number: f64,
    /// The logarithm base (positive, not 1)
    pub base: f64,
}

impl Tool for LogarithmTool {
    const NAME: &'static str = "logarithm";
    const DESCRIPTION: &'static str = "Calculates the logarithm of a number in a given base.";
    type Args = LogarithmArgs;

    fn call(&self, args: LogarithmArgs) -> Result<String, ToolError> {
        let number = positive_number(args.number)?;
        if args.base <= 0.0 || args.base == 1.0 {
            return Err(ToolError::domain(format!(
                "The base must be positive and not equal to 1 (got {})",
                num(args.base)
            )));
        }
        Ok(format!(
            "log base {} of {} = {}",
            num(args.base),
            num(number),
            fixed(number.ln() / args.base.ln(), 6)
        ))
    }
}

// ── Natural and common ──────────────────────────────────────────────────────

pub struct NaturalLogTool;

impl Tool for NaturalLogTool {
    const NAME: &'static str = "natural_log";
    const DESCRIPTION: &'static str = "Calculates the natural logarithm (base e) of a number.";
    type Args = NumberArgs;

    fn call(&self, args: NumberArgs) -> Result<String, ToolError> {
        let number = positive_number(args.number)?;
        Ok(format!("ln({}) = {}", num(number), fixed(number.ln(), 6)))
    }
}

pub struct LogBase10Tool;

impl Tool for LogBase10Tool {
    const NAME: &'static str = "log_base_10";
    const DESCRIPTION: &'static str = "Calculates the base-10 logarithm of a number.";
    type Args = NumberArgs;

    fn call(&self, args: NumberArgs) -> Result<String, ToolError> {
        let number = positive_number(args.number)?;
        Ok(format!("log10({}) = {}", num(number), fixed(number.log10(), 6)))
    }
}

// ── Exponential ─────────────────────────────────────────────────────────────

pub struct ExponentialTool;

#[derive(Deserialize, JsonSchema)]
pub struct ExponentialArgs {
    /// The power to raise e to
    pub exponent: f64,
}

impl Tool for ExponentialTool {
    const NAME: &'static str = "exponential";
    const DESCRIPTION: &'static str = "Calculates e raised to a power (e^x).";
    type Args = ExponentialArgs;

    fn call(&self, args: ExponentialArgs) -> Result<String, ToolError> {
        let result = args.exponent.exp();
        if !result.is_finite() {
            return Err(ToolError::domain(format!(
                "e^{} is too large to represent",
                num(args.exponent)
            )));
        }
        Ok(format!("e^{} = {}", num(args.exponent), fixed(result, 6)))
    }
}
