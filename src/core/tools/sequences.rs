//! # Sequence Tools
//!
//! Nth terms and partial sums of arithmetic and geometric sequences.
//! Term counts are whole numbers starting at 1.

use schemars::JsonSchema;
use serde::Deserialize;

use super::format::num;
use super::{Tool, ToolError, finite};

fn term_count(n: i64) -> Result<f64, ToolError> {
    if n < 1 {
        return Err(ToolError::domain(format!(
            "The term number n must be at least 1 (got {n})"
        )));
    }
    Ok(n as f64)
}

#[derive(Deserialize, JsonSchema)]
pub struct ArithmeticArgs {
    /// First term of the sequence
    pub first: f64,
    /// Common difference between terms
    pub difference: f64,
    /// Term number (1 for the first term)
    pub n: i64,
}

#[derive(Deserialize, JsonSchema)]
pub struct GeometricArgs {
    /// First term of the sequence
    pub first: f64,
    /// Common ratio between terms
    pub ratio: f64,
    /// Term number (1 for the first term)
    pub n: i64,
}

// ── Arithmetic ──────────────────────────────────────────────────────────────

pub struct ArithmeticNthTermTool;

impl Tool for ArithmeticNthTermTool {
    const NAME: &'static str = "arithmetic_sequence_nth_term";
    const DESCRIPTION: &'static str =
        "Finds the nth term of an arithmetic sequence: a + (n - 1)d.";
    type Args = ArithmeticArgs;

    fn call(&self, args: ArithmeticArgs) -> Result<String, ToolError> {
        let n = term_count(args.n)?;
        let term = finite(args.first + (n - 1.0) * args.difference)?;
        Ok(format!(
            "Term {} of the arithmetic sequence with first term {} and difference {} is {}",
            args.n,
            num(args.first),
            num(args.difference),
            num(term)
        ))
    }
}

pub struct ArithmeticSumTool;

impl Tool for ArithmeticSumTool {
    const NAME: &'static str = "arithmetic_sequence_sum";
    const DESCRIPTION: &'static str =
        "Sums the first n terms of an arithmetic sequence: n/2 × (2a + (n - 1)d).";
    type Args = ArithmeticArgs;

    fn call(&self, args: ArithmeticArgs) -> Result<String, ToolError> {
        let n = term_count(args.n)?;
        let sum = finite(n / 2.0 * (2.0 * args.first + (n - 1.0) * args.difference))?;
        Ok(format!(
            "The sum of the first {} terms of the arithmetic sequence with first term {} and difference {} is {}",
            args.n,
            num(args.first),
            num(args.difference),
            num(sum)
        ))
    }
}

// ── Geometric ───────────────────────────────────────────────────────────────

pub struct GeometricNthTermTool;

impl Tool for GeometricNthTermTool {
    const NAME: &'static str = "geometric_sequence_nth_term";
    const DESCRIPTION: &'static str =
        "Finds the nth term of a geometric sequence: a × r^(n - 1).";
    type Args = GeometricArgs;

    fn call(&self, args: GeometricArgs) -> Result<String, ToolError> {
        let n = term_count(args.n)?;
        let term = finite(args.first * args.ratio.powf(n - 1.0))?;
        Ok(format!(
            "Term {} of the geometric sequence with first term {} and ratio {} is {}",
            args.n,
            num(args.first),
            num(args.ratio),
            num(term)
        ))
    }
}

pub struct GeometricSumTool;

impl Tool for GeometricSumTool {
    const NAME: &'static str = "geometric_sequence_sum";
    const DESCRIPTION: &'static str =
        "Sums the first n terms of a geometric sequence: a(1 - r^n) / (1 - r), or n × a when r = 1.";
    type Args = GeometricArgs;

    fn call(&self, args: GeometricArgs) -> Result<String, ToolError> {
        let n = term_count(args.n)?;
        let sum = if args.ratio == 1.0 {
            n * args.first
        } else {
            args.first * (1.0 - args.ratio.powf(n)) / (1.0 - args.ratio)
        };
        let sum = finite(sum)?;
        Ok(format!(
            "The sum of the first {} terms of the geometric sequence with first term {} and ratio {} is {}",
            args.n,
            num(args.first),
            num(args.ratio),
            num(sum)
        ))
    }
}
