//! # Statistics Tools
//!
//! Descriptive statistics over a list of numbers. Standard deviation and
//! variance are the sample (n - 1) versions.

use schemars::JsonSchema;
use serde::Deserialize;

use super::format::{list, num};
use super::{Tool, ToolError, finite};

#[derive(Deserialize, JsonSchema)]
pub struct NumbersArgs {
    /// List of numbers
    pub numbers: Vec<f64>,
}

fn non_empty(numbers: &[f64]) -> Result<&[f64], ToolError> {
    if numbers.is_empty() {
        return Err(ToolError::domain("The list of numbers cannot be empty"));
    }
    Ok(numbers)
}

fn mean_of(numbers: &[f64]) -> Result<f64, ToolError> {
    finite(numbers.iter().sum::<f64>() / numbers.len() as f64)
}

fn sample_variance(numbers: &[f64]) -> Result<f64, ToolError> {
    if numbers.len() < 2 {
        return Err(ToolError::domain(format!(
            "At least two numbers are required (got {})",
            numbers.len()
        )));
    }
    let mean = mean_of(numbers)?;
    let squares: f64 = numbers.iter().map(|x| (x - mean).powi(2)).sum();
    finite(squares / (numbers.len() - 1) as f64)
}

fn sorted(numbers: &[f64]) -> Vec<f64> {
    let mut values = numbers.to_vec();
    values.sort_by(f64::total_cmp);
    values
}

pub struct MeanTool;

impl Tool for MeanTool {
    const NAME: &'static str = "mean";
    const DESCRIPTION: &'static str = "Calculates the mean (average) of a list of numbers.";
    type Args = NumbersArgs;

    fn call(&self, args: NumbersArgs) -> Result<String, ToolError> {
        let numbers = non_empty(&args.numbers)?;
        Ok(format!("The mean of {} is {}", list(numbers), num(mean_of(numbers)?)))
    }
}

pub struct MedianTool;

impl Tool for MedianTool {
    const NAME: &'static str = "median";
    const DESCRIPTION: &'static str = "Calculates the median (middle value) of a list of numbers.";
    type Args = NumbersArgs;

    fn call(&self, args: NumbersArgs) -> Result<String, ToolError> {
        let values = sorted(non_empty(&args.numbers)?);
        let mid = values.len() / 2;
        let median = if values.len() % 2 == 0 {
            finite(values[mid - 1] / 2.0 + values[mid] / 2.0)?
        } else {
            values[mid]
        };
        Ok(format!("The median of {} is {}", list(&args.numbers), num(median)))
    }
}

pub struct ModeTool;

impl Tool for ModeTool {
    const NAME: &'static str = "mode";
    const DESCRIPTION: &'static str =
        "Finds the mode (most frequent value) of a list of numbers.";
    type Args = NumbersArgs;

    fn call(&self, args: NumbersArgs) -> Result<String, ToolError> {
        let values = sorted(non_empty(&args.numbers)?);

        // (value, count) runs over the sorted list
        let mut runs: Vec<(f64, usize)> = Vec::new();
        for value in values {
            match runs.last_mut() {
                Some((last, count)) if *last == value => *count += 1,
                _ => runs.push((value, 1)),
            }
        }

        let highest = runs.iter().map(|(_, count)| *count).max().unwrap_or(0);
        let modes: Vec<f64> = runs
            .iter()
            .filter(|(_, count)| *count == highest)
            .map(|(value, _)| *value)
            .collect();

        match modes.as_slice() {
            [mode] => Ok(format!(
                "The mode of {} is {} (appears {} times)",
                list(&args.numbers),
                num(*mode),
                highest
            )),
            _ => Ok(format!(
                "No unique mode found in {}: the values {} each appear {} times",
                list(&args.numbers),
                list(&modes),
                highest
            )),
        }
    }
}

pub struct StandardDeviationTool;

impl Tool for StandardDeviationTool {
    const NAME: &'static str = "standard_deviation";
    const DESCRIPTION: &'static str =
        "Calculates the sample standard deviation of a list of at least two numbers.";
    type Args = NumbersArgs;

    fn call(&self, args: NumbersArgs) -> Result<String, ToolError> {
        let variance = sample_variance(&args.numbers)?;
        Ok(format!(
            "The standard deviation of {} is {}",
            list(&args.numbers),
            num(variance.sqrt())
        ))
    }
}

pub struct VarianceTool;

impl Tool for VarianceTool {
    const NAME: &'static str = "variance";
    const DESCRIPTION: &'static str =
        "Calculates the sample variance of a list of at least two numbers.";
    type Args = NumbersArgs;

    fn call(&self, args: NumbersArgs) -> Result<String, ToolError> {
        let variance = sample_variance(&args.numbers)?;
        Ok(format!("The variance of {} is {}", list(&args.numbers), num(variance)))
    }
}
