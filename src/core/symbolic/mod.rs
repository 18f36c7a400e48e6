//! # Symbolic Algebra
//!
//! Expressions and equations in the single variable `x` are parsed by
//! `symb_anafis` and folded into a dense [`Polynomial`], which the algebra
//! tools then expand, factor or solve.
//!
//! The parser recurses once per nesting level, so input is bounded in length
//! and parenthesis depth before it is handed over.

mod poly;

use std::collections::HashSet;
use std::fmt;

pub use poly::{Factorization, MAX_DEGREE, Polynomial};

/// The only free variable an expression may use.
pub const VARIABLE: &str = "x";

/// Longest expression or equation accepted, in characters.
pub const MAX_INPUT_LEN: usize = 500;

/// Deepest parenthesis nesting accepted.
pub const MAX_NESTING: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolicError {
    EmptyInput,
    TooLong { len: usize },
    TooDeep { depth: usize },
    /// Rejected by the expression parser; carries its message.
    Syntax(String),
    UnknownVariable(String),
    NotPolynomial(String),
    NotFinite,
    DivisionByZero,
    TooManyEquals,
    NotLinear { degree: usize },
    NoSolution,
    InfinitelyManySolutions,
}

impl fmt::Display for SymbolicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolicError::EmptyInput => write!(f, "Expression is empty"),
            SymbolicError::TooLong { len } => write!(
                f,
                "Expression is {len} characters long (at most {MAX_INPUT_LEN} are accepted)"
            ),
            SymbolicError::TooDeep { depth } => write!(
                f,
                "Parentheses are nested {depth} levels deep (at most {MAX_NESTING} are accepted)"
            ),
            SymbolicError::Syntax(message) => write!(f, "{message}"),
            SymbolicError::UnknownVariable(name) => {
                write!(f, "Unknown variable '{name}' (only '{VARIABLE}' is supported)")
            }
            SymbolicError::NotPolynomial(reason) => {
                write!(f, "Not a polynomial in {VARIABLE}: {reason}")
            }
            SymbolicError::NotFinite => write!(f, "A number in the expression is too large"),
            SymbolicError::DivisionByZero => write!(f, "Division by zero"),
            SymbolicError::TooManyEquals => write!(f, "An equation may contain only one '='"),
            SymbolicError::NotLinear { degree } => {
                write!(f, "Equation is not linear (degree {degree})")
            }
            SymbolicError::NoSolution => write!(f, "The equation has no solution"),
            SymbolicError::InfinitelyManySolutions => {
                write!(f, "The equation is true for every value of {VARIABLE}")
            }
        }
    }
}

impl std::error::Error for SymbolicError {}

fn check_bounds(input: &str) -> Result<(), SymbolicError> {
    let len = input.chars().count();
    if len > MAX_INPUT_LEN {
        return Err(SymbolicError::TooLong { len });
    }
    let mut depth = 0usize;
    for ch in input.chars() {
        match ch {
            '(' | '[' | '{' => {
                depth += 1;
                if depth > MAX_NESTING {
                    return Err(SymbolicError::TooDeep { depth });
                }
            }
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

/// Parses an expression such as `(x + 1)^2` into a polynomial.
pub fn parse_polynomial(input: &str) -> Result<Polynomial, SymbolicError> {
    check_bounds(input)?;
    parse_bounded(input)
}

fn parse_bounded(input: &str) -> Result<Polynomial, SymbolicError> {
    if input.trim().is_empty() {
        return Err(SymbolicError::EmptyInput);
    }
    let no_names = HashSet::<String>::new();
    let expr = symb_anafis::parse(input, &no_names, &no_names, None)
        .map_err(|e| SymbolicError::Syntax(e.to_string()))?;
    let poly = Polynomial::from_expr(&expr)?;
    if !poly.is_finite() {
        return Err(SymbolicError::NotFinite);
    }
    Ok(poly)
}

/// Parses `lhs = rhs` into the polynomial `lhs - rhs`. Without an `=` the
/// expression itself is taken to equal zero.
///
/// Error positions count from the start of the whole equation.
pub fn parse_equation(input: &str) -> Result<Polynomial, SymbolicError> {
    check_bounds(input)?;
    let sides: Vec<&str> = input.split('=').collect();
    match sides.as_slice() {
        [expr] => parse_bounded(expr),
        [lhs, rhs] => {
            // the parser skips whitespace, so padding keeps its byte offsets absolute
            let shifted_rhs = format!("{}{rhs}", " ".repeat(lhs.len() + 1));
            Ok(parse_bounded(lhs)?.sub(&parse_bounded(&shifted_rhs)?))
        }
        _ => Err(SymbolicError::TooManyEquals),
    }
}

/// Real solutions of `poly = 0`, ascending.
fn roots(poly: &Polynomial) -> Result<Vec<f64>, SymbolicError> {
    match poly.degree() {
        None => Err(SymbolicError::InfinitelyManySolutions),
        Some(0) => Err(SymbolicError::NoSolution),
        Some(_) => Ok(poly.real_roots()),
    }
}

/// Solves an equation that must be linear in `x`.
pub fn solve_linear(equation: &str) -> Result<f64, SymbolicError> {
    let poly = parse_equation(equation)?;
    if let Some(degree) = poly.degree().filter(|&d| d > 1) {
        return Err(SymbolicError::NotLinear { degree });
    }
    roots(&poly)?
        .first()
        .copied()
        .ok_or(SymbolicError::NoSolution)
}

pub fn expand(expression: &str) -> Result<Polynomial, SymbolicError> {
    parse_polynomial(expression)
}

pub fn factor(expression: &str) -> Result<Factorization, SymbolicError> {
    Ok(parse_polynomial(expression)?.factor())
}
