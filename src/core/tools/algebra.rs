//! # Algebra Tools
//!
//! Linear and quadratic solving plus polynomial factoring and expansion.
//! Expression work is delegated to [`crate::core::symbolic`]; its errors are
//! reported to the model together with an example of the expected input.

use schemars::JsonSchema;
use serde::Deserialize;

use super::format::{fixed, num};
use super::{Tool, ToolError, finite};
use crate::core::symbolic::{self, SymbolicError};

const LINEAR_HINT: &str = "Expected a linear equation in x such as '2*x + 5 = 13'";
const POLYNOMIAL_HINT: &str = "Expected a polynomial in x such as 'x^2 - 5*x + 6'";

fn parse_error(e: SymbolicError, hint: &str) -> ToolError {
    ToolError::Parse(format!("Could not process the input: {e}. {hint}"))
}

// ── Linear equation ─────────────────────────────────────────────────────────

pub struct SolveLinearEquationTool;

#[derive(Deserialize, JsonSchema)]
pub struct SolveLinearEquationArgs {
    /// The linear equation to solve, e.g. '2*x + 5 = 13'
    pub equation: String,
}

impl Tool for SolveLinearEquationTool {
    const NAME: &'static str = "solve_linear_equation";
    const DESCRIPTION: &'static str =
        "Solves a linear equation in x, such as '2*x + 5 = 13'. Use '*' for multiplication.";
    type Args = SolveLinearEquationArgs;

    fn call(&self, args: SolveLinearEquationArgs) -> Result<String, ToolError> {
        match symbolic::solve_linear(&args.equation) {
            Ok(x) => Ok(format!("x = {}", num(x))),
            Err(e @ (SymbolicError::NoSolution | SymbolicError::InfinitelyManySolutions)) => {
                Err(ToolError::domain(e.to_string()))
            }
            Err(e) => Err(parse_error(e, LINEAR_HINT)),
        }
    }
}

// ── Quadratic ───────────────────────────────────────────────────────────────

pub struct SolveQuadraticTool;

#[derive(Deserialize, JsonSchema)]
pub struct SolveQuadraticArgs {
    /// Coefficient of x^2
    pub a: f64,
    /// Coefficient of x
    pub b: f64,
    /// Constant term
    pub c: f64,
}

impl Tool for SolveQuadraticTool {
    const NAME: &'static str = "solve_quadratic";
    const DESCRIPTION: &'static str =
        "Solves the quadratic equation ax^2 + bx + c = 0, reporting real or complex roots.";
    type Args = SolveQuadraticArgs;

    fn call(&self, args: SolveQuadraticArgs) -> Result<String, ToolError> {
        let SolveQuadraticArgs { a, b, c } = args;
        if a == 0.0 {
            return Err(ToolError::domain(
                "Coefficient 'a' cannot be zero (the equation is not quadratic)",
            ));
        }

        let discriminant = finite(b * b - 4.0 * a * c)?;
        if discriminant > 0.0 {
            let sqrt_d = discriminant.sqrt();
            let mut roots = [
                finite((-b - sqrt_d) / (2.0 * a))?,
                finite((-b + sqrt_d) / (2.0 * a))?,
            ];
            roots.sort_by(f64::total_cmp);
            Ok(format!(
                "Two real solutions: x1 = {}, x2 = {}",
                fixed(roots[0], 4),
                fixed(roots[1], 4)
            ))
        } else if discriminant == 0.0 {
            Ok(format!("One real solution: x = {}", fixed(finite(-b / (2.0 * a))?, 4)))
        } else {
            let real = finite(-b / (2.0 * a))?;
            let imaginary = finite((-discriminant).sqrt() / (2.0 * a).abs())?;
            Ok(format!(
                "Two complex solutions: x1 = {} + {}i, x2 = {} - {}i",
                fixed(real, 4),
                fixed(imaginary, 4),
                fixed(real, 4),
                fixed(imaginary, 4)
            ))
        }
    }
}

// ── Factor ──────────────────────────────────────────────────────────────────

pub struct FactorExpressionTool;

#[derive(Deserialize, JsonSchema)]
pub struct ExpressionArgs {
    /// A polynomial expression in x, e.g. 'x^2 - 5*x + 6'
    pub expression: String,
}

impl Tool for FactorExpressionTool {
    const NAME: &'static str = "factor_expression";
    const DESCRIPTION: &'static str =
        "Factors a polynomial expression in x, such as 'x^2 - 5*x + 6'.";
    type Args = ExpressionArgs;

    fn call(&self, args: ExpressionArgs) -> Result<String, ToolError> {
        let factored =
            symbolic::factor(&args.expression).map_err(|e| parse_error(e, POLYNOMIAL_HINT))?;
        Ok(format!("Factored form: {factored}"))
    }
}

// ── Expand ──────────────────────────────────────────────────────────────────

pub struct ExpandExpressionTool;

impl Tool for ExpandExpressionTool {
    const NAME: &'static str = "expand_expression";
    const DESCRIPTION: &'static str =
        "Expands a polynomial expression in x, such as '(x + 1)^2'.";
    type Args = ExpressionArgs;

    fn call(&self, args: ExpressionArgs) -> Result<String, ToolError> {
        let expanded =
            symbolic::expand(&args.expression).map_err(|e| parse_error(e, POLYNOMIAL_HINT))?;
        Ok(format!("Expanded form: {expanded}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(equation: &str) -> Result<String, ToolError> {
        SolveLinearEquationTool.call(SolveLinearEquationArgs {
            equation: equation.into(),
        })
    }

    fn quadratic(a: f64, b: f64, c: f64) -> Result<String, ToolError> {
        SolveQuadraticTool.call(SolveQuadraticArgs { a, b, c })
    }

    fn factor(expression: &str) -> Result<String, ToolError> {
        FactorExpressionTool.call(ExpressionArgs {
            expression: expression.into(),
        })
    }

    fn expand(expression: &str) -> Result<String, ToolError> {
        ExpandExpressionTool.call(ExpressionArgs {
            expression: expression.into(),
        })
    }

    #[test]
    fn test_solve_linear() {
        assert_eq!(linear("2*x + 5 = 13").unwrap(), "x = 4.0");
        assert_eq!(linear("x - 1.5 = 0").unwrap(), "x = 1.5");
    }

    #[test]
    fn test_solve_linear_parse_error_includes_hint() {
        let err = linear("2*x + = 13").unwrap_err();
        assert!(matches!(err, ToolError::Parse(_)));
        assert!(err.to_string().contains("2*x + 5 = 13"));
    }

    #[test]
    fn test_solve_linear_without_solution() {
        assert!(matches!(linear("x = x + 1"), Err(ToolError::Domain(_))));
    }

    #[test]
    fn test_quadratic_two_real_roots_ascending() {
        assert_eq!(
            quadratic(1.0, -5.0, 6.0).unwrap(),
            "Two real solutions: x1 = 2.0000, x2 = 3.0000"
        );
        // negative leading coefficient flips the formula order
        assert_eq!(
            quadratic(-1.0, 5.0, -6.0).unwrap(),
            "Two real solutions: x1 = 2.0000, x2 = 3.0000"
        );
    }

    #[test]
    fn test_quadratic_repeated_root() {
        assert_eq!(quadratic(1.0, 2.0, 1.0).unwrap(), "One real solution: x = -1.0000");
    }

    #[test]
    fn test_quadratic_complex_roots() {
        assert_eq!(
            quadratic(1.0, 0.0, 1.0).unwrap(),
            "Two complex solutions: x1 = 0.0000 + 1.0000i, x2 = 0.0000 - 1.0000i"
        );
    }

    #[test]
    fn test_quadratic_overflow_is_an_error() {
        assert_eq!(
            quadratic(1e200, 1e200, 1.0),
            Err(ToolError::domain("The result is too large to represent"))
        );
        assert!(quadratic(1e-300, 1e300, 1.0).is_err());
    }

    #[test]
    fn test_quadratic_rejects_zero_a() {
        assert!(matches!(quadratic(0.0, 2.0, 1.0), Err(ToolError::Domain(_))));
    }

    #[test]
    fn test_factor_and_expand() {
        assert_eq!(factor("x^2 - 5*x + 6").unwrap(), "Factored form: (x - 2)(x - 3)");
        assert_eq!(factor("2x^2 - 8").unwrap(), "Factored form: 2(x + 2)(x - 2)");
        assert_eq!(expand("(x + 1)^2").unwrap(), "Expanded form: x^2 + 2x + 1");
    }

    #[test]
    fn test_factor_with_coefficient_below_rounding() {
        assert_eq!(factor("0.0000000005x").unwrap(), "Factored form: 0.0000000005x");
        assert_eq!(expand("0.0000000005x").unwrap(), "Expanded form: 0.0000000005x");
    }

    #[test]
    fn test_oversized_input_is_a_parse_error() {
        let nested = format!("{}x{}", "(".repeat(200_000), ")".repeat(200_000));
        let err = expand(&nested).unwrap_err();
        assert!(matches!(err, ToolError::Parse(_)));
        assert!(err.to_string().contains("at most 500"));

        let err = expand("((x^64)^64)^64").unwrap_err();
        assert!(err.to_string().contains("above the limit of 64"), "{err}");
    }

    #[test]
    fn test_malformed_expressions() {
        assert!(matches!(factor("x^"), Err(ToolError::Parse(_))));
        assert!(matches!(expand("(x + 1) # 2"), Err(ToolError::Parse(_))));
        assert!(matches!(expand("y + 1"), Err(ToolError::Parse(_))));
    }
}
