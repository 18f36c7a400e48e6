//! Univariate polynomials in `x` with `f64` coefficients.
//!
//! Coefficients are stored lowest power first and kept trimmed, so the zero
//! polynomial is an empty vector and `degree()` is `None` for it.

use std::fmt;

use std::f64::consts::{E, PI};

use symb_anafis::Expr;
use symb_anafis::visitor::ExprView;

use super::{SymbolicError, VARIABLE};

/// Coefficients smaller than this are treated as floating-point noise.
const EPSILON: f64 = 1e-10;

/// Highest degree a parsed expression may reach, including through `^`.
pub const MAX_DEGREE: usize = 64;

/// Integer coefficients above this are not searched for rational roots.
const MAX_ROOT_SEARCH: i128 = 10_000_000;

#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    coeffs: Vec<f64>,
}

impl Polynomial {
    pub fn new(coeffs: Vec<f64>) -> Self {
        let mut poly = Polynomial { coeffs };
        poly.trim();
        poly
    }

    pub fn constant(c: f64) -> Self {
        Self::new(vec![c])
    }

    pub fn x() -> Self {
        Self::new(vec![0.0, 1.0])
    }

    fn trim(&mut self) {
        for c in &mut self.coeffs {
            if c.abs() < EPSILON {
                *c = 0.0;
            }
        }
        while self.coeffs.last() == Some(&0.0) {
            self.coeffs.pop();
        }
    }

    pub fn degree(&self) -> Option<usize> {
        self.coeffs.len().checked_sub(1)
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn is_finite(&self) -> bool {
        self.coeffs.iter().all(|c| c.is_finite())
    }

    /// Coefficient of `x^power` (zero beyond the degree).
    pub fn coeff(&self, power: usize) -> f64 {
        self.coeffs.get(power).copied().unwrap_or(0.0)
    }

    pub fn add(&self, other: &Polynomial) -> Polynomial {
        let len = self.coeffs.len().max(other.coeffs.len());
        Polynomial::new((0..len).map(|i| self.coeff(i) + other.coeff(i)).collect())
    }

    pub fn neg(&self) -> Polynomial {
        self.scale(-1.0)
    }

    pub fn sub(&self, other: &Polynomial) -> Polynomial {
        self.add(&other.neg())
    }

    pub fn scale(&self, factor: f64) -> Polynomial {
        Polynomial::new(self.coeffs.iter().map(|c| c * factor).collect())
    }

    pub fn mul(&self, other: &Polynomial) -> Polynomial {
        if self.is_zero() || other.is_zero() {
            return Polynomial::new(Vec::new());
        }
        let mut out = vec![0.0; self.coeffs.len() + other.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in other.coeffs.iter().enumerate() {
                out[i + j] += a * b;
            }
        }
        Polynomial::new(out)
    }

    pub fn pow(&self, exponent: u32) -> Polynomial {
        (0..exponent).fold(Polynomial::constant(1.0), |acc, _| acc.mul(self))
    }

    /// Product that refuses to grow past [`MAX_DEGREE`].
    fn checked_mul(&self, other: &Polynomial) -> Result<Polynomial, SymbolicError> {
        let degree = self.degree().unwrap_or(0) + other.degree().unwrap_or(0);
        if degree > MAX_DEGREE {
            return Err(degree_too_high(degree as f64));
        }
        Ok(self.mul(other))
    }

    /// Walks an expression tree produced by `symb_anafis` and rebuilds it as a
    /// polynomial in `x`. Functions, symbols other than `x` and the named
    /// constants, division by `x` and non-integer powers of `x` are rejected.
    pub(crate) fn from_expr(expr: &Expr) -> Result<Polynomial, SymbolicError> {
        match expr.view() {
            ExprView::Number(n) if n.is_finite() => Ok(Polynomial::constant(n)),
            ExprView::Number(_) => Err(SymbolicError::NotFinite),
            ExprView::Symbol(name) => match name.as_ref() {
                VARIABLE => Ok(Polynomial::x()),
                "pi" | "PI" | "Pi" => Ok(Polynomial::constant(PI)),
                "e" | "E" => Ok(Polynomial::constant(E)),
                other => Err(SymbolicError::UnknownVariable(other.to_string())),
            },
            ExprView::Function { name, .. } => Err(SymbolicError::NotPolynomial(format!(
                "contains the function '{name}'"
            ))),
            ExprView::Derivative { .. } => {
                Err(SymbolicError::NotPolynomial("contains a derivative".into()))
            }
            ExprView::Sum(terms) => {
                let mut sum = Polynomial::new(Vec::new());
                for term in terms.iter() {
                    sum = sum.add(&Self::from_expr(term)?);
                }
                Ok(sum)
            }
            ExprView::Product(factors) => {
                let mut product = Polynomial::constant(1.0);
                for factor in factors.iter() {
                    product = product.checked_mul(&Self::from_expr(factor)?)?;
                }
                Ok(product)
            }
            ExprView::Div(numerator, denominator) => {
                let numerator = Self::from_expr(numerator)?;
                let denominator = Self::from_expr(denominator)?;
                match denominator.degree() {
                    None => Err(SymbolicError::DivisionByZero),
                    Some(0) => Ok(numerator.scale(1.0 / denominator.coeff(0))),
                    Some(_) => Err(SymbolicError::NotPolynomial(format!(
                        "division by an expression containing {VARIABLE}"
                    ))),
                }
            }
            ExprView::Pow(base, exponent) => {
                let base = Self::from_expr(base)?;
                let exponent = Self::from_expr(exponent)?;
                let exponent = match exponent.degree() {
                    None | Some(0) => exponent.coeff(0),
                    Some(_) => {
                        return Err(SymbolicError::NotPolynomial(format!(
                            "exponent containing {VARIABLE}"
                        )));
                    }
                };
                Self::power(&base, exponent)
            }
        }
    }

    fn power(base: &Polynomial, exponent: f64) -> Result<Polynomial, SymbolicError> {
        match base.degree() {
            None if exponent < 0.0 => Err(SymbolicError::DivisionByZero),
            None | Some(0) => {
                let value = base.coeff(0).powf(exponent);
                if value.is_finite() {
                    Ok(Polynomial::constant(value))
                } else {
                    Err(SymbolicError::NotFinite)
                }
            }
            Some(degree) => {
                if exponent.fract() != 0.0 || exponent < 0.0 {
                    return Err(SymbolicError::NotPolynomial(format!(
                        "exponent {exponent} is not a non-negative whole number"
                    )));
                }
                let result_degree = degree as f64 * exponent;
                if result_degree > MAX_DEGREE as f64 {
                    return Err(degree_too_high(result_degree));
                }
                Ok(base.pow(exponent as u32))
            }
        }
    }

    /// Real roots in ascending order, without repeats.
    ///
    /// Degrees one and two are solved in closed form. Higher degrees report the
    /// rational roots of integer-coefficient polynomials plus the roots of any
    /// quadratic left over once those are divided out.
    pub fn real_roots(&self) -> Vec<f64> {
        let mut roots = match self.degree() {
            None | Some(0) => Vec::new(),
            Some(1) => vec![-self.coeff(0) / self.coeff(1)],
            Some(2) => quadratic_roots(self.coeff(2), self.coeff(1), self.coeff(0)),
            Some(_) => {
                let factorization = factorize(self);
                let mut roots = Vec::new();
                if factorization.x_power > 0 {
                    roots.push(0.0);
                }
                for (factor, _) in &factorization.factors {
                    if factor.degree().is_some_and(|d| d <= 2) {
                        roots.extend(factor.real_roots());
                    }
                }
                roots
            }
        };
        roots.sort_by(f64::total_cmp);
        roots.dedup_by(|a, b| (*a - *b).abs() < EPSILON);
        roots
    }

    /// Splits the polynomial into content, a power of `x` and remaining factors.
    pub fn factor(&self) -> Factorization {
        factorize(self)
    }
}

fn degree_too_high(degree: f64) -> SymbolicError {
    SymbolicError::NotPolynomial(format!(
        "degree {degree} is above the limit of {MAX_DEGREE}"
    ))
}

fn quadratic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < -EPSILON {
        Vec::new()
    } else if discriminant.abs() <= EPSILON {
        vec![-b / (2.0 * a)]
    } else {
        let sqrt_d = discriminant.sqrt();
        vec![(-b - sqrt_d) / (2.0 * a), (-b + sqrt_d) / (2.0 * a)]
    }
}

// ============================================================================
// Display
// ============================================================================

/// Formats a coefficient without a trailing `.0` and with at most six decimals.
pub(crate) fn format_coefficient(c: f64) -> String {
    if c.fract() == 0.0 && c.abs() < 1e15 {
        return format!("{}", c as i64);
    }
    let text = format!("{c:.6}");
    match text.trim_end_matches('0').trim_end_matches('.') {
        // too small for six decimals
        "0" | "-0" => format!("{c}"),
        trimmed => trimmed.to_string(),
    }
}

fn format_monomial(magnitude: f64, power: usize) -> String {
    let coefficient = if power > 0 && (magnitude - 1.0).abs() < EPSILON {
        String::new()
    } else {
        format_coefficient(magnitude)
    };
    match power {
        0 => coefficient,
        1 => format!("{coefficient}x"),
        p => format!("{coefficient}x^{p}"),
    }
}

impl fmt::Display for Polynomial {
    /// Descending powers: `x^2 + 2x + 1`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        let mut first = true;
        for (power, &c) in self.coeffs.iter().enumerate().rev() {
            if c == 0.0 {
                continue;
            }
            let term = format_monomial(c.abs(), power);
            match (first, c < 0.0) {
                (true, false) => write!(f, "{term}")?,
                (true, true) => write!(f, "-{term}")?,
                (false, false) => write!(f, " + {term}")?,
                (false, true) => write!(f, " - {term}")?,
            }
            first = false;
        }
        Ok(())
    }
}

// ============================================================================
// Factoring
// ============================================================================

/// `content * x^x_power * Π factor^multiplicity`
#[derive(Debug, Clone, PartialEq)]
pub struct Factorization {
    pub content: f64,
    pub x_power: usize,
    pub factors: Vec<(Polynomial, u32)>,
}

impl fmt::Display for Factorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.content == 0.0 {
            return write!(f, "0");
        }
        if self.x_power == 0 && self.factors.is_empty() {
            return write!(f, "{}", format_coefficient(self.content));
        }
        if self.content == -1.0 {
            write!(f, "-")?;
        } else if self.content != 1.0 {
            write!(f, "{}", format_coefficient(self.content))?;
        }
        match self.x_power {
            0 => {}
            1 => write!(f, "x")?,
            p => write!(f, "x^{p}")?,
        }
        let lone = self.content == 1.0 && self.x_power == 0 && self.factors.len() == 1;
        for (factor, multiplicity) in &self.factors {
            if lone && *multiplicity == 1 {
                write!(f, "{factor}")?;
            } else {
                write!(f, "({factor})")?;
            }
            if *multiplicity > 1 {
                write!(f, "^{multiplicity}")?;
            }
        }
        Ok(())
    }
}

/// Integer coefficients, or `None` when any of them is fractional, huge, or
/// a nonzero value that would round to zero.
fn as_integers(poly: &Polynomial) -> Option<Vec<i128>> {
    poly.coeffs
        .iter()
        .map(|&c| {
            let rounded = c.round();
            let exact = (c - rounded).abs() < 1e-9 && (rounded != 0.0 || c == 0.0);
            (exact && rounded.abs() < 1e12).then_some(rounded as i128)
        })
        .collect()
}

fn gcd(a: i128, b: i128) -> i128 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn divisors(n: i128) -> Vec<i128> {
    let n = n.abs();
    let mut small = Vec::new();
    let mut large = Vec::new();
    let mut d = 1;
    while d * d <= n {
        if n % d == 0 {
            small.push(d);
            if d != n / d {
                large.push(n / d);
            }
        }
        d += 1;
    }
    small.extend(large.into_iter().rev());
    small
}

/// Divides `coeffs` (lowest power first) by `(q·x - p)` when it divides exactly.
fn divide_linear(coeffs: &[i128], q: i128, p: i128) -> Option<Vec<i128>> {
    let n = coeffs.len() - 1;
    let mut quotient = vec![0i128; n];
    let mut carry = 0i128;
    // walk from the leading coefficient down: b[k-1] = (c[k] + p·b[k]) / q
    for k in (1..=n).rev() {
        let numerator = coeffs[k].checked_add(p.checked_mul(carry)?)?;
        if numerator % q != 0 {
            return None;
        }
        carry = numerator / q;
        quotient[k - 1] = carry;
    }
    (coeffs[0].checked_add(p.checked_mul(carry)?)? == 0).then_some(quotient)
}

/// Finds one rational root `p/q` (lowest terms, `q > 0`) and the quotient.
fn find_rational_root(coeffs: &[i128]) -> Option<(i128, i128, Vec<i128>)> {
    let constant = coeffs[0];
    let leading = coeffs[coeffs.len() - 1];
    if constant.abs() > MAX_ROOT_SEARCH || leading.abs() > MAX_ROOT_SEARCH {
        return None;
    }
    let mut candidates = Vec::new();
    for p in divisors(constant) {
        for q in divisors(leading) {
            if gcd(p, q) == 1 {
                candidates.push((p, q));
                candidates.push((-p, q));
            }
        }
    }
    candidates.sort_by(|(p1, q1), (p2, q2)| (p1 * q2).cmp(&(p2 * q1)));
    candidates
        .into_iter()
        .find_map(|(p, q)| divide_linear(coeffs, q, p).map(|quotient| (p, q, quotient)))
}

fn to_poly(coeffs: &[i128]) -> Polynomial {
    Polynomial::new(coeffs.iter().map(|&c| c as f64).collect())
}

fn factorize(poly: &Polynomial) -> Factorization {
    if poly.is_zero() {
        return Factorization { content: 0.0, x_power: 0, factors: Vec::new() };
    }

    let x_power = poly.coeffs.iter().take_while(|&&c| c == 0.0).count();
    let shifted = Polynomial::new(poly.coeffs[x_power..].to_vec());

    let integers = as_integers(&shifted).filter(|coeffs| coeffs.iter().any(|&c| c != 0));
    let Some(mut coeffs) = integers else {
        let factors = if shifted.degree() == Some(0) {
            Vec::new()
        } else {
            vec![(shifted.clone(), 1)]
        };
        let content = if factors.is_empty() { shifted.coeff(0) } else { 1.0 };
        return Factorization { content, x_power, factors };
    };

    let mut content = coeffs.iter().fold(0, |g, &c| gcd(g, c));
    if coeffs[coeffs.len() - 1] < 0 {
        content = -content;
    }
    coeffs.iter_mut().for_each(|c| *c /= content);

    // (root value, linear factor q·x - p)
    let mut linear: Vec<(f64, Polynomial)> = Vec::new();
    while coeffs.len() > 1 {
        let Some((p, q, quotient)) = find_rational_root(&coeffs) else {
            break;
        };
        linear.push((p as f64 / q as f64, to_poly(&[-p, q])));
        coeffs = quotient;
    }
    linear.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut factors: Vec<(Polynomial, u32)> = Vec::new();
    for (_, factor) in linear {
        match factors.last_mut() {
            Some((last, multiplicity)) if *last == factor => *multiplicity += 1,
            _ => factors.push((factor, 1)),
        }
    }
    if coeffs.len() > 1 {
        factors.push((to_poly(&coeffs), 1));
    }

    Factorization {
        content: content as f64,
        x_power,
        factors,
    }
}
