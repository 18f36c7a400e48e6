//! Number formatting shared by every operation.

/// Drops the sign of negative zero.
fn unsign_zero(x: f64) -> f64 {
    if x == 0.0 { 0.0 } else { x }
}

/// Formats a value the way a calculator display would: integral values keep
/// one decimal (`5.0`), everything else uses the shortest exact representation.
pub fn num(x: f64) -> String {
    let x = unsign_zero(x);
    if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 {
        format!("{x:.1}")
    } else {
        format!("{x}")
    }
}

/// Formats with a fixed number of decimals, never printing `-0.000`.
pub fn fixed(x: f64, decimals: usize) -> String {
    let text = format!("{:.*}", decimals, unsign_zero(x));
    match text.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
        _ => text,
    }
}

/// Formats a list of values as `[1.0, 2.5, 3.0]`.
pub fn list(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|&v| num(v)).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_keeps_one_decimal_for_integers() {
        assert_eq!(num(5.0), "5.0");
        assert_eq!(num(-3.0), "-3.0");
        assert_eq!(num(2.5), "2.5");
        assert_eq!(num(0.1 + 0.2), "0.30000000000000004");
    }

    #[test]
    fn test_negative_zero_prints_as_zero() {
        assert_eq!(num(-0.0), "0.0");
        assert_eq!(fixed(-0.0, 4), "0.0000");
        assert_eq!(fixed(-0.00001, 4), "0.0000");
        assert_eq!(fixed(-0.5, 2), "-0.50");
    }

    #[test]
    fn test_list() {
        assert_eq!(list(&[1.0, 2.5]), "[1.0, 2.5]");
        assert_eq!(list(&[]), "[]");
    }
}
