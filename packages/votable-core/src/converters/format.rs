//! Text formatting of floating point values.

use crate::error::{Result, VoError};

/// Output format selected by a field's `precision` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatFormat {
    /// No precision: shortest text that parses back to the same value
    Shortest,
    /// `E<n>`: scientific notation with `n` digits after the point
    Exponent(usize),
    /// `F<n>`: fixed notation with `n` digits after the point
    Fixed(usize),
    /// `<n>`: `n` significant digits, C `%g` style
    General(usize),
}

impl FloatFormat {
    /// Interprets a `precision` attribute.
    pub fn from_precision(precision: Option<&str>) -> Result<Self> {
        let Some(precision) = precision.map(str::trim) else {
            return Ok(FloatFormat::Shortest);
        };

        let digits = |s: &str| {
            s.parse::<usize>().map_err(|_| VoError::InvalidNumber {
                datatype: "precision".to_string(),
                value: precision.to_string(),
            })
        };

        if let Some(rest) = precision.strip_prefix('E') {
            Ok(FloatFormat::Exponent(digits(rest)?))
        } else if let Some(rest) = precision.strip_prefix('F') {
            Ok(FloatFormat::Fixed(digits(rest)?))
        } else {
            Ok(FloatFormat::General(digits(precision)?))
        }
    }

    /// Formats a finite double.
    pub fn format_f64(&self, value: f64) -> String {
        match *self {
            FloatFormat::Shortest => shortest(value),
            FloatFormat::Exponent(digits) => c_exponent(value, digits, 'E'),
            FloatFormat::Fixed(digits) => format!("{:.*}", digits, value),
            FloatFormat::General(digits) => c_general(value, digits),
        }
    }

    /// Formats a finite single-precision float.
    ///
    /// `Shortest` uses the single-precision representation, so `0.1f32`
    /// prints as `0.1` rather than its widened double expansion.
    pub fn format_f32(&self, value: f32) -> String {
        match *self {
            FloatFormat::Shortest => {
                let abs = value.abs();
                if abs != 0.0 && !(1e-5..1e16).contains(&abs) {
                    format!("{:e}", value)
                } else {
                    format!("{}", value)
                }
            }
            other => other.format_f64(value as f64),
        }
    }
}

fn shortest(value: f64) -> String {
    let abs = value.abs();
    if abs != 0.0 && !(1e-5..1e16).contains(&abs) {
        format!("{:e}", value)
    } else {
        format!("{}", value)
    }
}

/// Splits Rust's `1.5e3` style into mantissa and exponent.
fn split_exponent(formatted: &str) -> (&str, i32) {
    match formatted.find(|c| c == 'e' || c == 'E') {
        Some(idx) => (
            &formatted[..idx],
            formatted[idx + 1..].parse().unwrap_or(0),
        ),
        None => (formatted, 0),
    }
}

fn c_exponent_suffix(exp: i32, marker: char) -> String {
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{}{}{:02}", marker, sign, exp.abs())
}

/// C `%.nE` / `%.ne` formatting.
fn c_exponent(value: f64, digits: usize, marker: char) -> String {
    let formatted = format!("{:.*e}", digits, value);
    let (mantissa, exp) = split_exponent(&formatted);
    format!("{}{}", mantissa, c_exponent_suffix(exp, marker))
}

fn strip_trailing_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// C `%.ng` formatting.
fn c_general(value: f64, digits: usize) -> String {
    let precision = digits.max(1);
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let probe = format!("{:.*e}", precision - 1, value);
    let (_, exp) = split_exponent(&probe);

    if exp < -4 || exp >= precision as i32 {
        let (mantissa, exp) = split_exponent(&probe);
        format!(
            "{}{}",
            strip_trailing_zeros(mantissa),
            c_exponent_suffix(exp, 'e')
        )
    } else {
        let decimals = (precision as i32 - 1 - exp).max(0) as usize;
        let fixed = format!("{:.*}", decimals, value);
        strip_trailing_zeros(&fixed).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_precision() {
        assert_eq!(FloatFormat::from_precision(None).unwrap(), FloatFormat::Shortest);
        assert_eq!(
            FloatFormat::from_precision(Some("E4")).unwrap(),
            FloatFormat::Exponent(4)
        );
        assert_eq!(
            FloatFormat::from_precision(Some("F2")).unwrap(),
            FloatFormat::Fixed(2)
        );
        assert_eq!(
            FloatFormat::from_precision(Some("6")).unwrap(),
            FloatFormat::General(6)
        );
        assert!(FloatFormat::from_precision(Some("Fx")).is_err());
    }

    #[test]
    fn test_shortest_round_trips() {
        for value in [0.1, 1.0 / 3.0, 12345.678, 6.02214076e23, -2.5e-9, 0.0] {
            let text = FloatFormat::Shortest.format_f64(value);
            assert_eq!(text.parse::<f64>().unwrap(), value, "{}", text);
        }
        assert_eq!(FloatFormat::Shortest.format_f32(0.1), "0.1");
        assert_eq!(FloatFormat::Shortest.format_f64(1e20), "1e20");
    }

    #[test]
    fn test_exponent_format() {
        assert_eq!(FloatFormat::Exponent(3).format_f64(1234.56), "1.235E+03");
        assert_eq!(FloatFormat::Exponent(2).format_f64(0.000123), "1.23E-04");
        assert_eq!(FloatFormat::Exponent(1).format_f64(-5.0), "-5.0E+00");
    }

    #[test]
    fn test_fixed_format() {
        assert_eq!(FloatFormat::Fixed(2).format_f64(1.23456), "1.23");
        assert_eq!(FloatFormat::Fixed(0).format_f64(2.0), "2");
    }

    #[test]
    fn test_general_format() {
        assert_eq!(FloatFormat::General(6).format_f64(2.34567891), "2.34568");
        assert_eq!(FloatFormat::General(6).format_f64(100.0), "100");
        assert_eq!(FloatFormat::General(3).format_f64(123456.0), "1.23e+05");
        assert_eq!(FloatFormat::General(2).format_f64(0.00001234), "1.2e-05");
        assert_eq!(FloatFormat::General(4).format_f64(0.0), "0");
    }
}
