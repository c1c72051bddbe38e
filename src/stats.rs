//! Averaging, unit conversion and the value-list text format shared by the
//! summary and comparison stages.

use thiserror::Error;

/// Significant digits kept when raw samples are written into a summary.
pub const VALUE_DIGITS: usize = 6;
/// Decimal places kept for summary averages.
pub const AVERAGE_PLACES: i32 = 10;
/// Decimal places kept for trimmed joule values.
pub const TRIMMED_JOULE_PLACES: i32 = 6;

const VALUE_SEPARATOR: &str = ";";

/// A token of a value list that is not a number.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("not a number: {0:?}")]
pub struct InvalidValue(pub String);

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Mean after dropping the single lowest and highest sample.
///
/// Two or fewer samples are averaged as-is; an empty slice yields 0.0.
pub fn trimmed_mean(values: &[f64]) -> f64 {
    let mut ordered = values.to_vec();
    ordered.sort_by(f64::total_cmp);

    let slice = if ordered.len() > 2 {
        &ordered[1..ordered.len() - 1]
    } else {
        &ordered[..]
    };
    mean(slice)
}

pub fn to_joules(average: f64, factor: f64) -> f64 {
    average * factor
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    let scaled = (value * scale).round();
    if scaled.is_finite() {
        scaled / scale
    } else {
        value
    }
}

/// Formats like C's `%.{digits}g`: fixed notation for moderate exponents,
/// scientific otherwise, trailing zeros removed.
pub fn format_significant(value: f64, digits: usize) -> String {
    if value == 0.0 || !value.is_finite() {
        return if value == 0.0 {
            "0".to_string()
        } else {
            value.to_string()
        };
    }

    let digits = digits.max(1);
    let scientific = format!("{:.*e}", digits - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return scientific;
    };

    if exponent < -4 || exponent >= digits as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{sign}{:02}",
            strip_trailing_zeros(mantissa),
            exponent.abs()
        )
    } else {
        let decimals = (digits as i32 - 1 - exponent) as usize;
        strip_trailing_zeros(&format!("{value:.decimals$}")).to_string()
    }
}

fn strip_trailing_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

pub fn join_values(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format_significant(*v, VALUE_DIGITS))
        .collect::<Vec<_>>()
        .join(VALUE_SEPARATOR)
}

/// Parses a semicolon-joined value list, skipping empty segments.
/// Non-finite tokens such as `nan` are rejected.
pub fn parse_values(raw: &str) -> Result<Vec<f64>, InvalidValue> {
    raw.split(VALUE_SEPARATOR)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| InvalidValue(token.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn trimmed_mean_drops_extremes() {
        let avg = trimmed_mean(&[1.0, 5.0, 2.0, 9.0, 3.0]);
        assert!(close(avg, 10.0 / 3.0), "got {avg}");
    }

    #[test]
    fn trimmed_mean_keeps_small_samples() {
        assert_eq!(trimmed_mean(&[4.0, 6.0]), 5.0);
        assert_eq!(trimmed_mean(&[7.0]), 7.0);
        assert_eq!(trimmed_mean(&[]), 0.0);
    }

    #[test]
    fn trimmed_mean_of_three_is_median() {
        assert_eq!(trimmed_mean(&[10.0, 1.0, 4.0]), 4.0);
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0]), 2.5);
    }

    #[test]
    fn joule_conversion_is_exact_for_milli_units() {
        assert_eq!(to_joules(0.001, 3_600_000.0), 3600.0);
        assert_eq!(round_to(to_joules(0.001, 3_600_000.0), AVERAGE_PLACES), 3600.0);
    }

    #[test]
    fn round_to_places() {
        assert_eq!(round_to(1.23456789, 4), 1.2346);
        assert_eq!(round_to(-0.000012345, 6), -0.000012);
        assert_eq!(round_to(0.1 + 0.2, 10), 0.3);
    }

    #[test]
    fn significant_formatting_matches_printf_g() {
        assert_eq!(format_significant(0.0, 6), "0");
        assert_eq!(format_significant(5.0, 6), "5");
        assert_eq!(format_significant(0.1, 6), "0.1");
        assert_eq!(format_significant(123.456789, 6), "123.457");
        assert_eq!(format_significant(0.000123456, 6), "0.000123456");
        assert_eq!(format_significant(0.0000123456789, 6), "1.23457e-05");
        assert_eq!(format_significant(1234567.0, 6), "1.23457e+06");
        assert_eq!(format_significant(-2.5, 6), "-2.5");
    }

    #[test]
    fn value_lists_are_semicolon_joined() {
        let joined = join_values(&[0.001, 1.5e-7, 42.0]);
        assert_eq!(joined, "0.001;1.5e-07;42");
        assert_eq!(parse_values(&joined).unwrap(), vec![0.001, 1.5e-7, 42.0]);
    }

    #[test]
    fn parse_values_skips_empty_segments() {
        assert_eq!(parse_values("").unwrap(), Vec::<f64>::new());
        assert_eq!(parse_values("1;;2;").unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn parse_values_rejects_garbage() {
        assert_eq!(
            parse_values("1;abc;2"),
            Err(InvalidValue("abc".to_string()))
        );
        assert_eq!(parse_values("1;nan"), Err(InvalidValue("nan".to_string())));
        assert_eq!(parse_values("inf"), Err(InvalidValue("inf".to_string())));
    }
}
