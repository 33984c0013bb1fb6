// Utility helpers for coercion, rounding and number formatting.
//
// This module centralizes the "dirty" CSV cell handling so the rest of the
// code can work with `Option<f64>` / `Option<i32>` where `None` means the
// cell was missing or unparsable.
use num_format::{Locale, ToFormattedString};

/// Parse a CSV cell into a finite `f64`.
///
/// - Trims whitespace.
/// - Returns `None` for empty cells and anything that is not a plain number.
/// - Rejects `NaN` and infinities, which `str::parse` would otherwise accept.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a year cell. Integral decimals such as `2019.0` are accepted since
/// spreadsheet exports often write years that way.
pub fn parse_year_safe(s: Option<&str>) -> Option<i32> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(y) = s.parse::<i32>() {
        return Some(y);
    }
    let v = parse_f64_safe(Some(s))?;
    if v.fract() != 0.0 || v < f64::from(i32::MIN) || v > f64::from(i32::MAX) {
        return None;
    }
    // Range and integrality were checked above.
    Some(v as i32)
}

/// Round to two decimal places, halves away from zero.
/// Values too large to scale by 100 already have no fractional digits and
/// are returned unchanged.
pub fn round2(v: f64) -> f64 {
    let scaled = v * 100.0;
    if !scaled.is_finite() {
        return v;
    }
    scaled.round() / 100.0
}

/// Arithmetic mean, `None` for an empty input or when the sum overflows.
pub fn mean(v: &[f64]) -> Option<f64> {
    if v.is_empty() {
        return None;
    }
    let sum: f64 = v.iter().copied().sum();
    Some(sum / v.len() as f64).filter(|m| m.is_finite())
}

pub fn min_value(v: &[f64]) -> Option<f64> {
    v.iter().copied().reduce(f64::min)
}

pub fn max_value(v: &[f64]) -> Option<f64> {
    v.iter().copied().reduce(f64::max)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg && res.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", res)
    } else {
        res
    }
}

/// Two-decimal rendering for optional cells; missing values print as `N/A`.
pub fn format_opt(v: Option<f64>) -> String {
    v.map_or_else(|| "N/A".to_string(), |v| format_number(v, 2))
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for counts in console messages
    // (e.g., `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_f64_rejects_text_and_non_finite() {
        assert_eq!(parse_f64_safe(Some(" 12.5 ")), Some(12.5));
        assert_eq!(parse_f64_safe(Some("-3")), Some(-3.0));
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(Some("n/a")), None);
        assert_eq!(parse_f64_safe(Some("NaN")), None);
        assert_eq!(parse_f64_safe(Some("inf")), None);
        assert_eq!(parse_f64_safe(Some("1,234")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn parse_year_accepts_integral_decimals() {
        assert_eq!(parse_year_safe(Some("2019")), Some(2019));
        assert_eq!(parse_year_safe(Some("2019.0")), Some(2019));
        assert_eq!(parse_year_safe(Some("2019.5")), None);
        assert_eq!(parse_year_safe(Some("twenty")), None);
        assert_eq!(parse_year_safe(Some("  ")), None);
    }

    #[test]
    fn round2_goes_half_away_from_zero() {
        assert_eq!(round2(1.005_f64 + 1e-9), 1.01);
        assert_eq!(round2(12.345_678), 12.35);
        assert_eq!(round2(-0.125), -0.13);
        assert_eq!(round2(7.0), 7.0);
        assert_eq!(round2(1e308), 1e308);
        assert_eq!(round2(-f64::MAX), -f64::MAX);
    }

    #[test]
    fn overflowing_mean_is_none() {
        assert_eq!(mean(&[1e308, 1e308]), None);
        assert_eq!(mean(&[f64::MAX, -f64::MAX]), Some(0.0));
    }

    #[test]
    fn empty_aggregates_are_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(min_value(&[]), None);
        assert_eq!(max_value(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
        assert_eq!(min_value(&[4.0, -1.0, 2.0]), Some(-1.0));
        assert_eq!(max_value(&[4.0, -1.0, 2.0]), Some(4.0));
    }

    #[test]
    fn format_number_groups_thousands() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-2.5, 2), "-2.50");
        assert_eq!(format_number(-0.001, 2), "0.00");
        assert_eq!(format_opt(None), "N/A");
        assert_eq!(format_opt(Some(3.0)), "3.00");
    }
}
