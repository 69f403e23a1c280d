//! Locale-aware parsing of the area strings found in cadastral documents.
//!
//! The registry writes numbers the Spanish way: `.` groups thousands and
//! `,` marks decimals (`"1.234,56 m²"`). Parsing takes the first numeric
//! token, drops every `.` and turns `,` into `.`.

use regex::Regex;
use std::sync::OnceLock;

fn numeric_token() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"[\d.,]+").expect("numeric token pattern is valid"))
}

/// Best-effort parse. `None` means the text held no usable number and the
/// caller should treat the field as zero and say so in a caveat.
pub fn parse_locale_number(text: &str) -> Option<f64> {
    let token = numeric_token().find(text)?.as_str();
    if !token.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let normalized = token.replace('.', "").replace(',', ".");
    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

pub const SQUARE_METERS_PER_HECTARE: f64 = 10_000.0;

pub fn square_meters_to_hectares(square_meters: f64) -> f64 {
    square_meters / SQUARE_METERS_PER_HECTARE
}

/// Division that reports 0 instead of inf/NaN for an empty denominator.
pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_integer() {
        assert_eq!(parse_locale_number("10000"), Some(10000.0));
    }

    #[test]
    fn test_thousands_and_decimal_comma() {
        assert_eq!(parse_locale_number("1.234,56"), Some(1234.56));
        assert_eq!(parse_locale_number("10.000"), Some(10000.0));
        assert_eq!(parse_locale_number("12,5"), Some(12.5));
    }

    #[test]
    fn test_units_and_surrounding_text() {
        assert_eq!(parse_locale_number("2.500 m²"), Some(2500.0));
        assert_eq!(parse_locale_number("Superficie: 750,25 m2"), Some(750.25));
    }

    #[test]
    fn test_unparseable_text() {
        assert_eq!(parse_locale_number(""), None);
        assert_eq!(parse_locale_number("sin datos"), None);
        assert_eq!(parse_locale_number("1,2,3"), None);
        assert_eq!(parse_locale_number("..."), None);
    }

    #[test]
    fn test_ratio_guards_zero() {
        assert_eq!(ratio_or_zero(100.0, 0.0), 0.0);
        assert_eq!(ratio_or_zero(100.0, 4.0), 25.0);
    }
}
