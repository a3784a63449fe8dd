//! Lenient parsing of numbers typed into forms
//!
//! Like a browser's `parseFloat`, only the leading numeric part of the input
//! is read and anything after it is ignored. On top of that, Brazilian
//! notation is understood: a comma may be the decimal separator and points
//! or commas may group thousands.

use crate::{NumberError, Result};

/// Parse a decimal amount such as `"350"`, `"350,00"` or `"R$ 1.234,56"`
///
/// Separator rules for the numeric prefix:
/// - both `.` and `,` present: the last one is the decimal separator
/// - only `,`: a single comma is decimal, several are thousands groups
/// - only `.`: a single point is decimal, several are thousands groups
///
/// # Examples
/// ```
/// use ptbr_text::parse_decimal;
/// assert_eq!(parse_decimal("350.00"), Ok(350.0));
/// assert_eq!(parse_decimal("R$ 1.234,56"), Ok(1234.56));
/// assert_eq!(parse_decimal("12abc"), Ok(12.0));
/// assert!(parse_decimal("abc").is_err());
/// ```
pub fn parse_decimal(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(NumberError::Empty);
    }

    let unprefixed = trimmed
        .strip_prefix("R$")
        .map(str::trim_start)
        .unwrap_or(trimmed);

    let (negative, body) = split_sign(unprefixed);
    let prefix = numeric_prefix(body);
    if !prefix.chars().any(|c| c.is_ascii_digit()) {
        return Err(NumberError::NotANumber(input.trim().to_string()));
    }

    let normalized = normalize_separators(prefix);
    let value: f64 = normalized
        .parse()
        .map_err(|_| NumberError::NotANumber(input.trim().to_string()))?;
    if !value.is_finite() {
        return Err(NumberError::NotFinite);
    }

    Ok(if negative { -value } else { value })
}

/// Parse a non-negative whole count such as `"3"` or `"10x"`
///
/// # Examples
/// ```
/// use ptbr_text::parse_count;
/// assert_eq!(parse_count("12"), Ok(12));
/// assert_eq!(parse_count(" 3x "), Ok(3));
/// assert!(parse_count("-2").is_err());
/// ```
pub fn parse_count(input: &str) -> Result<u32> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(NumberError::Empty);
    }

    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits: &str = &body[..body
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(body.len())];

    if digits.is_empty() {
        return Err(NumberError::NotANumber(trimmed.to_string()));
    }

    digits.parse().map_err(|_| NumberError::NotFinite)
}

fn split_sign(s: &str) -> (bool, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else {
        (false, s.strip_prefix('+').unwrap_or(s))
    }
}

/// Longest leading run of digits, points and commas
fn numeric_prefix(s: &str) -> &str {
    let end = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == ','))
        .unwrap_or(s.len());
    s[..end].trim_end_matches(['.', ','])
}

/// Rewrite a numeric prefix into Rust float syntax
fn normalize_separators(prefix: &str) -> String {
    let last_point = prefix.rfind('.');
    let last_comma = prefix.rfind(',');

    let decimal = match (last_point, last_comma) {
        (Some(p), Some(c)) => Some(p.max(c)),
        (None, Some(c)) if prefix.matches(',').count() == 1 => Some(c),
        (Some(p), None) if prefix.matches('.').count() == 1 => Some(p),
        _ => None,
    };

    prefix
        .char_indices()
        .filter_map(|(i, c)| match c {
            '.' | ',' if Some(i) == decimal => Some('.'),
            '.' | ',' => None,
            digit => Some(digit),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_decimal_plain() {
        assert_eq!(parse_decimal("350"), Ok(350.0));
        assert_eq!(parse_decimal("350.00"), Ok(350.0));
        assert_eq!(parse_decimal("  79.9 "), Ok(79.9));
        assert_eq!(parse_decimal(".5"), Ok(0.5));
    }

    #[test]
    fn test_parse_decimal_comma() {
        assert_eq!(parse_decimal("350,00"), Ok(350.0));
        assert_eq!(parse_decimal("0,5"), Ok(0.5));
    }

    #[test]
    fn test_parse_decimal_thousands() {
        assert_eq!(parse_decimal("1.234,56"), Ok(1234.56));
        assert_eq!(parse_decimal("1,234.56"), Ok(1234.56));
        assert_eq!(parse_decimal("1.234.567"), Ok(1234567.0));
        assert_eq!(parse_decimal("1,234,567"), Ok(1234567.0));
    }

    #[test]
    fn test_parse_decimal_currency_prefix() {
        assert_eq!(parse_decimal("R$ 80,00"), Ok(80.0));
        assert_eq!(parse_decimal("R$80"), Ok(80.0));
    }

    #[test]
    fn test_parse_decimal_trailing_garbage() {
        assert_eq!(parse_decimal("12abc"), Ok(12.0));
        assert_eq!(parse_decimal("150 reais"), Ok(150.0));
        assert_eq!(parse_decimal("10."), Ok(10.0));
    }

    #[test]
    fn test_parse_decimal_sign() {
        assert_eq!(parse_decimal("-5"), Ok(-5.0));
        assert_eq!(parse_decimal("+5,5"), Ok(5.5));
    }

    #[test]
    fn test_parse_decimal_rejects() {
        assert_eq!(parse_decimal(""), Err(NumberError::Empty));
        assert_eq!(parse_decimal("   "), Err(NumberError::Empty));
        assert_eq!(
            parse_decimal("abc"),
            Err(NumberError::NotANumber("abc".to_string()))
        );
        assert!(parse_decimal("R$").is_err());
        assert!(parse_decimal(",").is_err());
        assert!(parse_decimal("-").is_err());
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("1"), Ok(1));
        assert_eq!(parse_count("+4"), Ok(4));
        assert_eq!(parse_count("12x"), Ok(12));
        assert_eq!(parse_count("3.5"), Ok(3));
    }

    #[test]
    fn test_parse_count_rejects() {
        assert_eq!(parse_count(""), Err(NumberError::Empty));
        assert_eq!(
            parse_count("x3"),
            Err(NumberError::NotANumber("x3".to_string()))
        );
        assert!(parse_count("-1").is_err());
        assert_eq!(parse_count("99999999999"), Err(NumberError::NotFinite));
    }
}
