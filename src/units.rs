//! Raw integer amount conversion
//!
//! Explorer APIs report token and native amounts as base-10 integer strings in
//! the smallest unit. Token supplies routinely exceed `u64`, so conversion works
//! on the digit string directly instead of parsing into a fixed-width integer.

use thiserror::Error;

/// Decimals of the chain's native currency (wei-style units)
pub const NATIVE_DECIMALS: u8 = 18;

/// Default token decimals when neither token info nor transfers report one
pub const DEFAULT_TOKEN_DECIMALS: u8 = 18;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnitError {
    #[error("empty amount")]
    Empty,
    #[error("invalid digit in amount: {0}")]
    InvalidDigit(String),
}

/// Convert a raw integer amount string to a decimal value
///
/// # Arguments
/// * `raw` - Unsigned base-10 integer string (e.g. `"1500000000000000000"`)
/// * `decimals` - Number of decimal places of the unit
///
/// # Example
/// ```rust
/// use paperhand::units::format_units;
///
/// assert_eq!(format_units("1500000000000000000", 18).unwrap(), 1.5);
/// ```
pub fn format_units(raw: &str, decimals: u8) -> Result<f64, UnitError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(UnitError::Empty);
    }
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(UnitError::InvalidDigit(raw.to_string()));
    }

    let digits = raw.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(0.0);
    }

    let dec = decimals as usize;
    let decimal_str = if digits.len() <= dec {
        format!("0.{:0>width$}", digits, width = dec)
    } else {
        let (int_part, frac_part) = digits.split_at(digits.len() - dec);
        if frac_part.is_empty() {
            int_part.to_string()
        } else {
            format!("{}.{}", int_part, frac_part)
        }
    };

    decimal_str
        .parse::<f64>()
        .map_err(|_| UnitError::InvalidDigit(raw.to_string()))
}

/// Convert a raw native-currency amount (18 decimals) to a decimal value
pub fn format_native(raw: &str) -> Result<f64, UnitError> {
    format_units(raw, NATIVE_DECIMALS)
}

/// Parse a decimals field as reported by explorers (`"18"`, `" 9 "`)
pub fn parse_decimals(field: &str) -> Option<u8> {
    field.trim().parse::<u8>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_and_fractional_amounts() {
        assert_eq!(format_units("1000000", 6).unwrap(), 1.0);
        assert_eq!(format_units("1234567", 6).unwrap(), 1.234567);
        assert_eq!(format_units("500", 6).unwrap(), 0.0005);
        assert_eq!(format_units("42", 0).unwrap(), 42.0);
    }

    #[test]
    fn test_amount_larger_than_u128() {
        // 10^40 raw units at 18 decimals = 10^22 tokens
        let raw = format!("1{}", "0".repeat(40));
        let value = format_units(&raw, 18).unwrap();
        assert!((value - 1e22).abs() / 1e22 < 1e-12);
    }

    #[test]
    fn test_zero_and_leading_zeros() {
        assert_eq!(format_units("0", 18).unwrap(), 0.0);
        assert_eq!(format_units("000", 18).unwrap(), 0.0);
        assert_eq!(format_units("0001000000", 6).unwrap(), 1.0);
    }

    #[test]
    fn test_malformed_amounts() {
        assert_eq!(format_units("", 18), Err(UnitError::Empty));
        assert!(format_units("-100", 18).is_err());
        assert!(format_units("1.5", 18).is_err());
        assert!(format_units("0x10", 18).is_err());
    }

    #[test]
    fn test_native_amount() {
        assert_eq!(format_native("250000000000000000").unwrap(), 0.25);
    }

    #[test]
    fn test_parse_decimals() {
        assert_eq!(parse_decimals("18"), Some(18));
        assert_eq!(parse_decimals(" 9 "), Some(9));
        assert_eq!(parse_decimals(""), None);
        assert_eq!(parse_decimals("abc"), None);
    }
}
