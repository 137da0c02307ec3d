//! Money conversion helpers.
//!
//! Payment providers express amounts in minor currency units (cents for USD),
//! while the database stores decimal amounts. The conversion must be exact:
//! any rounding here would silently change what the guest is charged.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

/// Currencies whose minor unit equals the major unit (no cents).
const ZERO_DECIMAL_CURRENCIES: &[&str] = &["JPY", "KRW", "VND", "CLP", "ISK"];

/// Error type for money conversions.
#[derive(Debug, Error, PartialEq)]
pub enum MoneyError {
    #[error("Amount {0} has sub-minor-unit precision")]
    SubUnitPrecision(Decimal),
    #[error("Amount {0} is out of range for minor units")]
    OutOfRange(Decimal),
    #[error("Amount {0} is negative")]
    Negative(Decimal),
}

/// Number of minor-unit digits for a currency code (case-insensitive).
pub fn minor_unit_exponent(currency: &str) -> u32 {
    let upper = currency.to_ascii_uppercase();
    if ZERO_DECIMAL_CURRENCIES.contains(&upper.as_str()) {
        0
    } else {
        2
    }
}

/// Converts a decimal amount to provider minor units.
///
/// Fails rather than rounds when the amount carries more precision than the
/// currency supports (e.g. $4.999).
pub fn to_minor_units(amount: Decimal, currency: &str) -> Result<i64, MoneyError> {
    if amount.is_sign_negative() {
        return Err(MoneyError::Negative(amount));
    }

    let exponent = minor_unit_exponent(currency);
    let scaled = amount * Decimal::from(10i64.pow(exponent));

    if scaled.fract() != Decimal::ZERO {
        return Err(MoneyError::SubUnitPrecision(amount));
    }

    scaled.to_i64().ok_or(MoneyError::OutOfRange(amount))
}

/// Converts provider minor units back to a decimal amount.
pub fn from_minor_units(minor: i64, currency: &str) -> Decimal {
    let exponent = minor_unit_exponent(currency);
    Decimal::new(minor, exponent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_to_minor_units_usd() {
        assert_eq!(to_minor_units(dec!(500.00), "USD").unwrap(), 50000);
        assert_eq!(to_minor_units(dec!(19.99), "usd").unwrap(), 1999);
        assert_eq!(to_minor_units(dec!(0), "USD").unwrap(), 0);
    }

    #[test]
    fn test_to_minor_units_zero_decimal_currency() {
        assert_eq!(to_minor_units(dec!(1500), "JPY").unwrap(), 1500);
        assert_eq!(
            to_minor_units(dec!(1500.50), "JPY"),
            Err(MoneyError::SubUnitPrecision(dec!(1500.50)))
        );
    }

    #[test]
    fn test_to_minor_units_rejects_sub_cent() {
        assert_eq!(
            to_minor_units(dec!(4.999), "USD"),
            Err(MoneyError::SubUnitPrecision(dec!(4.999)))
        );
    }

    #[test]
    fn test_to_minor_units_rejects_negative() {
        assert_eq!(
            to_minor_units(dec!(-1.00), "USD"),
            Err(MoneyError::Negative(dec!(-1.00)))
        );
    }

    #[test]
    fn test_from_minor_units() {
        assert_eq!(from_minor_units(1999, "USD"), dec!(19.99));
        assert_eq!(from_minor_units(1500, "JPY"), dec!(1500));
        assert_eq!(from_minor_units(0, "EUR"), dec!(0.00));
    }

    #[test]
    fn test_roundtrip_preserves_amount() {
        let amount = dec!(1234.56);
        let minor = to_minor_units(amount, "EUR").unwrap();
        assert_eq!(from_minor_units(minor, "EUR"), amount);
    }

    #[test]
    fn test_minor_unit_exponent() {
        assert_eq!(minor_unit_exponent("USD"), 2);
        assert_eq!(minor_unit_exponent("jpy"), 0);
        assert_eq!(minor_unit_exponent("GBP"), 2);
    }
}
