//! Common validation utilities.

use rust_decimal::Decimal;
use validator::ValidationError;

/// Maximum quantity for a single cart line or gift.
const MAX_QUANTITY: i32 = 99;

/// Maximum gift price accepted from couples.
const MAX_PRICE: i64 = 1_000_000;

lazy_static::lazy_static! {
    /// Loose phone format: optional +, digits, spaces, dashes, parentheses.
    static ref PHONE_REGEX: regex::Regex =
        regex::Regex::new(r"^\+?[0-9][0-9 ()\-]{5,19}$").unwrap();
}

/// Validates that a quantity is between 1 and the allowed maximum.
pub fn validate_quantity(quantity: i32) -> Result<(), ValidationError> {
    if (1..=MAX_QUANTITY).contains(&quantity) {
        Ok(())
    } else {
        let mut err = ValidationError::new("quantity_range");
        err.message = Some(format!("Quantity must be between 1 and {}", MAX_QUANTITY).into());
        Err(err)
    }
}

/// Validates that a price is positive and within the accepted range.
pub fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price > Decimal::ZERO && *price <= Decimal::from(MAX_PRICE) {
        Ok(())
    } else {
        let mut err = ValidationError::new("price_range");
        err.message = Some(format!("Price must be between 0 and {}", MAX_PRICE).into());
        Err(err)
    }
}

/// Validates a phone number in loose international format.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if PHONE_REGEX.is_match(phone) {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone_format");
        err.message = Some("Invalid phone number format".into());
        Err(err)
    }
}

/// Validates a three-letter ISO currency code.
pub fn validate_currency(currency: &str) -> Result<(), ValidationError> {
    if currency.len() == 3 && currency.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("currency_format");
        err.message = Some("Currency must be a three-letter ISO code".into());
        Err(err)
    }
}
