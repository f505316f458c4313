//! Common validation rules shared across request payloads.

use rust_decimal::Decimal;
use validator::ValidationError;

/// Validates login identifier format.
///
/// Requirements:
/// - Alphanumeric characters, underscores, dots and hyphens
/// - 3-100 characters in length
pub fn validate_login(login: &str) -> Result<(), ValidationError> {
    if login.len() < 3 || login.len() > 100 {
        return Err(ValidationError::new("login_invalid_length"));
    }

    if !login
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(ValidationError::new("login_invalid_characters"));
    }

    Ok(())
}

/// Rejects strings consisting only of whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Donation amounts must be strictly positive.
pub fn validate_positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() || amount.is_zero() {
        return Err(ValidationError::new("amount_not_positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn login_rejects_short() {
        assert!(validate_login("ab").is_err());
    }

    #[test]
    fn login_rejects_special_chars() {
        assert!(validate_login("user@name").is_err());
    }

    #[test]
    fn login_accepts_valid() {
        assert!(validate_login("valid_user.123").is_ok());
    }

    #[test]
    fn blank_strings_are_rejected() {
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank(" x ").is_ok());
    }

    #[test]
    fn amount_must_be_positive() {
        assert!(validate_positive_amount(&Decimal::ZERO).is_err());
        assert!(validate_positive_amount(&Decimal::from_str("-1.50").unwrap()).is_err());
        assert!(validate_positive_amount(&Decimal::from_str("0.01").unwrap()).is_ok());
    }
}
