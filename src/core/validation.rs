//! Field validation for user input.
//!
//! Callers run these checks before touching the store; a failure is returned as
//! [`Error::Validation`] and nothing is written.

use crate::errors::{Error, Result};

/// Strips non-digits and checks the result is an Indonesian mobile number
/// without country prefix: an `8` followed by 8 to 11 digits.
///
/// Returns the normalised digits.
pub fn normalize_phone(input: &str) -> Result<String> {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();

    let valid = digits.starts_with('8') && (9..=12).contains(&digits.len());
    if !valid {
        return Err(Error::validation("phone", "invalid phone number format"));
    }
    Ok(digits)
}

fn is_six_digits(value: &str) -> bool {
    value.len() == 6 && value.chars().all(|c| c.is_ascii_digit())
}

/// Checks that a PIN is exactly six ASCII digits.
pub fn validate_pin(pin: &str) -> Result<()> {
    if is_six_digits(pin) {
        Ok(())
    } else {
        Err(Error::validation("pin", "PIN must be exactly 6 digits"))
    }
}

/// Checks that an entered one-time password is complete (six digits).
pub fn validate_otp(code: &str) -> Result<()> {
    if is_six_digits(code) {
        Ok(())
    } else {
        Err(Error::validation("otp", "enter the complete 6-digit code"))
    }
}

/// Checks `local@domain.tld` shape: one `@`, no whitespace, and a dot inside
/// the domain with characters on both sides.
pub fn validate_email(email: &str) -> Result<()> {
    let invalid = || Error::validation("email", "invalid email format");

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    let has_inner_dot = domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len());
    if !has_inner_dot {
        return Err(invalid());
    }

    Ok(())
}

/// Trims a name field and rejects it if empty.
pub fn validate_name(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(field, "cannot be empty"));
    }
    Ok(trimmed.to_string())
}

/// Rejects zero and negative amounts.
pub fn validate_amount(amount: i64) -> Result<()> {
    if amount <= 0 {
        return Err(Error::validation(
            "amount",
            format!("must be greater than zero, got {amount}"),
        ));
    }
    Ok(())
}
