//! Shared field validation helpers.
//!
//! Each helper returns a `CoreError::Validation` naming the offending field.

use crate::error::CoreError;

/// Validate that a string field is present and not blank.
pub fn validate_non_empty(value: &str, name: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{name} must not be empty")));
    }
    Ok(())
}

/// Validate that an integer field is strictly positive.
pub fn validate_positive_int(value: u32, name: &str) -> Result<(), CoreError> {
    if value == 0 {
        return Err(CoreError::Validation(format!(
            "{name} must be a positive integer, got {value}"
        )));
    }
    Ok(())
}

/// Validate that a float field is finite and strictly positive.
pub fn validate_positive_float(value: f64, name: &str) -> Result<(), CoreError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CoreError::Validation(format!(
            "{name} must be greater than 0, got {value}"
        )));
    }
    Ok(())
}

/// Validate that a value falls within the open interval `(0.0, 1.0)`.
pub fn validate_open_unit_range(value: f64, name: &str) -> Result<(), CoreError> {
    if !(value > 0.0 && value < 1.0) {
        return Err(CoreError::Validation(format!(
            "{name} must be strictly between 0.0 and 1.0, got {value}"
        )));
    }
    Ok(())
}
