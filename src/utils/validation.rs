//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! Limits are chosen as reasonable UX limits for names, notes and
//! addresses; SurrealDB strings have no built-in length enforcement.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: product, urgent-sale item, line-item name, etc.
pub const MAX_NAME_LEN: usize = 200;

/// Notes, status-history notes, import metadata
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone, postal code, payment references
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

/// Per-line-item quantity cap (sanity bound, not a stock check)
pub const MAX_ITEM_QUANTITY: i32 = 10_000;

// ── Validation helpers (CRUD handlers) ──────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate an ordered quantity: at least 1, below the sanity cap.
pub fn validate_quantity(quantity: i32, field: &str) -> Result<(), AppError> {
    if quantity < 1 {
        return Err(AppError::validation(format!(
            "{field} must be at least 1 (got {quantity})"
        )));
    }
    if quantity > MAX_ITEM_QUANTITY {
        return Err(AppError::validation(format!(
            "{field} exceeds the maximum of {MAX_ITEM_QUANTITY}"
        )));
    }
    Ok(())
}

/// Validate a price: finite and non-negative.
pub fn validate_price(price: f64, field: &str) -> Result<(), AppError> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::validation(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text_rejects_empty() {
        assert!(validate_required_text("  ", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text("ok", "name", MAX_NAME_LEN).is_ok());
    }

    #[test]
    fn test_required_text_rejects_overlong() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(validate_required_text(&long, "name", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn test_quantity_bounds() {
        assert!(validate_quantity(0, "quantity").is_err());
        assert!(validate_quantity(-3, "quantity").is_err());
        assert!(validate_quantity(1, "quantity").is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1, "quantity").is_err());
    }

    #[test]
    fn test_price_rejects_nan_and_negative() {
        assert!(validate_price(f64::NAN, "price").is_err());
        assert!(validate_price(-0.5, "price").is_err());
        assert!(validate_price(12.5, "price").is_ok());
    }
}
