//! Input validation helpers
//!
//! Text length limits and field checks shared by the order handlers.
//! Every failure carries the offending field in the error details.

use rust_decimal::Decimal;

use crate::utils::AppError;

/// Customer and model ids, reporter names
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Notes, kickback reasons, resolution notes
pub const MAX_NOTE_LEN: usize = 2000;

/// Misc line item descriptions
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Largest money amount accepted on an order (prices, discounts, misc items)
pub const MAX_MONEY_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Largest misc item quantity
pub const MAX_QUANTITY: i32 = 100_000;

/// Validate a money amount lies in `0..=MAX_MONEY_AMOUNT`.
pub fn validate_money(value: Decimal, field: &str) -> Result<(), AppError> {
    if value < Decimal::ZERO || value > MAX_MONEY_AMOUNT {
        return Err(AppError::out_of_range(
            field,
            format!("{field} must be between 0 and {MAX_MONEY_AMOUNT}"),
        ));
    }
    Ok(())
}

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(
            AppError::validation(format!("{field} must not be empty")).with_detail("field", field)
        );
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        ))
        .with_detail("field", field));
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
        ))
        .with_detail("field", field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("C-100", "customer_id", MAX_SHORT_TEXT_LEN).is_ok());

        let err = validate_required_text("  ", "customer_id", MAX_SHORT_TEXT_LEN).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.details.unwrap().get("field").unwrap(), "customer_id");

        let long = "x".repeat(MAX_SHORT_TEXT_LEN + 1);
        assert!(validate_required_text(&long, "model_id", MAX_SHORT_TEXT_LEN).is_err());
    }

    #[test]
    fn test_optional_text() {
        assert!(validate_optional_text(&None, "notes", MAX_NOTE_LEN).is_ok());
        assert!(validate_optional_text(&Some("ok".into()), "notes", MAX_NOTE_LEN).is_ok());
        let long = Some("x".repeat(MAX_NOTE_LEN + 1));
        assert!(validate_optional_text(&long, "notes", MAX_NOTE_LEN).is_err());
    }

    #[test]
    fn test_money_bounds() {
        assert!(validate_money(Decimal::ZERO, "price_override").is_ok());
        assert!(validate_money(MAX_MONEY_AMOUNT, "price_override").is_ok());

        let err = validate_money(Decimal::MAX, "misc_items[0].unit_price").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
        assert_eq!(
            err.details.unwrap().get("field").unwrap(),
            "misc_items[0].unit_price"
        );
        assert!(validate_money(Decimal::NEGATIVE_ONE, "discount").is_err());
    }
}
