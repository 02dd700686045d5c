//! Discount engine and monetary input validation
//!
//! All calculations are done using `Decimal` internally, then converted to
//! `f64` for storage/serialization. The discount transform is applied to the
//! gross amount; net is re-derived through the base price's implied tax rate
//! and tax is the difference, so `gross == net + tax` holds on every output.

use crate::error::EngineError;
use crate::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text};
use rust_decimal::prelude::*;
use shared::money::{Money, to_decimal};
use shared::visit::{DiscountMode, LineItemEdit, ServiceLineInput, ServiceLineItem};

/// Maximum allowed price per line (1,000,000)
pub const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per line
pub const MAX_QUANTITY: i32 = 9999;

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
fn require_finite(value: f64, field_name: &str) -> Result<(), EngineError> {
    if !value.is_finite() {
        return Err(EngineError::validation(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Compute the final price for a base price under the given discount.
///
/// Pure and deterministic. Out-of-range percentages are clamped to
/// [0, 100] before use, not rejected; an amount larger than the base
/// floors at zero.
pub fn compute_final(base: &Money, mode: DiscountMode, value: f64) -> Money {
    let gross = to_decimal(base.gross);
    let value = to_decimal(value).max(Decimal::ZERO);

    let final_gross = match mode {
        DiscountMode::Percentage => {
            let pct = value.min(Decimal::ONE_HUNDRED);
            gross * (Decimal::ONE - pct / Decimal::ONE_HUNDRED)
        }
        DiscountMode::Amount => (gross - value).max(Decimal::ZERO),
        DiscountMode::FixedPrice => value,
    };

    base.with_gross(final_gross)
}

/// Validate a ServiceLineInput before submission
pub fn validate_line_input(input: &ServiceLineInput) -> Result<(), EngineError> {
    validate_required_text(&input.name, "name", MAX_NAME_LEN)?;

    // Base price must be finite, positive and within bounds
    require_finite(input.base_price.gross, "base price")?;
    if input.base_price.gross <= 0.0 {
        return Err(EngineError::validation(format!(
            "base price must be positive, got {}",
            input.base_price.gross
        )));
    }
    if input.base_price.gross > MAX_PRICE {
        return Err(EngineError::validation(format!(
            "base price exceeds maximum allowed ({}), got {}",
            MAX_PRICE, input.base_price.gross
        )));
    }

    // Quantity must be positive and within bounds
    if input.quantity <= 0 {
        return Err(EngineError::validation(format!(
            "quantity must be positive, got {}",
            input.quantity
        )));
    }
    if input.quantity > MAX_QUANTITY {
        return Err(EngineError::validation(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, input.quantity
        )));
    }

    if let Some(v) = input.discount_value {
        validate_discount_value(input.discount_mode.unwrap_or_default(), v)?;
    }

    validate_optional_text(&input.note, "note", MAX_NOTE_LEN)?;

    Ok(())
}

/// Validate a per-line edit (present fields only)
pub fn validate_line_edit(edit: &LineItemEdit) -> Result<(), EngineError> {
    if let Some(base) = &edit.base_price {
        require_finite(base.gross, "base price")?;
        if base.gross <= 0.0 {
            return Err(EngineError::validation(format!(
                "base price must be positive, got {}",
                base.gross
            )));
        }
        if base.gross > MAX_PRICE {
            return Err(EngineError::validation(format!(
                "base price exceeds maximum allowed ({}), got {}",
                MAX_PRICE, base.gross
            )));
        }
    }

    if let Some(v) = edit.discount_value {
        validate_discount_value(edit.discount_mode.unwrap_or_default(), v)?;
    }

    validate_optional_text(&edit.note, "note", MAX_NOTE_LEN)?;

    Ok(())
}

/// Validate a fully edited line before atomic submission
pub fn validate_line(line: &ServiceLineItem) -> Result<(), EngineError> {
    validate_required_text(&line.name, "name", MAX_NAME_LEN)?;

    require_finite(line.base_price.gross, "base price")?;
    if line.base_price.gross <= 0.0 {
        return Err(EngineError::validation(format!(
            "base price must be positive for '{}', got {}",
            line.name, line.base_price.gross
        )));
    }
    if line.base_price.gross > MAX_PRICE {
        return Err(EngineError::validation(format!(
            "base price exceeds maximum allowed ({}) for '{}'",
            MAX_PRICE, line.name
        )));
    }

    if line.quantity <= 0 || line.quantity > MAX_QUANTITY {
        return Err(EngineError::validation(format!(
            "quantity out of range for '{}', got {}",
            line.name, line.quantity
        )));
    }

    validate_discount_value(line.discount_mode, line.discount_value)?;
    validate_optional_text(&line.note, "note", MAX_NOTE_LEN)?;

    Ok(())
}

/// Validate a discount value against its mode
fn validate_discount_value(mode: DiscountMode, value: f64) -> Result<(), EngineError> {
    require_finite(value, "discount value")?;
    if value < 0.0 {
        return Err(EngineError::validation(format!(
            "discount value must be non-negative, got {}",
            value
        )));
    }
    match mode {
        DiscountMode::Percentage => {
            if value > 100.0 {
                return Err(EngineError::validation(format!(
                    "percentage discount must be between 0 and 100, got {}",
                    value
                )));
            }
        }
        DiscountMode::Amount | DiscountMode::FixedPrice => {
            if value > MAX_PRICE {
                return Err(EngineError::validation(format!(
                    "discount value exceeds maximum allowed ({}), got {}",
                    MAX_PRICE, value
                )));
            }
        }
    }
    Ok(())
}
