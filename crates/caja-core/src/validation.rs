//! # Validation Module
//!
//! Shared validation rules for sale line input.
//!
//! The same checks run in two places: when the ledger accepts or edits a
//! line, and when the store crate verifies a loaded state record before
//! trusting it. Keeping them here means both paths agree on what a legal
//! line is.

use rust_decimal::Decimal;

use crate::error::{SaleError, SaleResult};
use crate::money::Money;
use crate::sale::{Discount, SaleLine};
use crate::types::VatRate;

/// Validates a line quantity: strictly positive.
pub fn validate_quantity(quantity: Decimal) -> SaleResult<()> {
    if quantity <= Decimal::ZERO {
        return Err(SaleError::InvalidQuantity { quantity });
    }
    Ok(())
}

/// Validates a unit price: non-negative. Zero is allowed (free items).
pub fn validate_unit_price(price: Money) -> SaleResult<()> {
    if price.is_negative() {
        return Err(SaleError::InvalidPrice {
            price: price.amount(),
        });
    }
    Ok(())
}

/// Validates a VAT rate: within `[0, 100]` percent.
pub fn validate_vat_rate(rate: VatRate) -> SaleResult<()> {
    if rate.percent() < Decimal::ZERO || rate.percent() > Decimal::ONE_HUNDRED {
        return Err(SaleError::InvalidVatRate {
            percent: rate.percent(),
        });
    }
    Ok(())
}

/// Validates a discount against the line subtotal it applies to:
/// percentages stay within `[0, 100]`, amounts within `[0, subtotal]`.
pub fn validate_discount(discount: &Discount, subtotal: Money) -> SaleResult<()> {
    match discount {
        Discount::Percent(pct) => {
            if *pct < Decimal::ZERO || *pct > Decimal::ONE_HUNDRED {
                return Err(SaleError::InvalidDiscount {
                    value: *pct,
                    max: Decimal::ONE_HUNDRED,
                });
            }
        }
        Discount::Amount(amount) => {
            if amount.is_negative() || *amount > subtotal {
                return Err(SaleError::InvalidDiscount {
                    value: amount.amount(),
                    max: subtotal.amount(),
                });
            }
        }
    }
    Ok(())
}

/// Validates a whole line: quantity, price, VAT rate, then the discount
/// against the resulting subtotal.
pub fn validate_line(line: &SaleLine) -> SaleResult<()> {
    validate_quantity(line.quantity)?;
    validate_unit_price(line.unit_price)?;
    validate_vat_rate(line.vat_rate)?;
    validate_discount(&line.discount, line.subtotal())
}

// =============================================================================
// Unit Tests
// =============================================================================
