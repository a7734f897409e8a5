//! # Domain Types
//!
//! Shared domain types: VAT rates, catalog products and the ticket template.
//!
//! The sale ledger and register session have their own modules ([`crate::sale`],
//! [`crate::register`]); this module holds the types both sides read.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;
use crate::{DEFAULT_TICKET_FOOTER, DEFAULT_TICKET_HEADER, DEFAULT_VAT_PERCENT};

// =============================================================================
// VAT Rate
// =============================================================================

/// A VAT rate expressed as a decimal percentage (`21` means 21%).
///
/// ## Why a decimal percent?
/// The register accepts half-point rates (10.5%), and the rate doubles as
/// the grouping key for the per-rate tax breakdown, so it must compare and
/// hash exactly. `Decimal` gives both.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct VatRate(Decimal);

impl VatRate {
    /// Creates a rate from a decimal percentage.
    #[inline]
    pub const fn from_percent(percent: Decimal) -> Self {
        VatRate(percent)
    }

    /// Returns the rate as a decimal percentage.
    #[inline]
    pub const fn percent(&self) -> Decimal {
        self.0
    }

    /// Returns the multiplicative fraction: 21% becomes `0.21`.
    #[inline]
    pub fn fraction(&self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }

    /// Computes the tax due on a net amount, at full precision.
    #[inline]
    pub fn tax_on(&self, net: Money) -> Money {
        net * self.fraction()
    }

    /// Zero rate (exempt goods).
    #[inline]
    pub const fn zero() -> Self {
        VatRate(Decimal::ZERO)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

/// The till-wide default rate, used until a template overrides it.
impl Default for VatRate {
    fn default() -> Self {
        VatRate(Decimal::from(DEFAULT_VAT_PERCENT))
    }
}

/// Renders as `21%` or `10.5%` (trailing zeros trimmed).
impl fmt::Display for VatRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product imported into the catalog.
///
/// Immutable once imported: a re-import replaces the whole catalog rather
/// than patching individual products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Business identifier, unique within the catalog.
    pub reference: String,

    /// Display name shown to the cashier and printed on tickets.
    pub description: String,

    /// Barcode (EAN-13, UPC-A, ...), unique within the catalog if present.
    pub barcode: Option<String>,

    /// Catalog unit price; the default for new sale lines.
    pub unit_price: Money,
}

impl Product {
    /// Creates a product without a barcode.
    pub fn new(
        reference: impl Into<String>,
        description: impl Into<String>,
        unit_price: Money,
    ) -> Self {
        Product {
            reference: reference.into(),
            description: description.into(),
            barcode: None,
            unit_price,
        }
    }

    /// Attaches a barcode.
    pub fn with_barcode(mut self, barcode: impl Into<String>) -> Self {
        self.barcode = Some(barcode.into());
        self
    }

    /// True when `code` equals this product's reference or barcode
    /// (case-insensitive). Scanner input matches either.
    pub fn matches_code(&self, code: &str) -> bool {
        self.reference.eq_ignore_ascii_case(code)
            || self
                .barcode
                .as_deref()
                .is_some_and(|b| b.eq_ignore_ascii_case(code))
    }
}

// =============================================================================
// Ticket Template
// =============================================================================

/// Till-wide ticket configuration: header/footer text and the default VAT
/// rate for new sales. Mutated only by an explicit configuration action;
/// the register snapshots it when a session opens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketTemplate {
    pub header: String,
    pub footer: String,
    pub default_vat_rate: VatRate,
}

impl Default for TicketTemplate {
    fn default() -> Self {
        TicketTemplate {
            header: DEFAULT_TICKET_HEADER.to_string(),
            footer: DEFAULT_TICKET_FOOTER.to_string(),
            default_vat_rate: VatRate::default(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_vat_fraction_and_tax() {
        let rate = VatRate::from_percent(dec!(21));
        assert_eq!(rate.fraction(), dec!(0.21));
        assert_eq!(rate.tax_on(Money::new(dec!(20))), Money::new(dec!(4.20)));
    }

    #[test]
    fn test_vat_display_trims_zeros() {
        assert_eq!(VatRate::from_percent(dec!(21.00)).to_string(), "21%");
        assert_eq!(VatRate::from_percent(dec!(10.5)).to_string(), "10.5%");
        assert_eq!(VatRate::zero().to_string(), "0%");
    }

    #[test]
    fn test_vat_rates_with_different_scales_are_equal() {
        // Grouping by rate must not split 21 and 21.0 into two buckets.
        assert_eq!(
            VatRate::from_percent(dec!(21)),
            VatRate::from_percent(dec!(21.0))
        );
    }

    #[test]
    fn test_default_template() {
        let template = TicketTemplate::default();
        assert_eq!(template.header, "*** Point of Sale ***");
        assert_eq!(template.default_vat_rate.percent(), dec!(21));
    }

    #[test]
    fn test_product_matches_code() {
        let product =
            Product::new("REF1", "Espresso cup", Money::new(dec!(10))).with_barcode("8412345");
        assert!(product.matches_code("ref1"));
        assert!(product.matches_code("8412345"));
        assert!(!product.matches_code("REF2"));
    }
}
