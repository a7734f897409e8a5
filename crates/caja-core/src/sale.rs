//! # Sale Ledger
//!
//! The line-item model for one in-progress sale: add/edit/remove lines,
//! charge, and compute totals.
//!
//! ## Ledger Lifecycle
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     Sale State Machine                           │
//! │                                                                  │
//! │   Sale::new ──► Open ── add_product / edit_line / remove_line    │
//! │                  │         (validated, indices are positions)    │
//! │                  │                                               │
//! │                  ▼ charge()  (EmptySale if no lines)             │
//! │               Charged  ──► owned by the register session         │
//! │                  │                                               │
//! │                  └── every further mutation → SaleFinalized      │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Totals Discipline
//! The VAT breakdown groups lines by their effective rate and computes the
//! tax on each rate's aggregate net (sum-then-multiply). Nothing here is
//! rounded; amounts collapse to currency precision only when rendered.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{SaleError, SaleResult};
use crate::money::Money;
use crate::types::{Product, VatRate};
use crate::validation;

// =============================================================================
// Discount
// =============================================================================

/// A per-line discount: either a percentage of the line subtotal or a flat
/// amount taken off it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discount {
    /// Percentage of the line subtotal, in `[0, 100]`.
    Percent(Decimal),
    /// Flat amount, in `[0, line_subtotal]`.
    Amount(Money),
}

impl Discount {
    /// No discount.
    #[inline]
    pub const fn none() -> Self {
        Discount::Percent(Decimal::ZERO)
    }

    /// The amount this discount takes off a given line subtotal.
    pub fn amount_on(&self, subtotal: Money) -> Money {
        match self {
            Discount::Percent(pct) => subtotal * (*pct / Decimal::ONE_HUNDRED),
            Discount::Amount(amount) => *amount,
        }
    }

    /// True when the discount takes nothing off.
    pub fn is_zero(&self) -> bool {
        match self {
            Discount::Percent(pct) => pct.is_zero(),
            Discount::Amount(amount) => amount.is_zero(),
        }
    }
}

impl Default for Discount {
    fn default() -> Self {
        Discount::none()
    }
}

/// Renders the discount magnitude: `5%` or `$1.00` (callers add the sign).
impl fmt::Display for Discount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discount::Percent(pct) => write!(f, "{}%", pct.normalize()),
            Discount::Amount(amount) => write!(f, "{amount}"),
        }
    }
}

// =============================================================================
// Sale Line
// =============================================================================

/// One product entry within a sale.
///
/// `description` and `unit_price` are snapshots taken when the line is
/// added; a later catalog re-import does not rewrite recorded lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleLine {
    /// Product reference at add time.
    pub reference: String,

    /// Product description at add time (frozen).
    pub description: String,

    /// Units sold; strictly positive, fractional allowed (weighed goods).
    pub quantity: Decimal,

    /// Unit price; defaults to the catalog price, may be overridden.
    pub unit_price: Money,

    /// Per-line discount.
    pub discount: Discount,

    /// Effective VAT rate for this line.
    pub vat_rate: VatRate,
}

impl SaleLine {
    /// `quantity × unit_price`, before discount and tax.
    #[inline]
    pub fn subtotal(&self) -> Money {
        self.unit_price * self.quantity
    }

    /// The discount amount taken off this line.
    #[inline]
    pub fn discount_amount(&self) -> Money {
        self.discount.amount_on(self.subtotal())
    }

    /// Taxable amount: subtotal minus discount.
    #[inline]
    pub fn net(&self) -> Money {
        self.subtotal() - self.discount_amount()
    }

    /// VAT due on this line's net.
    #[inline]
    pub fn tax(&self) -> Money {
        self.vat_rate.tax_on(self.net())
    }

    /// Net plus tax.
    #[inline]
    pub fn total(&self) -> Money {
        self.net() + self.tax()
    }
}

// =============================================================================
// Add / Edit Inputs
// =============================================================================

/// Optional overrides when adding a line; whatever is `None` falls back to
/// the catalog price, no discount, and the sale's default VAT rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineOverrides {
    pub unit_price: Option<Money>,
    pub discount: Option<Discount>,
    pub vat_rate: Option<VatRate>,
}

/// A partial edit of an existing line; `None` fields keep their value.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineEdit {
    pub quantity: Option<Decimal>,
    pub unit_price: Option<Money>,
    pub discount: Option<Discount>,
    pub vat_rate: Option<VatRate>,
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Lines are still being added and edited.
    #[default]
    Open,
    /// Finalized; counted toward session totals, immutable.
    Charged,
}

// =============================================================================
// Totals
// =============================================================================

/// Net and tax accumulated for one VAT rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateTotals {
    pub net: Money,
    pub tax: Money,
}

/// Fresh aggregate figures for a set of sale lines.
///
/// Used for both a single sale and a whole session: the aggregation
/// discipline (group nets by rate, multiply once per rate) is identical,
/// only the line set differs.
#[derive(Debug, Clone, PartialEq)]
pub struct Totals {
    /// Sum of line subtotals, before discounts.
    pub subtotal: Money,
    /// Sum of line discounts.
    pub discount_total: Money,
    /// Taxable base: subtotal minus discounts.
    pub taxable_base: Money,
    /// Per-rate breakdown; the tax at each rate is computed on the rate's
    /// aggregate net, never summed from per-line rounded values.
    pub tax_by_rate: BTreeMap<VatRate, RateTotals>,
    /// Sum of the per-rate taxes.
    pub tax_total: Money,
    /// Taxable base plus tax.
    pub grand_total: Money,
}

impl Totals {
    /// Computes totals from scratch for the given lines.
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a SaleLine>) -> Totals {
        let mut subtotal = Money::zero();
        let mut discount_total = Money::zero();
        let mut nets: BTreeMap<VatRate, Money> = BTreeMap::new();

        for line in lines {
            subtotal += line.subtotal();
            discount_total += line.discount_amount();
            *nets.entry(line.vat_rate).or_insert_with(Money::zero) += line.net();
        }

        let mut tax_by_rate = BTreeMap::new();
        let mut tax_total = Money::zero();
        for (rate, net) in nets {
            let tax = rate.tax_on(net);
            tax_total += tax;
            tax_by_rate.insert(rate, RateTotals { net, tax });
        }

        let taxable_base = subtotal - discount_total;
        Totals {
            subtotal,
            discount_total,
            taxable_base,
            tax_by_rate,
            tax_total,
            grand_total: taxable_base + tax_total,
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// One sale: an ordered ledger of lines plus the Open/Charged state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    id: Uuid,
    created_at: DateTime<Utc>,
    status: SaleStatus,
    default_vat_rate: VatRate,
    lines: Vec<SaleLine>,
}

impl Sale {
    /// Starts an empty open sale. New lines default to `default_vat_rate`
    /// (the template rate snapshotted by the caller).
    pub fn new(default_vat_rate: VatRate) -> Self {
        Sale {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            status: SaleStatus::Open,
            default_vat_rate,
            lines: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn status(&self) -> SaleStatus {
        self.status
    }

    pub fn is_charged(&self) -> bool {
        self.status == SaleStatus::Charged
    }

    /// Current lines, in entry order. Indices into this slice are the line
    /// indices every mutating operation takes.
    pub fn lines(&self) -> &[SaleLine] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn default_vat_rate(&self) -> VatRate {
        self.default_vat_rate
    }

    fn ensure_open(&self) -> SaleResult<()> {
        match self.status {
            SaleStatus::Open => Ok(()),
            SaleStatus::Charged => Err(SaleError::SaleFinalized),
        }
    }

    /// Appends a line for `product`, snapshotting its description and
    /// price. Returns the new line's index.
    pub fn add_product(
        &mut self,
        product: &Product,
        quantity: Decimal,
        overrides: LineOverrides,
    ) -> SaleResult<usize> {
        self.add_line(SaleLine {
            reference: product.reference.clone(),
            description: product.description.clone(),
            quantity,
            unit_price: overrides.unit_price.unwrap_or(product.unit_price),
            discount: overrides.discount.unwrap_or_default(),
            vat_rate: overrides.vat_rate.unwrap_or(self.default_vat_rate),
        })
    }

    /// Appends an already-built line (free-form entries without a catalog
    /// product). Returns the new line's index.
    pub fn add_line(&mut self, line: SaleLine) -> SaleResult<usize> {
        self.ensure_open()?;
        validation::validate_line(&line)?;
        self.lines.push(line);
        Ok(self.lines.len() - 1)
    }

    /// Replaces any subset of a line's fields. The resulting line is
    /// validated as a whole before the edit is committed, so a failed edit
    /// leaves the line untouched.
    pub fn edit_line(&mut self, index: usize, edit: LineEdit) -> SaleResult<()> {
        self.ensure_open()?;
        let len = self.lines.len();
        let line = self
            .lines
            .get_mut(index)
            .ok_or(SaleError::LineNotFound { index, len })?;

        let mut updated = line.clone();
        if let Some(quantity) = edit.quantity {
            updated.quantity = quantity;
        }
        if let Some(unit_price) = edit.unit_price {
            updated.unit_price = unit_price;
        }
        if let Some(discount) = edit.discount {
            updated.discount = discount;
        }
        if let Some(vat_rate) = edit.vat_rate {
            updated.vat_rate = vat_rate;
        }
        validation::validate_line(&updated)?;

        *line = updated;
        Ok(())
    }

    /// Removes and returns the line at `index`. Later lines shift down one
    /// position; callers must re-resolve any cached indices.
    pub fn remove_line(&mut self, index: usize) -> SaleResult<SaleLine> {
        self.ensure_open()?;
        let len = self.lines.len();
        if index >= len {
            return Err(SaleError::LineNotFound { index, len });
        }
        Ok(self.lines.remove(index))
    }

    /// Finalizes the sale: Open → Charged. Irreversible; fails with
    /// `EmptySale` when there are no lines.
    pub fn charge(&mut self) -> SaleResult<()> {
        self.ensure_open()?;
        if self.lines.is_empty() {
            return Err(SaleError::EmptySale);
        }
        self.status = SaleStatus::Charged;
        Ok(())
    }

    /// Fresh totals for the current lines. Never cached; edits can never
    /// leave stale aggregates behind.
    pub fn totals(&self) -> Totals {
        Totals::from_lines(&self.lines)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
