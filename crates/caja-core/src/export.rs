//! # Export / Reconciliation
//!
//! Derives the close-time CSV export rows from a session's charged sales:
//! one row per product reference with the units and amount sold. Rows are
//! derived, never stored; calling the builder twice on the same sales
//! yields identical output.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::sale::Sale;

// =============================================================================
// Export Basis
// =============================================================================

/// Whether `amount_sold` is tax-inclusive or pre-tax.
///
/// Gross matches the grand totals printed on tickets and is the default;
/// Net exports the taxable base instead. Both stay available because
/// accounting back-ends disagree on which they want.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportBasis {
    #[default]
    Gross,
    Net,
}

// =============================================================================
// Export Row
// =============================================================================

/// One line of the session export: everything sold under one reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub reference: String,
    /// Description snapshot from the first line sold under this reference.
    pub description: String,
    /// Total units sold; fractional when weighed goods were sold.
    pub units_sold: Decimal,
    /// Amount sold on the chosen basis, unrounded until written out.
    pub amount_sold: Money,
}

/// Groups every line of every charged sale by product reference, summing
/// quantities and amounts. Output is ordered by first appearance of each
/// reference in the sale history.
pub fn build_export_rows(sales: &[Sale], basis: ExportBasis) -> Vec<ExportRow> {
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<ExportRow> = Vec::new();

    for sale in sales {
        for line in sale.lines() {
            let amount = match basis {
                ExportBasis::Gross => line.total(),
                ExportBasis::Net => line.net(),
            };
            match position.get(line.reference.as_str()) {
                Some(&at) => {
                    rows[at].units_sold += line.quantity;
                    rows[at].amount_sold += amount;
                }
                None => {
                    position.insert(line.reference.as_str(), rows.len());
                    rows.push(ExportRow {
                        reference: line.reference.clone(),
                        description: line.description.clone(),
                        units_sold: line.quantity,
                        amount_sold: amount,
                    });
                }
            }
        }
    }

    rows
}

// =============================================================================
// Unit Tests
// =============================================================================
