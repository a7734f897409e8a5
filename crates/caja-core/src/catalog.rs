//! # Catalog
//!
//! The imported product catalog: CSV-row projection with a user-supplied
//! column mapping, and lookups by reference, barcode or description.
//!
//! ## Import Flow
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  raw CSV rows + ColumnMapping                                    │
//! │       │                                                          │
//! │       ▼                                                          │
//! │  project every row ──► ok ──────────► staged product list        │
//! │       │                                                          │
//! │       └─► reject (short row, empty reference, bad price,         │
//! │           duplicate) ──► ImportReport::rejected, batch continues │
//! │                                                                  │
//! │  staged list replaces the catalog in ONE assignment: lookups     │
//! │  never observe a half-replaced catalog                           │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The mapping is data-driven (field → column index), validated eagerly;
//! only a mapping that assigns one column to two fields aborts the import.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{ImportError, RejectReason};
use crate::money::Money;
use crate::types::Product;
use crate::validation;

// =============================================================================
// Column Mapping
// =============================================================================

/// Maps the logical product fields onto CSV column indices.
///
/// Reference, description and price are mandatory; barcode is optional
/// (many supplier files simply have no barcode column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub reference: usize,
    pub description: usize,
    pub price: usize,
    pub barcode: Option<usize>,
}

impl ColumnMapping {
    /// Creates a mapping without a barcode column.
    pub const fn new(reference: usize, description: usize, price: usize) -> Self {
        ColumnMapping {
            reference,
            description,
            price,
            barcode: None,
        }
    }

    /// Adds the barcode column.
    pub const fn with_barcode(mut self, barcode: usize) -> Self {
        self.barcode = Some(barcode);
        self
    }

    /// Eager validation: every mapped field must use a distinct column.
    fn validate(&self) -> Result<(), ImportError> {
        let mut seen = HashSet::new();
        for column in self.columns() {
            if !seen.insert(column) {
                return Err(ImportError::DuplicateColumn { column });
            }
        }
        Ok(())
    }

    fn columns(&self) -> impl Iterator<Item = usize> {
        [self.reference, self.description, self.price]
            .into_iter()
            .chain(self.barcode)
    }
}

// =============================================================================
// Import Report
// =============================================================================

/// One rejected CSV row: its index within the submitted batch and why.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRow {
    /// Zero-based index into the submitted rows.
    pub row: usize,
    pub reason: RejectReason,
}

/// The outcome of an import: how many rows became products, and the rows
/// that did not, each with its reason.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    pub imported: usize,
    pub rejected: Vec<RejectedRow>,
}

// =============================================================================
// Catalog
// =============================================================================

/// The product catalog. Owns every imported [`Product`]; products change
/// only through a full re-import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Catalog::default()
    }

    /// Builds a catalog from already-validated products (state restore).
    pub fn from_products(products: Vec<Product>) -> Self {
        Catalog { products }
    }

    /// Imports `rows` through `mapping`, replacing the whole catalog on
    /// success.
    ///
    /// Row-level failures are collected in the report, not fatal: the rows
    /// that do project cleanly still become the new catalog. Only an
    /// unusable mapping aborts, leaving the existing catalog untouched.
    pub fn import(
        &mut self,
        rows: &[Vec<String>],
        mapping: &ColumnMapping,
    ) -> Result<ImportReport, ImportError> {
        mapping.validate()?;

        let mut staged: Vec<Product> = Vec::with_capacity(rows.len());
        let mut rejected = Vec::new();
        let mut seen_references: HashSet<String> = HashSet::new();
        let mut seen_barcodes: HashSet<String> = HashSet::new();

        for (index, row) in rows.iter().enumerate() {
            match project_row(row, mapping) {
                Ok(product) => {
                    if !seen_references.insert(product.reference.to_lowercase()) {
                        rejected.push(RejectedRow {
                            row: index,
                            reason: RejectReason::DuplicateReference {
                                reference: product.reference,
                            },
                        });
                        continue;
                    }
                    if let Some(barcode) = &product.barcode {
                        if !seen_barcodes.insert(barcode.to_lowercase()) {
                            rejected.push(RejectedRow {
                                row: index,
                                reason: RejectReason::DuplicateBarcode {
                                    barcode: barcode.clone(),
                                },
                            });
                            continue;
                        }
                    }
                    staged.push(product);
                }
                Err(reason) => rejected.push(RejectedRow { row: index, reason }),
            }
        }

        let report = ImportReport {
            imported: staged.len(),
            rejected,
        };
        // Single assignment: the previous catalog stays fully visible until
        // the whole batch is projected.
        self.products = staged;
        Ok(report)
    }

    /// Searches the catalog. Matches are ordered: exact reference first,
    /// then exact barcode, then description substring in catalog order;
    /// all matching is case-insensitive. An empty query returns nothing,
    /// not the whole catalog.
    pub fn find(&self, query: &str) -> Vec<&Product> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        let needle = query.to_lowercase();

        let mut matched: Vec<&Product> = Vec::new();
        let mut taken: HashSet<usize> = HashSet::new();

        for (i, product) in self.products.iter().enumerate() {
            if product.reference.eq_ignore_ascii_case(query) {
                matched.push(product);
                taken.insert(i);
            }
        }
        for (i, product) in self.products.iter().enumerate() {
            if taken.contains(&i) {
                continue;
            }
            if product
                .barcode
                .as_deref()
                .is_some_and(|b| b.eq_ignore_ascii_case(query))
            {
                matched.push(product);
                taken.insert(i);
            }
        }
        for (i, product) in self.products.iter().enumerate() {
            if taken.contains(&i) {
                continue;
            }
            if product.description.to_lowercase().contains(&needle) {
                matched.push(product);
            }
        }

        matched
    }

    /// Exact reference lookup, case-insensitive.
    pub fn by_reference(&self, reference: &str) -> Option<&Product> {
        self.products
            .iter()
            .find(|p| p.reference.eq_ignore_ascii_case(reference))
    }

    /// Exact barcode lookup, case-insensitive.
    pub fn by_barcode(&self, barcode: &str) -> Option<&Product> {
        self.products
            .iter()
            .find(|p| p.barcode.as_deref().is_some_and(|b| b.eq_ignore_ascii_case(barcode)))
    }

    /// Scanner-style lookup: reference first, then barcode.
    pub fn lookup_code(&self, code: &str) -> Option<&Product> {
        self.by_reference(code).or_else(|| self.by_barcode(code))
    }

    /// All products in import order (for UI listing).
    pub fn all(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Projects one CSV row into a product, or says why it cannot be one.
fn project_row(row: &[String], mapping: &ColumnMapping) -> Result<Product, RejectReason> {
    let cell = |column: usize| -> Result<&str, RejectReason> {
        row.get(column)
            .map(|c| c.trim())
            .ok_or(RejectReason::ShortRow {
                width: row.len(),
                needed: column,
            })
    };

    let reference = cell(mapping.reference)?;
    if reference.is_empty() {
        return Err(RejectReason::MissingReference);
    }
    let description = cell(mapping.description)?.to_string();

    let price_cell = cell(mapping.price)?;
    let unit_price = Money::parse(price_cell).ok_or_else(|| RejectReason::InvalidPrice {
        value: price_cell.to_string(),
    })?;
    if validation::validate_unit_price(unit_price).is_err() {
        return Err(RejectReason::InvalidPrice {
            value: price_cell.to_string(),
        });
    }

    let barcode = match mapping.barcode {
        Some(column) => Some(cell(column)?).filter(|b| !b.is_empty()),
        None => None,
    };

    Ok(Product {
        reference: reference.to_string(),
        description,
        barcode: barcode.map(str::to_string),
        unit_price,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
