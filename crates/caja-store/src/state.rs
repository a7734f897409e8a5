//! # State Record
//!
//! The single JSON document a till persists between runs: catalog
//! products, ticket template, the configured printer, and the open
//! register session if one was running.
//!
//! ## Load Contract
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  state.json ──► parse ──► validate invariants ──► Till       │
//! │                   │              │                           │
//! │                   ▼              ▼                           │
//! │               Corrupt        Corrupt                         │
//! │                                                              │
//! │  A failed check NEVER repairs or partially loads: the caller │
//! │  gets Corrupt and no till is built from the record.          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The invariants checked here are the domain's own (unique references,
//! non-negative prices, charged-only session history); the checks reuse
//! caja-core's validation so the two layers cannot drift apart.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use caja_core::till::TillSnapshot;
use caja_core::validation;

use crate::error::{StoreError, StoreResult};

/// Bumped whenever the record layout changes incompatibly.
pub const STATE_SCHEMA_VERSION: u32 = 1;

// =============================================================================
// State Record
// =============================================================================

/// Everything a till persists, as one opaque JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
    pub schema_version: u32,
    /// Configured printer queue name, if any.
    pub printer_name: Option<String>,
    /// Catalog, template and open session.
    pub till: TillSnapshot,
}

impl StateRecord {
    /// Wraps a till snapshot for saving.
    pub fn new(till: TillSnapshot, printer_name: Option<String>) -> Self {
        StateRecord {
            schema_version: STATE_SCHEMA_VERSION,
            printer_name,
            till,
        }
    }

    /// Checks every domain invariant the record must satisfy before it may
    /// become a running till.
    pub fn validate(&self) -> StoreResult<()> {
        if self.schema_version != STATE_SCHEMA_VERSION {
            return Err(corrupt(format!(
                "unsupported schema version {}",
                self.schema_version
            )));
        }

        let mut references: HashSet<String> = HashSet::new();
        let mut barcodes: HashSet<String> = HashSet::new();
        for product in &self.till.products {
            let reference = product.reference.trim();
            if reference.is_empty() {
                return Err(corrupt("product with an empty reference".to_string()));
            }
            if !references.insert(reference.to_lowercase()) {
                return Err(corrupt(format!("duplicate reference {reference:?}")));
            }
            if let Some(barcode) = &product.barcode {
                if barcode.trim().is_empty() {
                    return Err(corrupt(format!(
                        "product {reference:?} has an empty barcode"
                    )));
                }
                if !barcodes.insert(barcode.to_lowercase()) {
                    return Err(corrupt(format!("duplicate barcode {barcode:?}")));
                }
            }
            if product.unit_price.is_negative() {
                return Err(corrupt(format!(
                    "product {reference:?} has a negative price"
                )));
            }
        }

        if let Err(err) = validation::validate_vat_rate(self.till.template.default_vat_rate) {
            return Err(corrupt(format!("template: {err}")));
        }

        if let Some(session) = &self.till.session {
            if session.closed_at().is_some() {
                return Err(corrupt(
                    "persisted session is already closed".to_string(),
                ));
            }
            for sale in session.sales() {
                if !sale.is_charged() {
                    return Err(corrupt(format!(
                        "session history holds a non-charged sale {}",
                        sale.id()
                    )));
                }
                if sale.is_empty() {
                    return Err(corrupt(format!(
                        "charged sale {} has no lines",
                        sale.id()
                    )));
                }
                for line in sale.lines() {
                    if let Err(err) = validation::validate_line(line) {
                        return Err(corrupt(format!("sale {}: {err}", sale.id())));
                    }
                }
            }
        }

        Ok(())
    }
}

fn corrupt(reason: String) -> StoreError {
    StoreError::Corrupt { reason }
}

// =============================================================================
// State Store
// =============================================================================

/// Loads and saves the state record at a fixed path. The path itself is
/// the host's choice; this store never invents locations.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StateStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and validates the record. A missing file is `Ok(None)` (first
    /// run); an unreadable or invariant-violating file is an error.
    pub fn load(&self) -> StoreResult<Option<StateRecord>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no state file, starting clean");
            return Ok(None);
        }

        let text = fs::read_to_string(&self.path)?;
        let record: StateRecord = serde_json::from_str(&text)
            .map_err(|err| corrupt(format!("state record does not parse: {err}")))?;
        record.validate()?;

        info!(
            path = %self.path.display(),
            products = record.till.products.len(),
            session_open = record.till.session.is_some(),
            "state loaded"
        );
        Ok(Some(record))
    }

    /// Writes the record as pretty-printed JSON.
    pub fn save(&self, record: &StateRecord) -> StoreResult<()> {
        let text = serde_json::to_string_pretty(record)?;
        fs::write(&self.path, text)?;
        debug!(path = %self.path.display(), "state saved");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use caja_core::catalog::ColumnMapping;
    use caja_core::money::Money;
    use caja_core::register::RegisterStatus;
    use caja_core::sale::LineOverrides;
    use caja_core::till::Till;
    use caja_core::types::Product;
    use rust_decimal_macros::dec;

    fn seeded_till() -> Till {
        let till = Till::new();
        let rows = vec![
            vec![
                "REF1".to_string(),
                "Espresso cup".to_string(),
                "8412345678905".to_string(),
                "10.00".to_string(),
            ],
            vec![
                "REF2".to_string(),
                "Decaf espresso beans".to_string(),
                String::new(),
                "5.00".to_string(),
            ],
        ];
        till.import_products(&rows, &ColumnMapping::new(0, 1, 3).with_barcode(2))
            .unwrap();
        till
    }

    #[test]
    fn test_round_trip_with_open_session() {
        let till = seeded_till();
        till.open_register().unwrap();
        till.add_product_to_sale("REF1", dec!(2), LineOverrides::default())
            .unwrap();
        till.charge_sale().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("state.json"));
        store
            .save(&StateRecord::new(till.snapshot(), Some("thermal".to_string())))
            .unwrap();

        let record = store.load().unwrap().expect("state file exists");
        assert_eq!(record.printer_name.as_deref(), Some("thermal"));

        let restored = Till::restore(record.till);
        assert_eq!(restored.products().len(), 2);
        assert_eq!(restored.register_status(), RegisterStatus::Open);
        assert_eq!(
            restored.session_totals().unwrap().grand_total,
            Money::new(dec!(24.20))
        );
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("absent.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_unparseable_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();

        let err = StateStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn test_duplicate_reference_is_corrupt() {
        let mut record = StateRecord::new(seeded_till().snapshot(), None);
        record
            .till
            .products
            .push(Product::new("ref1", "Shadow", Money::new(dec!(1))));

        let err = record.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate reference"));
    }

    #[test]
    fn test_negative_price_is_corrupt() {
        let mut record = StateRecord::new(seeded_till().snapshot(), None);
        record
            .till
            .products
            .push(Product::new("REF9", "Broken", Money::new(dec!(-1))));

        let err = record.validate().unwrap_err();
        assert!(err.to_string().contains("negative price"));
    }

    #[test]
    fn test_tampered_sale_status_is_corrupt() {
        let till = seeded_till();
        till.open_register().unwrap();
        till.add_product_to_sale("REF1", dec!(1), LineOverrides::default())
            .unwrap();
        till.charge_sale().unwrap();
        let record = StateRecord::new(till.snapshot(), None);

        // Flip the charged sale back to "open" at the JSON level, the way a
        // hand-edited or truncated file would present it.
        let mut value: serde_json::Value = serde_json::to_value(&record).unwrap();
        value["till"]["session"]["charged"][0]["status"] = "open".into();
        let tampered: StateRecord = serde_json::from_value(value).unwrap();

        let err = tampered.validate().unwrap_err();
        assert!(err.to_string().contains("non-charged sale"));
    }

    #[test]
    fn test_closed_session_is_corrupt() {
        let till = seeded_till();
        till.open_register().unwrap();
        till.add_product_to_sale("REF1", dec!(1), LineOverrides::default())
            .unwrap();
        till.charge_sale().unwrap();
        let record = StateRecord::new(till.snapshot(), None);

        let mut value: serde_json::Value = serde_json::to_value(&record).unwrap();
        value["till"]["session"]["closed_at"] = "2026-08-06T12:00:00Z".into();
        let tampered: StateRecord = serde_json::from_value(value).unwrap();

        let err = tampered.validate().unwrap_err();
        assert!(err.to_string().contains("already closed"));
    }

    #[test]
    fn test_unsupported_schema_version_is_corrupt() {
        let mut record = StateRecord::new(seeded_till().snapshot(), None);
        record.schema_version = 99;
        let err = record.validate().unwrap_err();
        assert!(err.to_string().contains("schema version"));
    }
}
