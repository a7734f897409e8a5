//! # caja-core: Pure Domain Engine for the Caja Point of Sale
//!
//! This crate is the **heart** of Caja. It contains the whole sales-session
//! domain as pure logic with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Caja Architecture                          │
//! │                                                                   │
//! │  ┌─────────────────────────────────────────────────────────────┐  │
//! │  │                  Host front-end (GUI / CLI)                 │  │
//! │  │   product search ──► sale entry ──► charge ──► register     │  │
//! │  └────────────────────────────┬────────────────────────────────┘  │
//! │                               │                                   │
//! │  ┌────────────────────────────▼────────────────────────────────┐  │
//! │  │                 ★ caja-core (THIS CRATE) ★                  │  │
//! │  │                                                             │  │
//! │  │  ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌──────────────────┐  │  │
//! │  │  │ catalog │ │  sale   │ │ register │ │ export / ticket  │  │  │
//! │  │  │ Product │ │ ledger  │ │ session  │ │ reconciliation   │  │  │
//! │  │  └─────────┘ └─────────┘ └──────────┘ └──────────────────┘  │  │
//! │  │                                                             │  │
//! │  │   NO I/O • NO DATABASE • NO PRINTING • PURE FUNCTIONS       │  │
//! │  └────────────────────────────┬────────────────────────────────┘  │
//! │                               │                                   │
//! │  ┌────────────────────────────▼────────────────────────────────┐  │
//! │  │              caja-store (persistence, CSV, lpr)             │  │
//! │  └─────────────────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Decimal [`Money`] type; rounding only at the display edge
//! - [`types`] - Shared domain types ([`Product`], [`VatRate`], [`TicketTemplate`])
//! - [`error`] - Typed domain errors
//! - [`catalog`] - Imported product catalog and lookups
//! - [`sale`] - The line-item ledger for one in-progress sale
//! - [`register`] - The open/close register session state machine
//! - [`export`] - Close-time export rows and reconciliation
//! - [`ticket`] - Pure text formatting of sale and closing tickets
//! - [`till`] - The single mutual-exclusion boundary hosts operate through
//! - [`validation`] - Shared input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: deterministic, no side effects
//! 2. **No I/O**: the store crate owns files, printers and everything else
//! 3. **Exact decimals**: all amounts are `rust_decimal` values; rounding to
//!    currency precision happens once, when an amount is rendered
//! 4. **Explicit errors**: every failure is a typed enum variant, never a panic
//!
//! ## Example Usage
//!
//! ```rust
//! use caja_core::till::Till;
//! use caja_core::catalog::ColumnMapping;
//! use rust_decimal::Decimal;
//!
//! let till = Till::new();
//! let rows = vec![vec![
//!     "REF1".to_string(),
//!     "Espresso cup".to_string(),
//!     "8412345678905".to_string(),
//!     "10.00".to_string(),
//! ]];
//! let report = till
//!     .import_products(&rows, &ColumnMapping::new(0, 1, 3).with_barcode(2))
//!     .unwrap();
//! assert_eq!(report.imported, 1);
//!
//! till.open_register().unwrap();
//! till.add_product_to_sale("REF1", Decimal::TWO, Default::default()).unwrap();
//! let outcome = till.charge_sale().unwrap();
//! assert!(outcome.ticket.contains("Espresso cup"));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod export;
pub mod money;
pub mod register;
pub mod sale;
pub mod ticket;
pub mod till;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use caja_core::Money` instead of
// `use caja_core::money::Money`.

pub use catalog::{Catalog, ColumnMapping, ImportReport};
pub use error::{ImportError, RegisterError, SaleError, TillError};
pub use export::{ExportBasis, ExportRow};
pub use money::Money;
pub use register::{Closeout, Register, RegisterStatus, Session};
pub use sale::{Discount, Sale, SaleLine, SaleStatus, Totals};
pub use till::Till;
pub use types::{Product, TicketTemplate, VatRate};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default VAT rate, in whole percent, applied when no template override
/// exists yet. 21% is the standard rate for general goods.
pub const DEFAULT_VAT_PERCENT: u32 = 21;

/// Default ticket header for a freshly configured till.
pub const DEFAULT_TICKET_HEADER: &str = "*** Point of Sale ***";

/// Default ticket footer for a freshly configured till.
pub const DEFAULT_TICKET_FOOTER: &str = "Thank you for your purchase!";
