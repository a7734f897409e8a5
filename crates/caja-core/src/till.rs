//! # Till
//!
//! The single mutual-exclusion boundary hosts operate through.
//!
//! ## Thread Safety
//! The whole till state lives behind one `Mutex` because:
//! 1. The open/charge/close transition sequence must be atomic: no
//!    interleaving may ever observe two open sessions
//! 2. A catalog re-import must never be visible half-done to a lookup
//! 3. All operations are in-memory and complete in microseconds, so one
//!    lock around everything costs nothing measurable
//!
//! ## Operations Flow
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                        Till Operations                             │
//! │                                                                    │
//! │  Host Action              Till Method             State Change     │
//! │  ───────────              ───────────             ────────────     │
//! │  Import CSV ────────────► import_products() ────► catalog swap     │
//! │  Type in search box ────► find() ───────────────► (read only)      │
//! │  Open the register ─────► open_register() ──────► fresh session    │
//! │  Scan a product ────────► add_product_to_sale()─► line appended    │
//! │  Fix a line ────────────► edit_line() ──────────► line replaced    │
//! │  Charge ────────────────► charge_sale() ────────► sale → session   │
//! │  Close the register ────► close_register() ─────► closeout + text  │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The till is an explicit owned object: hosts receive it by reference,
//! there is no ambient global instance.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{Catalog, ColumnMapping, ImportReport};
use crate::error::{ImportError, RegisterError, SaleError, TillError, TillResult};
use crate::export::ExportBasis;
use crate::register::{Closeout, Register, RegisterStatus, Session};
use crate::sale::{LineEdit, LineOverrides, Sale, SaleLine, Totals};
use crate::ticket;
use crate::types::{Product, TicketTemplate, VatRate};

// =============================================================================
// Outcomes
// =============================================================================

/// What a successful charge hands back to the host: the finalized sale's
/// identity, its totals, and the ticket text ready for the print queue.
#[derive(Debug, Clone)]
pub struct ChargeOutcome {
    pub sale_id: Uuid,
    pub totals: Totals,
    pub ticket: String,
}

/// What closing the register hands back: the derived figures and export
/// rows, plus the closing-ticket text.
#[derive(Debug, Clone)]
pub struct CloseOutcome {
    pub closeout: Closeout,
    pub ticket: String,
}

// =============================================================================
// Snapshot
// =============================================================================

/// The persistable view of a till: catalog products, template, and the
/// open session if one exists. The store crate serializes this record and
/// validates it on the way back in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TillSnapshot {
    pub products: Vec<Product>,
    pub template: TicketTemplate,
    pub session: Option<Session>,
}

// =============================================================================
// Till
// =============================================================================

#[derive(Debug, Default)]
struct TillInner {
    catalog: Catalog,
    template: TicketTemplate,
    register: Register,
    current_sale: Option<Sale>,
}

/// The till: catalog, template, register and the in-progress sale behind
/// one lock.
#[derive(Debug, Default)]
pub struct Till {
    inner: Mutex<TillInner>,
}

impl Till {
    /// A fresh till: empty catalog, default template, closed register.
    pub fn new() -> Self {
        Till::default()
    }

    /// Rebuilds a till from a persisted snapshot. The snapshot must have
    /// been validated (the store crate's load does); restore itself trusts
    /// its input.
    pub fn restore(snapshot: TillSnapshot) -> Self {
        Till {
            inner: Mutex::new(TillInner {
                catalog: Catalog::from_products(snapshot.products),
                template: snapshot.template,
                register: snapshot.session.map(Register::resume).unwrap_or_default(),
                current_sale: None,
            }),
        }
    }

    /// The persistable view of the current state. An in-progress
    /// (uncharged) sale is deliberately not part of it: only charged
    /// history survives a restart.
    pub fn snapshot(&self) -> TillSnapshot {
        let inner = self.lock();
        TillSnapshot {
            products: inner.catalog.all().to_vec(),
            template: inner.template.clone(),
            session: inner.register.session().cloned(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TillInner> {
        self.inner.lock().expect("till mutex poisoned")
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Imports products from raw CSV rows, replacing the catalog
    /// atomically with respect to concurrent `find` calls.
    pub fn import_products(
        &self,
        rows: &[Vec<String>],
        mapping: &ColumnMapping,
    ) -> Result<ImportReport, ImportError> {
        self.lock().catalog.import(rows, mapping)
    }

    /// Catalog search; see [`Catalog::find`] for the match tiers.
    pub fn find(&self, query: &str) -> Vec<Product> {
        self.lock().catalog.find(query).into_iter().cloned().collect()
    }

    /// All catalog products in import order.
    pub fn products(&self) -> Vec<Product> {
        self.lock().catalog.all().to_vec()
    }

    // =========================================================================
    // Template
    // =========================================================================

    pub fn template(&self) -> TicketTemplate {
        self.lock().template.clone()
    }

    /// Replaces the till-wide template. An already-open session keeps the
    /// snapshot it was opened with.
    pub fn set_template(&self, template: TicketTemplate) {
        self.lock().template = template;
    }

    // =========================================================================
    // Register
    // =========================================================================

    pub fn register_status(&self) -> RegisterStatus {
        self.lock().register.status()
    }

    /// Opens a session, snapshotting the current template.
    pub fn open_register(&self) -> Result<Uuid, RegisterError> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        let template = inner.template.clone();
        inner.register.open(template)
    }

    /// Running totals of the open session.
    pub fn session_totals(&self) -> Result<Totals, RegisterError> {
        self.lock().register.totals()
    }

    /// Closes the session: derives the export rows and closing figures,
    /// formats the closing ticket, and leaves the register closed. An
    /// in-progress uncharged sale survives the close untouched.
    pub fn close_register(&self, basis: ExportBasis) -> Result<CloseOutcome, RegisterError> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        let template = inner
            .register
            .session()
            .map(|s| s.template().clone())
            .unwrap_or_else(|| inner.template.clone());
        let closeout = inner.register.close(basis)?;
        let ticket = ticket::format_closing_ticket(&closeout, &template);
        Ok(CloseOutcome { closeout, ticket })
    }

    // =========================================================================
    // Current Sale
    // =========================================================================

    /// The in-progress sale, if one exists.
    pub fn current_sale(&self) -> Option<Sale> {
        self.lock().current_sale.clone()
    }

    /// Fresh totals of the in-progress sale.
    pub fn sale_totals(&self) -> Option<Totals> {
        self.lock().current_sale.as_ref().map(Sale::totals)
    }

    /// Adds a product to the in-progress sale (starting one if needed),
    /// looked up by reference or barcode. New sales default their VAT rate
    /// from the open session's template snapshot, falling back to the
    /// till-wide template when the register is closed.
    pub fn add_product_to_sale(
        &self,
        code: &str,
        quantity: Decimal,
        overrides: LineOverrides,
    ) -> TillResult<usize> {
        let mut guard = self.lock();
        let inner = &mut *guard;

        let product = inner
            .catalog
            .lookup_code(code)
            .cloned()
            .ok_or_else(|| TillError::ProductNotFound(code.to_string()))?;
        let default_vat = inner.default_vat_rate();
        let sale = inner
            .current_sale
            .get_or_insert_with(|| Sale::new(default_vat));
        Ok(sale.add_product(&product, quantity, overrides)?)
    }

    /// Edits a line of the in-progress sale.
    pub fn edit_line(&self, index: usize, edit: LineEdit) -> TillResult<()> {
        let mut guard = self.lock();
        match guard.current_sale.as_mut() {
            Some(sale) => Ok(sale.edit_line(index, edit)?),
            None => Err(SaleError::LineNotFound { index, len: 0 }.into()),
        }
    }

    /// Removes a line of the in-progress sale.
    pub fn remove_line(&self, index: usize) -> TillResult<SaleLine> {
        let mut guard = self.lock();
        match guard.current_sale.as_mut() {
            Some(sale) => Ok(sale.remove_line(index)?),
            None => Err(SaleError::LineNotFound { index, len: 0 }.into()),
        }
    }

    /// Discards the in-progress sale without charging it. Returns whether
    /// there was one to discard.
    pub fn void_sale(&self) -> bool {
        self.lock().current_sale.take().is_some()
    }

    /// Charges the in-progress sale and records it in the open session.
    ///
    /// The register is checked first: with the register closed the sale
    /// stays open and intact, so the cashier can open the register and
    /// charge again without re-entering lines.
    pub fn charge_sale(&self) -> TillResult<ChargeOutcome> {
        let mut guard = self.lock();
        let inner = &mut *guard;

        if !inner.register.is_open() {
            return Err(RegisterError::RegisterNotOpen.into());
        }
        let mut sale = inner
            .current_sale
            .take()
            .ok_or(TillError::Sale(SaleError::EmptySale))?;
        if let Err(err) = sale.charge() {
            // Failed charges (e.g. an empty ledger) keep the sale current.
            inner.current_sale = Some(sale);
            return Err(err.into());
        }

        let sale_id = sale.id();
        let totals = sale.totals();
        let template = inner
            .register
            .session()
            .map(|s| s.template().clone())
            .unwrap_or_else(|| inner.template.clone());
        let ticket = ticket::format_sale_ticket(&sale, &template, Utc::now());
        inner.register.charge_sale(sale)?;

        Ok(ChargeOutcome {
            sale_id,
            totals,
            ticket,
        })
    }
}

impl TillInner {
    fn default_vat_rate(&self) -> VatRate {
        self.register
            .session()
            .map(|s| s.template().default_vat_rate)
            .unwrap_or(self.template.default_vat_rate)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
