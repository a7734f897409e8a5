//! # Register Session
//!
//! The state machine owning zero-or-one open cash register session.
//!
//! ## State Machine
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                    Register Transitions                          │
//! │                                                                  │
//! │            open(template)                                        │
//! │   CLOSED ────────────────────► OPEN ──┐                          │
//! │     ▲    (AlreadyOpen if open)        │ charge_sale(sale)        │
//! │     │                                 │ (appends CHARGED sales   │
//! │     │         close(basis)            │  to the session history) │
//! │     └───────────────────────── OPEN ◄─┘                          │
//! │       builds export rows +                                       │
//! │       closing figures; terminal                                  │
//! │       for that session id                                        │
//! │                                                                  │
//! │   charge_sale / totals / close while CLOSED → RegisterNotOpen    │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A close destroys the session instance; the next open creates a fresh
//! session id with an empty history and a new template snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RegisterError, RegisterResult};
use crate::export::{build_export_rows, ExportBasis, ExportRow};
use crate::sale::{Sale, Totals};
use crate::types::TicketTemplate;

// =============================================================================
// Register Status
// =============================================================================

/// Whether a session is currently open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegisterStatus {
    #[default]
    Closed,
    Open,
}

// =============================================================================
// Session
// =============================================================================

/// One bounded register session: everything charged between an open and
/// the matching close. Holds only CHARGED sales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    id: Uuid,
    opened_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    template: TicketTemplate,
    charged: Vec<Sale>,
}

impl Session {
    fn new(template: TicketTemplate) -> Self {
        Session {
            id: Uuid::new_v4(),
            opened_at: Utc::now(),
            closed_at: None,
            template,
            charged: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.closed_at
    }

    /// The ticket template snapshotted when this session opened.
    pub fn template(&self) -> &TicketTemplate {
        &self.template
    }

    /// Charged sales in charge order.
    pub fn sales(&self) -> &[Sale] {
        &self.charged
    }

    pub fn sale_count(&self) -> usize {
        self.charged.len()
    }

    /// Session-wide totals across every charged sale, using the same
    /// sum-then-aggregate discipline as a single sale: all lines of the
    /// session are grouped by rate and each rate is multiplied once.
    pub fn totals(&self) -> Totals {
        Totals::from_lines(self.charged.iter().flat_map(|sale| sale.lines()))
    }

    fn record(&mut self, sale: Sale) -> RegisterResult<()> {
        if !sale.is_charged() {
            return Err(RegisterError::SaleNotCharged);
        }
        self.charged.push(sale);
        Ok(())
    }
}

// =============================================================================
// Closeout
// =============================================================================

/// Everything a register close produces: the closing-ticket figures and
/// the export rows, derived once from the session history.
#[derive(Debug, Clone, PartialEq)]
pub struct Closeout {
    pub session_id: Uuid,
    pub opened_at: DateTime<Utc>,
    pub closed_at: DateTime<Utc>,
    pub sale_count: usize,
    /// Closing figures: taxable base, VAT accumulated per rate, cash total.
    pub totals: Totals,
    pub export_rows: Vec<ExportRow>,
}

// =============================================================================
// Register
// =============================================================================

/// The register: an explicit owned object, obtained via context passing,
/// never an ambient singleton. At most one session is open at a time; the
/// surrounding [`crate::till::Till`] serializes access so the invariant
/// holds even under concurrent hosts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Register {
    session: Option<Session>,
}

impl Register {
    /// A closed register.
    pub fn new() -> Self {
        Register::default()
    }

    /// Rebuilds a register around a previously persisted open session.
    /// The store crate validates the session before handing it over.
    pub fn resume(session: Session) -> Self {
        Register {
            session: Some(session),
        }
    }

    pub fn status(&self) -> RegisterStatus {
        if self.session.is_some() {
            RegisterStatus::Open
        } else {
            RegisterStatus::Closed
        }
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// The open session, if any.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// CLOSED → OPEN. Creates a fresh session with an empty history,
    /// snapshotting the given template. Fails with `AlreadyOpen` if a
    /// session is already open.
    pub fn open(&mut self, template: TicketTemplate) -> RegisterResult<Uuid> {
        if self.session.is_some() {
            return Err(RegisterError::AlreadyOpen);
        }
        let session = Session::new(template);
        let id = session.id;
        self.session = Some(session);
        Ok(id)
    }

    /// Appends a charged sale to the open session's history.
    pub fn charge_sale(&mut self, sale: Sale) -> RegisterResult<()> {
        self.session
            .as_mut()
            .ok_or(RegisterError::RegisterNotOpen)?
            .record(sale)
    }

    /// Running totals for the open session.
    pub fn totals(&self) -> RegisterResult<Totals> {
        Ok(self
            .session
            .as_ref()
            .ok_or(RegisterError::RegisterNotOpen)?
            .totals())
    }

    /// OPEN → CLOSED. Derives the export rows and closing figures, then
    /// destroys the session instance; a later `open` starts a new id.
    pub fn close(&mut self, basis: ExportBasis) -> RegisterResult<Closeout> {
        let mut session = self.session.take().ok_or(RegisterError::RegisterNotOpen)?;
        let closed_at = Utc::now();
        session.closed_at = Some(closed_at);

        Ok(Closeout {
            session_id: session.id,
            opened_at: session.opened_at,
            closed_at,
            sale_count: session.charged.len(),
            totals: session.totals(),
            export_rows: build_export_rows(&session.charged, basis),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
