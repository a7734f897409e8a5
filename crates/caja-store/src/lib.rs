//! # caja-store: Persistence and Peripherals for Caja
//!
//! Everything the domain engine treats as an external collaborator lives
//! here: the JSON state record, the CSV plumbing around import/export, and
//! the spool-then-`lpr` print queue.
//!
//! ## Architecture Position
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                       Caja Data Flow                          │
//! │                                                               │
//! │  caja-core  (Till, Catalog, Register — pure, validated)       │
//! │       ▲                    │                                  │
//! │       │ TillSnapshot       │ tickets, export rows             │
//! │       │                    ▼                                  │
//! │  ┌─────────────────────────────────────────────────────────┐  │
//! │  │                 caja-store (THIS CRATE)                 │  │
//! │  │                                                         │  │
//! │  │  ┌────────────┐   ┌──────────────┐   ┌──────────────┐   │  │
//! │  │  │   state    │   │   csv_io     │   │   printer    │   │  │
//! │  │  │ JSON state │   │ import rows, │   │ spool files, │   │  │
//! │  │  │ record +   │   │ export file  │   │ lpr submit   │   │  │
//! │  │  │ validation │   │              │   │              │   │  │
//! │  │  └────────────┘   └──────────────┘   └──────────────┘   │  │
//! │  └─────────────────────────────────────────────────────────┘  │
//! │       │                    │                   │              │
//! │       ▼                    ▼                   ▼              │
//! │   state.json        products.csv / export   lpr -P <name>    │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Loading never repairs: a state file that violates a domain invariant
//! fails with [`StoreError::Corrupt`] and the till is not built from it.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod csv_io;
pub mod error;
pub mod printer;
pub mod state;

// =============================================================================
// Re-exports
// =============================================================================

pub use csv_io::CsvFile;
pub use error::StoreError;
pub use printer::{list_printers, PrintOutcome, PrintQueue};
pub use state::{StateRecord, StateStore};
