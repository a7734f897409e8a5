//! # Error Types
//!
//! Typed domain errors for caja-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Error Types                             │
//! │                                                                 │
//! │  caja-core errors (this file)                                   │
//! │  ├── SaleError      - Sale ledger misuse (quantity, discount,   │
//! │  │                    stale index, charged-sale mutation)       │
//! │  ├── RegisterError  - Register state machine misuse             │
//! │  ├── ImportError    - Catalog import with an unusable mapping   │
//! │  │     └ RejectReason - per-row, non-fatal rejection reasons    │
//! │  └── TillError      - Till operations (lookup + both above)     │
//! │                                                                 │
//! │  caja-store errors (separate crate)                             │
//! │  └── StoreError     - Corrupt state, file and printer failures  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every error is recoverable by the caller; nothing here panics. The only
//! blocking error in the system is `StoreError::Corrupt` on state load,
//! which lives in the store crate.

use rust_decimal::Decimal;
use thiserror::Error;

// =============================================================================
// Sale Ledger Errors
// =============================================================================

/// Errors raised by operations on a sale's line ledger.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SaleError {
    /// Quantity must be strictly positive.
    #[error("quantity must be greater than zero, got {quantity}")]
    InvalidQuantity { quantity: Decimal },

    /// Discount out of range: a percentage beyond [0, 100], a negative
    /// amount, or an amount larger than the line subtotal.
    #[error("discount {value} out of range (maximum {max})")]
    InvalidDiscount { value: Decimal, max: Decimal },

    /// VAT rate outside [0, 100] percent.
    #[error("VAT rate must be between 0% and 100%, got {percent}%")]
    InvalidVatRate { percent: Decimal },

    /// A unit price override must not be negative.
    #[error("unit price must not be negative, got {price}")]
    InvalidPrice { price: Decimal },

    /// Stale line index.
    ///
    /// ## When This Occurs
    /// Indices are positions, recomputed on every read. After a removal the
    /// caller must re-resolve indices rather than reuse cached ones.
    #[error("line {index} not found (sale has {len} lines)")]
    LineNotFound { index: usize, len: usize },

    /// A sale with no lines cannot be charged.
    #[error("sale has no lines")]
    EmptySale,

    /// The sale was already charged; its lines are immutable.
    #[error("sale is charged and can no longer be modified")]
    SaleFinalized,
}

/// Convenience alias for sale ledger results.
pub type SaleResult<T> = Result<T, SaleError>;

// =============================================================================
// Register Session Errors
// =============================================================================

/// Errors raised by the register session state machine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegisterError {
    /// `open` while a session is already open.
    #[error("a register session is already open")]
    AlreadyOpen,

    /// `charge_sale`, `totals` or `close` without an open session.
    #[error("no register session is open")]
    RegisterNotOpen,

    /// Only charged sales enter the session history.
    #[error("sale must be charged before it is recorded")]
    SaleNotCharged,

    /// A sale ledger error surfaced through a register-level operation.
    #[error(transparent)]
    Sale(#[from] SaleError),
}

/// Convenience alias for register results.
pub type RegisterResult<T> = Result<T, RegisterError>;

// =============================================================================
// Catalog Import Errors
// =============================================================================

/// Fatal import failure: the column mapping itself is unusable.
///
/// Per-row problems never abort the batch; they are collected as
/// [`RejectReason`]s in the import report instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImportError {
    /// Two mapped fields point at the same CSV column.
    #[error("column {column} is mapped to more than one field")]
    DuplicateColumn { column: usize },
}

/// Why a single CSV row was rejected during import.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RejectReason {
    /// The row is shorter than the highest mapped column index.
    #[error("row has {width} cells, mapping needs column {needed}")]
    ShortRow { width: usize, needed: usize },

    /// The mapped reference cell is empty.
    #[error("reference cell is empty")]
    MissingReference,

    /// The mapped price cell does not parse as a non-negative number.
    #[error("price cell {value:?} is not a non-negative number")]
    InvalidPrice { value: String },

    /// A previous row in this batch already used the reference.
    #[error("duplicate reference {reference:?}")]
    DuplicateReference { reference: String },

    /// A previous row in this batch already used the barcode.
    #[error("duplicate barcode {barcode:?}")]
    DuplicateBarcode { barcode: String },
}

// =============================================================================
// Till Errors
// =============================================================================

/// Errors surfaced by the high-level till operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TillError {
    /// No catalog product matches the given reference or barcode.
    #[error("product not found: {0}")]
    ProductNotFound(String),

    #[error(transparent)]
    Sale(#[from] SaleError),

    #[error(transparent)]
    Register(#[from] RegisterError),
}

/// Convenience alias for till results.
pub type TillResult<T> = Result<T, TillError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sale_error_messages() {
        let err = SaleError::InvalidQuantity {
            quantity: dec!(-1),
        };
        assert_eq!(err.to_string(), "quantity must be greater than zero, got -1");

        let err = SaleError::LineNotFound { index: 3, len: 2 };
        assert_eq!(err.to_string(), "line 3 not found (sale has 2 lines)");
    }

    #[test]
    fn test_sale_error_converts_to_register_error() {
        let err: RegisterError = SaleError::EmptySale.into();
        assert_eq!(err, RegisterError::Sale(SaleError::EmptySale));
    }

    #[test]
    fn test_reject_reason_messages() {
        let reason = RejectReason::InvalidPrice {
            value: "free".to_string(),
        };
        assert_eq!(
            reason.to_string(),
            "price cell \"free\" is not a non-negative number"
        );
    }
}
