//! # Store Error Types
//!
//! Errors for the persistence and peripheral layer.
//!
//! [`StoreError::Corrupt`] is the one blocking error in the system: a state
//! file that fails a domain invariant must not become a running till. Every
//! other variant is an ordinary, recoverable I/O failure.

use std::path::PathBuf;

use thiserror::Error;

/// Persistence, CSV and printing failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The state file exists but violates a domain invariant (duplicate
    /// references, negative prices, a non-charged sale in the session
    /// history, ...). Never silently repaired.
    #[error("corrupt state: {reason}")]
    Corrupt { reason: String },

    /// File system failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing or writing failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The state record could not be encoded for saving.
    #[error("could not encode state record: {0}")]
    Encode(#[from] serde_json::Error),

    /// The product import file has no rows at all.
    #[error("import file {} is empty", .path.display())]
    EmptyImportFile { path: PathBuf },

    /// `lpr` accepted the process but reported a failure.
    #[error("printer {printer} rejected the ticket: {detail}")]
    PrintFailed { printer: String, detail: String },
}

/// Convenience alias for store results.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_message() {
        let err = StoreError::Corrupt {
            reason: "duplicate reference \"REF1\"".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "corrupt state: duplicate reference \"REF1\""
        );
    }
}
