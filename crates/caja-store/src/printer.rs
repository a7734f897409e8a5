//! # Print Queue
//!
//! Fire-and-forget ticket submission: every ticket is spooled to a text
//! file, and forwarded to an `lpr` queue when a printer is configured.
//!
//! ## Submission Flow
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  ticket text                                                 │
//! │      │                                                       │
//! │      ▼                                                       │
//! │  spool_dir/ticket_<timestamp>.txt   (always written)         │
//! │      │                                                       │
//! │      ├── no printer configured ──► PrintOutcome{printed: no} │
//! │      │                                                       │
//! │      └── lpr -P <printer> ◄── ticket on stdin                │
//! │              │                                               │
//! │              ├── exit 0 ──► PrintOutcome{printed: yes}       │
//! │              └── exit ≠0 ─► PrintFailed (no retry here;      │
//! │                             the spool file remains)          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The outcome is reported once and never retried internally; retry
//! policy belongs to the host.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};

/// Lists the print queues `lpstat -p` reports. Best effort: a missing or
/// failing `lpstat` yields an empty list, never an error — discovery is
/// cosmetic, submission is what matters.
pub fn list_printers() -> Vec<String> {
    let output = match Command::new("lpstat").arg("-p").output() {
        Ok(output) if output.status.success() => output,
        _ => {
            debug!("lpstat unavailable, no printers listed");
            return Vec::new();
        }
    };

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter_map(|line| {
            line.strip_prefix("printer ")
                .and_then(|rest| rest.split_whitespace().next())
                .map(str::to_string)
        })
        .collect()
}

// =============================================================================
// Print Queue
// =============================================================================

/// Where a submitted ticket ended up.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintOutcome {
    /// The spool file that was written (always).
    pub spooled_to: PathBuf,
    /// Whether the ticket also reached a printer queue.
    pub printed: bool,
}

/// The ticket sink: a spool directory plus an optional `lpr` queue name.
#[derive(Debug, Clone)]
pub struct PrintQueue {
    spool_dir: PathBuf,
    printer: Option<String>,
}

impl PrintQueue {
    /// A spool-only queue (no printer configured yet).
    pub fn new(spool_dir: impl Into<PathBuf>) -> Self {
        PrintQueue {
            spool_dir: spool_dir.into(),
            printer: None,
        }
    }

    /// Configures the `lpr` queue name tickets are forwarded to.
    pub fn with_printer(mut self, printer: impl Into<String>) -> Self {
        self.printer = Some(printer.into());
        self
    }

    pub fn printer(&self) -> Option<&str> {
        self.printer.as_deref()
    }

    /// Spools the ticket, then forwards it to the configured printer.
    /// The spool file survives a printer failure, so nothing is lost when
    /// the queue is down.
    pub fn submit(&self, ticket: &str) -> StoreResult<PrintOutcome> {
        fs::create_dir_all(&self.spool_dir)?;
        let name = format!("ticket_{}.txt", Utc::now().format("%Y%m%d_%H%M%S_%f"));
        let path = self.spool_dir.join(name);
        fs::write(&path, ticket)?;

        let printed = match &self.printer {
            None => {
                info!(path = %path.display(), "no printer configured, ticket spooled only");
                false
            }
            Some(printer) => {
                submit_to_lpr(printer, ticket)?;
                info!(printer = %printer, "ticket submitted");
                true
            }
        };

        Ok(PrintOutcome {
            spooled_to: path,
            printed,
        })
    }
}

/// Pipes the ticket into `lpr -P <printer>`.
fn submit_to_lpr(printer: &str, ticket: &str) -> StoreResult<()> {
    let mut child = Command::new("lpr")
        .arg("-P")
        .arg(printer)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(ticket.as_bytes())?;
        // Dropping stdin closes the pipe so lpr sees EOF.
    }

    let output = child.wait_with_output()?;
    if !output.status.success() {
        return Err(StoreError::PrintFailed {
            printer: printer.to_string(),
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    if !output.stderr.is_empty() {
        warn!(
            printer = %printer,
            response = %String::from_utf8_lossy(&output.stderr).trim(),
            "printer accepted the ticket with a warning"
        );
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
