//! # CSV Plumbing
//!
//! Reads the product import file into the raw rows the catalog projects
//! through its column mapping, and writes the close-time export artifact.
//!
//! The domain never sees a file: the catalog receives `Vec<Vec<String>>`
//! and the export writer receives already-derived [`ExportRow`]s. Cell
//! interpretation (field mapping, price parsing) stays in caja-core.

use std::path::Path;

use tracing::{debug, info};

use caja_core::export::ExportRow;

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Import Side
// =============================================================================

/// A CSV file split into its header row and data rows.
///
/// The header drives the host's column-mapping choice (it shows the user
/// what each column is called); the data rows go to the catalog import.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvFile {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Reads a CSV file as raw string cells, tolerating ragged row widths
/// (short rows are the catalog's per-row problem, not a file error).
/// An entirely empty file is an error.
pub fn read_rows(path: &Path) -> StoreResult<CsvFile> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut records: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        records.push(record.iter().map(str::to_string).collect());
    }

    let mut iter = records.into_iter();
    let headers = iter.next().ok_or_else(|| StoreError::EmptyImportFile {
        path: path.to_path_buf(),
    })?;
    let rows: Vec<Vec<String>> = iter.collect();

    debug!(
        path = %path.display(),
        columns = headers.len(),
        rows = rows.len(),
        "import file read"
    );
    Ok(CsvFile { headers, rows })
}

// =============================================================================
// Export Side
// =============================================================================

/// Writes the session export: one row per reference with units and amount
/// sold. Amounts are rounded here, at the artifact edge, and nowhere
/// earlier.
pub fn write_export(path: &Path, rows: &[ExportRow]) -> StoreResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["reference", "description", "units_sold", "amount_sold"])?;

    for row in rows {
        let units = row.units_sold.normalize().to_string();
        let amount = row.amount_sold.rounded().to_string();
        writer.write_record([
            row.reference.as_str(),
            row.description.as_str(),
            units.as_str(),
            amount.as_str(),
        ])?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = rows.len(), "session export written");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use caja_core::money::Money;
    use rust_decimal_macros::dec;
    use std::fs;

    #[test]
    fn test_read_rows_splits_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.csv");
        fs::write(
            &path,
            "referencia,descripcion,codigo,precio\nREF1,Espresso cup,8412345678905,\"10,00\"\nREF2,Beans,,5.00\n",
        )
        .unwrap();

        let file = read_rows(&path).unwrap();
        assert_eq!(
            file.headers,
            vec!["referencia", "descripcion", "codigo", "precio"]
        );
        assert_eq!(file.rows.len(), 2);
        assert_eq!(file.rows[0][0], "REF1");
        // Quoted comma-decimal prices come through as one cell.
        assert_eq!(file.rows[0][3], "10,00");
    }

    #[test]
    fn test_read_rows_tolerates_ragged_widths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ragged.csv");
        fs::write(&path, "a,b,c,d\nREF1,only-two\n").unwrap();

        let file = read_rows(&path).unwrap();
        assert_eq!(file.rows[0], vec!["REF1", "only-two"]);
    }

    #[test]
    fn test_read_rows_empty_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "").unwrap();

        let err = read_rows(&path).unwrap_err();
        assert!(matches!(err, StoreError::EmptyImportFile { .. }));
    }

    #[test]
    fn test_write_export_rounds_amounts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        write_export(
            &path,
            &[
                ExportRow {
                    reference: "REF1".to_string(),
                    description: "Espresso cup".to_string(),
                    units_sold: dec!(2),
                    amount_sold: Money::new(dec!(24.2)),
                },
                ExportRow {
                    reference: "REF2".to_string(),
                    description: "Beans".to_string(),
                    units_sold: dec!(1.5),
                    amount_sold: Money::new(dec!(4.125)),
                },
            ],
        )
        .unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next().unwrap(),
            "reference,description,units_sold,amount_sold"
        );
        assert_eq!(lines.next().unwrap(), "REF1,Espresso cup,2,24.20");
        assert_eq!(lines.next().unwrap(), "REF2,Beans,1.5,4.12");
    }
}
