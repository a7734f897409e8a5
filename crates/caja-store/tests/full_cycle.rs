//! Full cycle through the store: CSV file → catalog → session → export
//! file and persisted state.

use std::fs;

use caja_core::catalog::ColumnMapping;
use caja_core::export::ExportBasis;
use caja_core::money::Money;
use caja_core::register::RegisterStatus;
use caja_core::sale::{Discount, LineOverrides};
use caja_core::till::Till;
use caja_core::types::VatRate;
use caja_store::{csv_io, PrintQueue, StateRecord, StateStore};
use rust_decimal_macros::dec;

#[test]
fn csv_to_export_and_back() {
    let dir = tempfile::tempdir().unwrap();

    // Supplier file with a Spanish-style comma-decimal price.
    let products_path = dir.path().join("products.csv");
    fs::write(
        &products_path,
        "referencia,descripcion,codigo,precio\n\
         REF1,Espresso cup,8412345678905,\"10,00\"\n\
         REF2,Decaf espresso beans,,5.00\n",
    )
    .unwrap();

    let file = csv_io::read_rows(&products_path).unwrap();
    assert_eq!(file.headers.len(), 4);

    let till = Till::new();
    let report = till
        .import_products(&file.rows, &ColumnMapping::new(0, 1, 3).with_barcode(2))
        .unwrap();
    assert_eq!(report.imported, 2);

    // One session: the worked scenario.
    till.open_register().unwrap();
    till.add_product_to_sale("REF1", dec!(2), LineOverrides::default())
        .unwrap();
    till.add_product_to_sale(
        "REF2",
        dec!(1),
        LineOverrides {
            discount: Some(Discount::Amount(Money::new(dec!(1)))),
            vat_rate: Some(VatRate::from_percent(dec!(10))),
            ..Default::default()
        },
    )
    .unwrap();
    let charge = till.charge_sale().unwrap();

    // The sale ticket goes through the spool-only print queue.
    let queue = PrintQueue::new(dir.path().join("tickets"));
    let outcome = queue.submit(&charge.ticket).unwrap();
    assert!(!outcome.printed);
    assert!(fs::read_to_string(&outcome.spooled_to)
        .unwrap()
        .contains("TOTAL: $28.60"));

    let close = till.close_register(ExportBasis::Gross).unwrap();
    queue.submit(&close.ticket).unwrap();

    // Export artifact.
    let export_path = dir.path().join("export.csv");
    csv_io::write_export(&export_path, &close.closeout.export_rows).unwrap();
    let export = fs::read_to_string(&export_path).unwrap();
    assert!(export.contains("REF1,Espresso cup,2,24.20"));
    assert!(export.contains("REF2,Decaf espresso beans,1,4.40"));

    // Persist and reload: catalog and template survive; the register is
    // closed again on the next run.
    let store = StateStore::new(dir.path().join("state.json"));
    store
        .save(&StateRecord::new(till.snapshot(), None))
        .unwrap();

    let record = store.load().unwrap().expect("state saved");
    let restored = Till::restore(record.till);
    assert_eq!(restored.products().len(), 2);
    assert_eq!(restored.register_status(), RegisterStatus::Closed);
    assert_eq!(
        restored.find("8412345678905")[0].unit_price,
        Money::new(dec!(10))
    );
}
