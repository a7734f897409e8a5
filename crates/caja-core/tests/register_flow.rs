//! End-to-end register flow: import, open, sell, charge, close, export.

use caja_core::catalog::ColumnMapping;
use caja_core::error::{RegisterError, SaleError, TillError};
use caja_core::export::ExportBasis;
use caja_core::money::Money;
use caja_core::register::RegisterStatus;
use caja_core::sale::{Discount, LineEdit, LineOverrides};
use caja_core::till::Till;
use caja_core::types::VatRate;
use rust_decimal_macros::dec;

fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
    data.iter()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect()
}

fn seeded_till() -> Till {
    let till = Till::new();
    let report = till
        .import_products(
            &rows(&[
                &["REF1", "Espresso cup", "8412345678905", "10.00"],
                &["REF2", "Decaf espresso beans", "", "5.00"],
            ]),
            &ColumnMapping::new(0, 1, 3).with_barcode(2),
        )
        .unwrap();
    assert_eq!(report.imported, 2);
    assert!(report.rejected.is_empty());
    till
}

#[test]
fn full_day_at_the_till() {
    let till = seeded_till();

    till.open_register().unwrap();
    assert_eq!(till.register_status(), RegisterStatus::Open);

    // 2 × REF1 at the default 21% rate.
    till.add_product_to_sale("REF1", dec!(2), LineOverrides::default())
        .unwrap();
    // 1 × REF2 with $1 off at 10%.
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

    // (2×10)×1.21 + (5−1)×1.10 = 24.20 + 4.40
    let totals = till.sale_totals().unwrap();
    assert_eq!(totals.grand_total, Money::new(dec!(28.60)));

    let charge = till.charge_sale().unwrap();
    assert_eq!(charge.totals.grand_total, Money::new(dec!(28.60)));
    assert!(charge.ticket.contains("TOTAL: $28.60"));

    // Session totals match the single charged sale.
    assert_eq!(
        till.session_totals().unwrap().grand_total,
        Money::new(dec!(28.60))
    );

    let close = till.close_register(ExportBasis::Gross).unwrap();
    assert_eq!(till.register_status(), RegisterStatus::Closed);

    let export = &close.closeout.export_rows;
    assert_eq!(export.len(), 2);
    assert_eq!(export[0].reference, "REF1");
    assert_eq!(export[0].units_sold, dec!(2));
    assert_eq!(export[0].amount_sold, Money::new(dec!(24.20)));
    assert_eq!(export[1].reference, "REF2");
    assert_eq!(export[1].units_sold, dec!(1));
    assert_eq!(export[1].amount_sold, Money::new(dec!(4.40)));

    assert!(close.ticket.contains("Taxable base: $24.00"));
    assert!(close.ticket.contains("Cash total: $28.60"));

    // Closed means closed.
    assert_eq!(
        till.session_totals().unwrap_err(),
        RegisterError::RegisterNotOpen
    );
}

#[test]
fn stale_indices_resolve_against_current_lines() {
    let till = seeded_till();
    till.open_register().unwrap();
    till.add_product_to_sale("REF1", dec!(1), LineOverrides::default())
        .unwrap();
    till.add_product_to_sale("REF2", dec!(1), LineOverrides::default())
        .unwrap();

    // Beyond the current line count.
    let err = till.edit_line(2, LineEdit::default()).unwrap_err();
    assert_eq!(
        err,
        TillError::Sale(SaleError::LineNotFound { index: 2, len: 2 })
    );

    // After removing index 0, index 0 addresses the formerly second line.
    till.remove_line(0).unwrap();
    till.edit_line(
        0,
        LineEdit {
            quantity: Some(dec!(3)),
            ..Default::default()
        },
    )
    .unwrap();
    let sale = till.current_sale().unwrap();
    assert_eq!(sale.lines()[0].reference, "REF2");
    assert_eq!(sale.lines()[0].quantity, dec!(3));
}

#[test]
fn reimport_is_atomic_for_lookups() {
    let till = seeded_till();

    // Replace the catalog; a lookup afterwards sees only the new products,
    // never a mix of old and new.
    till.import_products(
        &rows(&[&["NEW1", "Espresso cup v2", "", "11.00"]]),
        &ColumnMapping::new(0, 1, 3).with_barcode(2),
    )
    .unwrap();

    let found = till.find("espresso");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].reference, "NEW1");
    assert!(till.find("REF1").is_empty());
}

#[test]
fn second_session_starts_empty() {
    let till = seeded_till();
    till.open_register().unwrap();
    till.add_product_to_sale("REF1", dec!(1), LineOverrides::default())
        .unwrap();
    till.charge_sale().unwrap();
    till.close_register(ExportBasis::Gross).unwrap();

    till.open_register().unwrap();
    let totals = till.session_totals().unwrap();
    assert_eq!(totals.grand_total, Money::zero());

    let close = till.close_register(ExportBasis::Gross).unwrap();
    assert!(close.closeout.export_rows.is_empty());
    assert_eq!(close.closeout.sale_count, 0);
}
