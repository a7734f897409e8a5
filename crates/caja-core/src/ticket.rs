//! # Ticket Formatter
//!
//! Pure text layout for sale tickets and the closing ticket. No I/O here:
//! callers decide whether the text goes to a spool file, a printer, or a
//! screen. Formatting is the single place amounts are rounded.
//!
//! A sale ticket:
//!
//! ```text
//! *** Point of Sale ***
//! 06/08/2026 12:30
//!
//! REF1 x2 @ $10.00 = $24.20
//!   Espresso cup
//! REF2 x1 @ $5.00 (-$1.00) = $4.40
//!   Decaf espresso beans
//!
//! VAT 10%: $0.40 on $4.00
//! VAT 21%: $4.20 on $20.00
//! TOTAL: $28.60
//!
//! Thank you for your purchase!
//! ```

use chrono::{DateTime, Utc};

use crate::register::Closeout;
use crate::sale::Sale;
use crate::types::TicketTemplate;

/// Timestamp layout used on every ticket.
const TICKET_TIME_FORMAT: &str = "%d/%m/%Y %H:%M";

// =============================================================================
// Sale Ticket
// =============================================================================

/// Renders one sale as printable ticket text: header, timestamp, one block
/// per line (with the discount shown only when nonzero), the VAT breakdown
/// per distinct rate, the grand total, and the footer.
pub fn format_sale_ticket(
    sale: &Sale,
    template: &TicketTemplate,
    printed_at: DateTime<Utc>,
) -> String {
    let mut out: Vec<String> = Vec::new();
    out.push(template.header.clone());
    out.push(printed_at.format(TICKET_TIME_FORMAT).to_string());
    out.push(String::new());

    for line in sale.lines() {
        let discount = if line.discount.is_zero() {
            String::new()
        } else {
            format!(" (-{})", line.discount)
        };
        out.push(format!(
            "{} x{} @ {}{} = {}",
            line.reference,
            line.quantity.normalize(),
            line.unit_price,
            discount,
            line.total(),
        ));
        out.push(format!("  {}", line.description));
    }
    out.push(String::new());

    let totals = sale.totals();
    for (rate, rate_totals) in &totals.tax_by_rate {
        out.push(format!(
            "VAT {}: {} on {}",
            rate, rate_totals.tax, rate_totals.net
        ));
    }
    out.push(format!("TOTAL: {}", totals.grand_total));

    if !template.footer.is_empty() {
        out.push(String::new());
        out.push(template.footer.clone());
    }

    out.join("\n")
}

// =============================================================================
// Closing Ticket
// =============================================================================

/// Renders the register-closing summary: per-reference unit counts, the
/// taxable base, the VAT accumulated per rate, and the cash total.
pub fn format_closing_ticket(closeout: &Closeout, template: &TicketTemplate) -> String {
    let mut out: Vec<String> = Vec::new();
    out.push(template.header.clone());
    out.push("Register closing".to_string());
    out.push(closeout.closed_at.format(TICKET_TIME_FORMAT).to_string());
    out.push(String::new());

    for row in &closeout.export_rows {
        out.push(format!(
            "{}: {} units",
            row.reference,
            row.units_sold.normalize()
        ));
    }
    out.push(String::new());

    out.push(format!("Taxable base: {}", closeout.totals.taxable_base));
    for (rate, rate_totals) in &closeout.totals.tax_by_rate {
        out.push(format!("VAT {}: {}", rate, rate_totals.tax));
    }
    out.push(format!("Cash total: {}", closeout.totals.grand_total));

    if !template.footer.is_empty() {
        out.push(String::new());
        out.push(template.footer.clone());
    }

    out.join("\n")
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportBasis;
    use crate::money::Money;
    use crate::register::Register;
    use crate::sale::{Discount, LineOverrides};
    use crate::types::{Product, VatRate};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn scenario_sale() -> Sale {
        let mut sale = Sale::new(VatRate::from_percent(dec!(21)));
        sale.add_product(
            &Product::new("REF1", "Espresso cup", Money::new(dec!(10))),
            dec!(2),
            LineOverrides::default(),
        )
        .unwrap();
        sale.add_product(
            &Product::new("REF2", "Decaf espresso beans", Money::new(dec!(5))),
            dec!(1),
            LineOverrides {
                discount: Some(Discount::Amount(Money::new(dec!(1)))),
                vat_rate: Some(VatRate::from_percent(dec!(10))),
                ..Default::default()
            },
        )
        .unwrap();
        sale
    }

    #[test]
    fn test_sale_ticket_layout() {
        let sale = scenario_sale();
        let printed_at = Utc.with_ymd_and_hms(2026, 8, 6, 12, 30, 0).unwrap();
        let ticket = format_sale_ticket(&sale, &TicketTemplate::default(), printed_at);

        let expected = "\
*** Point of Sale ***
06/08/2026 12:30

REF1 x2 @ $10.00 = $24.20
  Espresso cup
REF2 x1 @ $5.00 (-$1.00) = $4.40
  Decaf espresso beans

VAT 10%: $0.40 on $4.00
VAT 21%: $4.20 on $20.00
TOTAL: $28.60

Thank you for your purchase!";
        assert_eq!(ticket, expected);
    }

    #[test]
    fn test_discount_hidden_when_zero() {
        let mut sale = Sale::new(VatRate::from_percent(dec!(21)));
        sale.add_product(
            &Product::new("REF1", "Espresso cup", Money::new(dec!(10))),
            dec!(1),
            LineOverrides::default(),
        )
        .unwrap();

        let ticket = format_sale_ticket(&sale, &TicketTemplate::default(), Utc::now());
        assert!(!ticket.contains("(-"));
    }

    #[test]
    fn test_percent_discount_rendering() {
        let mut sale = Sale::new(VatRate::from_percent(dec!(21)));
        sale.add_product(
            &Product::new("REF1", "Espresso cup", Money::new(dec!(10))),
            dec!(1),
            LineOverrides {
                discount: Some(Discount::Percent(dec!(5))),
                ..Default::default()
            },
        )
        .unwrap();

        let ticket = format_sale_ticket(&sale, &TicketTemplate::default(), Utc::now());
        assert!(ticket.contains("(-5%)"));
    }

    #[test]
    fn test_empty_footer_is_omitted() {
        let template = TicketTemplate {
            footer: String::new(),
            ..TicketTemplate::default()
        };
        let ticket = format_sale_ticket(&scenario_sale(), &template, Utc::now());
        assert!(!ticket.ends_with('\n'));
        assert!(ticket.ends_with("TOTAL: $28.60"));
    }

    #[test]
    fn test_closing_ticket_figures() {
        let mut register = Register::new();
        register.open(TicketTemplate::default()).unwrap();
        let mut sale = scenario_sale();
        sale.charge().unwrap();
        register.charge_sale(sale).unwrap();
        let closeout = register.close(ExportBasis::Gross).unwrap();

        let ticket = format_closing_ticket(&closeout, &TicketTemplate::default());
        assert!(ticket.contains("Register closing"));
        assert!(ticket.contains("REF1: 2 units"));
        assert!(ticket.contains("REF2: 1 units"));
        assert!(ticket.contains("Taxable base: $24.00"));
        assert!(ticket.contains("VAT 21%: $4.20"));
        assert!(ticket.contains("VAT 10%: $0.40"));
        assert!(ticket.contains("Cash total: $28.60"));
        assert!(ticket.ends_with("Thank you for your purchase!"));
    }
}
