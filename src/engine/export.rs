use std::io::Write;

use chrono::NaiveDate;

use crate::config::bills::{CompanyBill, VendorBill};
use crate::error::Result;

use super::group::{GroupedVendorBill, Grouping};

/// Column order of the export. Rows are written field-for-field against
/// this header.
pub const EXPORT_HEADER: [&str; 10] = [
    "Bill #",
    "Type",
    "Supplier",
    "PO Reference",
    "Date",
    "Amount",
    "Paid",
    "Balance",
    "Status",
    "Parent Bill",
];

/// Parent marker for orphaned company bills.
pub const NO_PARENT: &str = "(No Vendor Bill)";

/// Placeholder for columns that do not apply to a row.
const NOT_APPLICABLE: &str = "-";

/// One export line, already formatted. Amounts carry two decimals and
/// dates are ISO so spreadsheets sort them correctly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub number: String,
    pub kind: String,
    pub supplier: String,
    pub po_reference: String,
    pub date: String,
    pub amount: String,
    pub paid: String,
    pub balance: String,
    pub status: String,
    pub parent: String,
}

fn vendor_row(group: &GroupedVendorBill) -> ExportRow {
    let bill: &VendorBill = group.bill;
    ExportRow {
        number: bill.invoice_number.clone(),
        kind: "Vendor".to_string(),
        supplier: bill.supplier.clone(),
        po_reference: format!("{} PO(s)", group.reconciliation.covered_orders),
        date: bill.invoice_date.format("%Y-%m-%d").to_string(),
        amount: format!("{:.2}", bill.invoice_amount),
        paid: format!("{:.2}", bill.paid_amount),
        balance: format!("{:.2}", bill.balance_due()),
        status: bill.payment_status.to_string(),
        parent: String::new(),
    }
}

fn company_row(bill: &CompanyBill, kind: &str, parent: &str) -> ExportRow {
    let po_reference = bill
        .order_number
        .as_deref()
        .or(bill.purchase_order_id.as_deref())
        .unwrap_or(NOT_APPLICABLE);
    ExportRow {
        number: bill.invoice_number.clone(),
        kind: kind.to_string(),
        supplier: bill.supplier.clone(),
        po_reference: po_reference.to_string(),
        date: bill.invoice_date.format("%Y-%m-%d").to_string(),
        amount: format!("{:.2}", bill.invoice_amount),
        paid: NOT_APPLICABLE.to_string(),
        balance: NOT_APPLICABLE.to_string(),
        status: bill.bill_status.to_string(),
        parent: parent.to_string(),
    }
}

/// Flattens a grouping into export rows: each vendor bill followed by
/// its children, then every orphan. Expansion state plays no part here;
/// the export always contains everything.
pub fn export_rows(grouping: &Grouping) -> Vec<ExportRow> {
    let mut rows = Vec::new();
    for group in &grouping.groups {
        rows.push(vendor_row(group));
        for child in &group.children {
            rows.push(company_row(child, "Company", &group.bill.invoice_number));
        }
    }
    for orphan in &grouping.orphans {
        rows.push(company_row(orphan, "Company (Orphan)", NO_PARENT));
    }
    rows
}

/// Writes header plus rows as CSV. Quoting and escaping are the csv
/// crate's standard behavior, so suppliers with commas or quotes in
/// their names come out intact.
pub fn write_csv<W: Write>(writer: W, rows: &[ExportRow]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(EXPORT_HEADER)?;
    for row in rows {
        csv_writer.write_record([
            &row.number,
            &row.kind,
            &row.supplier,
            &row.po_reference,
            &row.date,
            &row.amount,
            &row.paid,
            &row.balance,
            &row.status,
            &row.parent,
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Default export file name, stamped with the given date.
pub fn export_filename(date: NaiveDate) -> String {
    format!("bill-export-{}.csv", date.format("%Y-%m-%d"))
}
