use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Payment state of a vendor bill. Stored lowercase in the TOML store;
/// refreshed by the store layer, only ever read by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Partial,
    Paid,
    Overdue,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Partial => "partial",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle state of a company bill: created draft, sent once, done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    #[default]
    Draft,
    Sent,
}

impl BillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
        }
    }
}

impl std::fmt::Display for BillStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One recorded payment against a vendor bill (audit trail entry)
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PaymentRecord {
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// An invoice received from an external supplier. The only bill type that
/// carries a payment trail; `covers` lists the company bill ids it claims
/// to settle.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct VendorBill {
    pub id: String,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    pub invoice_amount: f64,
    #[serde(default)]
    pub paid_amount: f64,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    pub supplier: String,
    #[serde(default)]
    pub covers: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub payments: Vec<PaymentRecord>,
}

impl VendorBill {
    /// Remaining amount owed, floored at zero.
    pub fn balance_due(&self) -> f64 {
        (self.invoice_amount - self.paid_amount).max(0.0)
    }

    pub fn is_settled(&self) -> bool {
        self.balance_due() <= 0.001
    }

    /// Reclassify `payment_status` from the stored amounts and `due_date`.
    ///
    /// This is the host-side collaborator the engine trusts: it runs when
    /// the store is loaded and again after a payment is applied. A settled
    /// bill is `paid`; an open bill past its due date is `overdue`;
    /// otherwise `partial` or `unpaid` depending on the trail so far.
    pub fn refresh_payment_status(&mut self, today: NaiveDate) {
        self.payment_status = if self.is_settled() {
            PaymentStatus::Paid
        } else if self.due_date.is_some_and(|d| d < today) {
            PaymentStatus::Overdue
        } else if self.paid_amount > 0.0 {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Unpaid
        };
    }
}

/// An internally issued bill against one of the company's own purchase
/// orders. Never payable on its own: it is settled indirectly when some
/// vendor bill's `covers` list references it.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CompanyBill {
    pub id: String,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub invoice_amount: f64,
    #[serde(default)]
    pub bill_status: BillStatus,
    #[serde(default)]
    pub purchase_order_id: Option<String>,
    #[serde(default)]
    pub order_number: Option<String>,
    pub supplier: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// On-disk shape of vendor_bills.toml: a `[[bills]]` array. File order is
/// the canonical input order the grouping engine preserves.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct VendorBillFile {
    #[serde(default)]
    pub bills: Vec<VendorBill>,
}

/// On-disk shape of company_bills.toml, same ordering rule.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct CompanyBillFile {
    #[serde(default)]
    pub bills: Vec<CompanyBill>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bill(amount: f64, paid: f64, due: Option<&str>) -> VendorBill {
        VendorBill {
            id: "VB-1".into(),
            invoice_number: "SUP-1".into(),
            invoice_date: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
            due_date: due.map(|d| d.parse().unwrap()),
            invoice_amount: amount,
            paid_amount: paid,
            payment_status: PaymentStatus::Unpaid,
            supplier: "Acme Oil".into(),
            covers: vec![],
            notes: None,
            payments: vec![],
        }
    }

    #[test]
    fn balance_never_negative() {
        let b = bill(100.0, 150.0, None);
        assert_eq!(b.balance_due(), 0.0);
    }

    #[test]
    fn refresh_classifies_paid_partial_unpaid() {
        let today = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();

        let mut b = bill(500.0, 500.0, None);
        b.refresh_payment_status(today);
        assert_eq!(b.payment_status, PaymentStatus::Paid);

        let mut b = bill(500.0, 200.0, None);
        b.refresh_payment_status(today);
        assert_eq!(b.payment_status, PaymentStatus::Partial);

        let mut b = bill(500.0, 0.0, None);
        b.refresh_payment_status(today);
        assert_eq!(b.payment_status, PaymentStatus::Unpaid);
    }

    #[test]
    fn refresh_marks_open_bills_overdue_past_due_date() {
        let today = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();

        let mut b = bill(500.0, 200.0, Some("2026-01-15"));
        b.refresh_payment_status(today);
        assert_eq!(b.payment_status, PaymentStatus::Overdue);

        // A settled bill is paid even if the due date has passed
        let mut b = bill(500.0, 500.0, Some("2026-01-15"));
        b.refresh_payment_status(today);
        assert_eq!(b.payment_status, PaymentStatus::Paid);

        // Due today is not yet overdue
        let mut b = bill(500.0, 0.0, Some("2026-02-01"));
        b.refresh_payment_status(today);
        assert_eq!(b.payment_status, PaymentStatus::Unpaid);
    }
}
