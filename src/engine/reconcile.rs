use crate::config::bills::{CompanyBill, VendorBill};

/// Differences smaller than a cent are treated as equal. Bill amounts go
/// through f64 arithmetic on their way here, so exact comparison would
/// flag sums like 599.999999 as mismatches.
pub const AMOUNT_TOLERANCE: f64 = 0.01;

/// Shaved off the boundary before comparing. Subtraction can land a true
/// one-cent gap just below 0.01 (1000.01 - 1000.0 does), and that gap
/// still has to read as a discrepancy.
const TOLERANCE_SLACK: f64 = 1e-9;

/// Amount and linkage comparison for one vendor bill against the company
/// bills that could be resolved for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reconciliation {
    /// True when the vendor amount and the sum of linked company bill
    /// amounts agree within [`AMOUNT_TOLERANCE`].
    pub matched: bool,
    /// Vendor amount minus the linked sum. Positive means the vendor
    /// invoiced more than the company bills account for.
    pub difference: f64,
    /// Distinct purchase-order references the vendor bill lists,
    /// including references that could not be resolved.
    pub covered_orders: usize,
    /// Company bills actually attached to this vendor bill.
    pub linked_bills: usize,
    /// References without a matching company bill: `covered_orders`
    /// minus `linked_bills`, floored at zero.
    pub missing_bills: usize,
}

/// Compares a vendor bill against its resolved children.
///
/// `covered_orders` is passed in by the grouper rather than derived from
/// `bill.covers`, because the grouper already deduplicated the list and
/// knows how many distinct references it carried.
pub fn reconcile(
    bill: &VendorBill,
    children: &[&CompanyBill],
    covered_orders: usize,
) -> Reconciliation {
    let linked_sum: f64 = children.iter().map(|c| c.invoice_amount).sum();
    let difference = bill.invoice_amount - linked_sum;
    let linked_bills = children.len();

    Reconciliation {
        matched: difference.abs() < AMOUNT_TOLERANCE - TOLERANCE_SLACK,
        difference,
        covered_orders,
        linked_bills,
        missing_bills: covered_orders.saturating_sub(linked_bills),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::bills::{BillStatus, PaymentStatus};

    fn vendor(amount: f64) -> VendorBill {
        VendorBill {
            id: "VB-1".to_string(),
            invoice_number: "SUP-001".to_string(),
            invoice_date: chrono::NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
            due_date: None,
            invoice_amount: amount,
            paid_amount: 0.0,
            payment_status: PaymentStatus::Unpaid,
            supplier: "Harbor Crude Trading".to_string(),
            covers: Vec::new(),
            notes: None,
            payments: Vec::new(),
        }
    }

    fn company(id: &str, amount: f64) -> CompanyBill {
        CompanyBill {
            id: id.to_string(),
            invoice_number: format!("INT-{id}"),
            invoice_date: chrono::NaiveDate::from_ymd_opt(2026, 1, 12).unwrap(),
            invoice_amount: amount,
            bill_status: BillStatus::Draft,
            purchase_order_id: None,
            order_number: None,
            supplier: "Harbor Crude Trading".to_string(),
            notes: None,
        }
    }

    #[test]
    fn exact_sum_matches() {
        let vb = vendor(1000.0);
        let (a, b) = (company("CB-1", 600.0), company("CB-2", 400.0));
        let rec = reconcile(&vb, &[&a, &b], 2);
        assert!(rec.matched);
        assert_eq!(rec.difference, 0.0);
        assert_eq!(rec.covered_orders, 2);
        assert_eq!(rec.linked_bills, 2);
        assert_eq!(rec.missing_bills, 0);
    }

    #[test]
    fn sub_cent_difference_still_matches() {
        let vb = vendor(1000.005);
        let (a, b) = (company("CB-1", 600.0), company("CB-2", 400.0));
        let rec = reconcile(&vb, &[&a, &b], 2);
        assert!(rec.matched);
        assert!(rec.difference.abs() < AMOUNT_TOLERANCE);
    }

    #[test]
    fn one_cent_difference_is_a_mismatch() {
        let vb = vendor(1000.01);
        let (a, b) = (company("CB-1", 600.0), company("CB-2", 400.0));
        let rec = reconcile(&vb, &[&a, &b], 2);
        assert!(!rec.matched);
    }

    #[test]
    fn one_cent_difference_is_a_mismatch_at_every_magnitude() {
        // The computed gap drifts to either side of 0.01 depending on
        // the amounts involved; the verdict must not.
        for amount in [100.0, 1000.0, 25_000.0, 900_000.0] {
            let vb = vendor(amount + 0.01);
            let child = company("CB-1", amount);
            let rec = reconcile(&vb, &[&child], 1);
            assert!(!rec.matched, "one cent over {amount} read as matched");
        }
    }

    #[test]
    fn unresolved_reference_counts_as_missing() {
        let vb = vendor(1000.0);
        let a = company("CB-1", 600.0);
        // Two references listed, only one resolved.
        let rec = reconcile(&vb, &[&a], 2);
        assert!(!rec.matched);
        assert_eq!(rec.difference, 400.0);
        assert_eq!(rec.missing_bills, 1);
    }

    #[test]
    fn coincidental_amount_match_with_missing_link() {
        let vb = vendor(1000.0);
        let a = company("CB-1", 1000.0);
        let rec = reconcile(&vb, &[&a], 2);
        assert!(rec.matched);
        assert_eq!(rec.missing_bills, 1);
    }

    #[test]
    fn no_children_leaves_full_amount_unexplained() {
        let vb = vendor(750.0);
        let rec = reconcile(&vb, &[], 0);
        assert!(!rec.matched);
        assert_eq!(rec.difference, 750.0);
        assert_eq!(rec.covered_orders, 0);
        assert_eq!(rec.missing_bills, 0);
    }

    #[test]
    fn negative_difference_when_company_bills_overstate() {
        let vb = vendor(900.0);
        let (a, b) = (company("CB-1", 600.0), company("CB-2", 400.0));
        let rec = reconcile(&vb, &[&a, &b], 2);
        assert!(!rec.matched);
        assert_eq!(rec.difference, -100.0);
    }
}
