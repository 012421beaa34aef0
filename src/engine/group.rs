use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::config::bills::{CompanyBill, VendorBill};

use super::reconcile::{reconcile, Reconciliation};

/// Data problems the grouper works around rather than failing on. The
/// host decides where to surface these; grouping itself always succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataWarning {
    /// A company bill reference appeared more than once, either twice in
    /// one vendor bill's cover list or in the lists of two different
    /// vendor bills. The first reference wins; later ones are ignored.
    DuplicateReference {
        company_bill_id: String,
        kept_by: String,
        dropped_from: String,
    },
    /// A vendor bill references a company bill id that does not exist in
    /// the store.
    UnresolvedReference {
        vendor_bill_id: String,
        company_bill_id: String,
    },
}

impl fmt::Display for DataWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataWarning::DuplicateReference {
                company_bill_id,
                kept_by,
                dropped_from,
            } if kept_by == dropped_from => write!(
                f,
                "company bill '{company_bill_id}' is listed more than once by vendor bill '{kept_by}'"
            ),
            DataWarning::DuplicateReference {
                company_bill_id,
                kept_by,
                dropped_from,
            } => write!(
                f,
                "company bill '{company_bill_id}' is already claimed by vendor bill '{kept_by}'; the reference from '{dropped_from}' was ignored"
            ),
            DataWarning::UnresolvedReference {
                vendor_bill_id,
                company_bill_id,
            } => write!(
                f,
                "vendor bill '{vendor_bill_id}' references unknown company bill '{company_bill_id}'"
            ),
        }
    }
}

/// One vendor bill with the company bills resolved for it and the
/// reconciliation computed over them.
#[derive(Debug)]
pub struct GroupedVendorBill<'a> {
    pub bill: &'a VendorBill,
    pub children: Vec<&'a CompanyBill>,
    pub reconciliation: Reconciliation,
}

/// Full grouping output: every vendor bill becomes a group (childless
/// ones included) and every company bill lands either under exactly one
/// group or in `orphans`.
#[derive(Debug)]
pub struct Grouping<'a> {
    pub groups: Vec<GroupedVendorBill<'a>>,
    pub orphans: Vec<&'a CompanyBill>,
    pub warnings: Vec<DataWarning>,
}

/// Attaches company bills to the vendor bills that cover them.
///
/// Groups come out in vendor-bill input order, children in cover-list
/// order, orphans in company-bill input order. No sorting happens here;
/// two calls over the same slices produce the same output.
pub fn group<'a>(
    vendor_bills: &'a [VendorBill],
    company_bills: &'a [CompanyBill],
) -> Grouping<'a> {
    // Lookup tables only; all output order comes from the input slices.
    let by_id: HashMap<&'a str, &'a CompanyBill> = company_bills
        .iter()
        .map(|bill| (bill.id.as_str(), bill))
        .collect();

    // Company bill id -> vendor bill id that claimed it first.
    let mut claimed: HashMap<&'a str, &'a str> = HashMap::new();
    let mut groups = Vec::with_capacity(vendor_bills.len());
    let mut warnings = Vec::new();

    for vendor_bill in vendor_bills {
        let mut listed: HashSet<&'a str> = HashSet::new();
        let mut children: Vec<&'a CompanyBill> = Vec::new();
        let mut covered_orders = 0usize;

        for cover_id in &vendor_bill.covers {
            let cover_id = cover_id.as_str();
            if !listed.insert(cover_id) {
                warnings.push(DataWarning::DuplicateReference {
                    company_bill_id: cover_id.to_string(),
                    kept_by: vendor_bill.id.clone(),
                    dropped_from: vendor_bill.id.clone(),
                });
                continue;
            }
            // Distinct references count toward coverage even when they
            // cannot be resolved; the gap shows up as a missing bill.
            covered_orders += 1;

            if let Some(owner) = claimed.get(cover_id) {
                warnings.push(DataWarning::DuplicateReference {
                    company_bill_id: cover_id.to_string(),
                    kept_by: (*owner).to_string(),
                    dropped_from: vendor_bill.id.clone(),
                });
                continue;
            }
            match by_id.get(cover_id).copied() {
                Some(company_bill) => {
                    claimed.insert(cover_id, vendor_bill.id.as_str());
                    children.push(company_bill);
                }
                None => warnings.push(DataWarning::UnresolvedReference {
                    vendor_bill_id: vendor_bill.id.clone(),
                    company_bill_id: cover_id.to_string(),
                }),
            }
        }

        let reconciliation = reconcile(vendor_bill, &children, covered_orders);
        groups.push(GroupedVendorBill {
            bill: vendor_bill,
            children,
            reconciliation,
        });
    }

    let orphans = company_bills
        .iter()
        .filter(|bill| !claimed.contains_key(bill.id.as_str()))
        .collect();

    Grouping {
        groups,
        orphans,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::bills::{BillStatus, PaymentStatus};

    fn vendor(id: &str, amount: f64, covers: &[&str]) -> VendorBill {
        VendorBill {
            id: id.to_string(),
            invoice_number: format!("SUP-{id}"),
            invoice_date: chrono::NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
            due_date: None,
            invoice_amount: amount,
            paid_amount: 0.0,
            payment_status: PaymentStatus::Unpaid,
            supplier: "Harbor Crude Trading".to_string(),
            covers: covers.iter().map(|c| c.to_string()).collect(),
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

    fn child_ids(grouping: &Grouping, vendor_id: &str) -> Vec<String> {
        grouping
            .groups
            .iter()
            .find(|g| g.bill.id == vendor_id)
            .map(|g| g.children.iter().map(|c| c.id.clone()).collect())
            .unwrap_or_default()
    }

    fn orphan_ids(grouping: &Grouping) -> Vec<String> {
        grouping.orphans.iter().map(|c| c.id.clone()).collect()
    }

    #[test]
    fn attaches_children_in_cover_order() {
        let vendors = vec![vendor("VB-1", 1000.0, &["CB-2", "CB-1"])];
        let companies = vec![company("CB-1", 400.0), company("CB-2", 600.0)];

        let grouping = group(&vendors, &companies);
        assert_eq!(child_ids(&grouping, "VB-1"), vec!["CB-2", "CB-1"]);
        assert!(grouping.orphans.is_empty());
        assert!(grouping.warnings.is_empty());
    }

    #[test]
    fn every_company_bill_lands_exactly_once() {
        let vendors = vec![
            vendor("VB-1", 1000.0, &["CB-1", "CB-2"]),
            vendor("VB-2", 700.0, &["CB-3"]),
        ];
        let companies = vec![
            company("CB-1", 600.0),
            company("CB-2", 400.0),
            company("CB-3", 700.0),
            company("CB-4", 350.0),
        ];

        let grouping = group(&vendors, &companies);
        let mut placed: Vec<String> = grouping
            .groups
            .iter()
            .flat_map(|g| g.children.iter().map(|c| c.id.clone()))
            .chain(orphan_ids(&grouping))
            .collect();
        placed.sort();
        assert_eq!(placed, vec!["CB-1", "CB-2", "CB-3", "CB-4"]);
        assert_eq!(orphan_ids(&grouping), vec!["CB-4"]);
    }

    #[test]
    fn childless_vendor_bill_still_forms_a_group() {
        let vendors = vec![vendor("VB-1", 500.0, &[])];
        let grouping = group(&vendors, &[]);
        assert_eq!(grouping.groups.len(), 1);
        assert!(grouping.groups[0].children.is_empty());
        assert_eq!(grouping.groups[0].reconciliation.covered_orders, 0);
    }

    #[test]
    fn first_vendor_bill_keeps_a_doubly_referenced_child() {
        let vendors = vec![
            vendor("VB-1", 600.0, &["CB-1"]),
            vendor("VB-2", 600.0, &["CB-1"]),
        ];
        let companies = vec![company("CB-1", 600.0)];

        let grouping = group(&vendors, &companies);
        assert_eq!(child_ids(&grouping, "VB-1"), vec!["CB-1"]);
        assert!(child_ids(&grouping, "VB-2").is_empty());
        assert!(grouping.orphans.is_empty());

        // The loser still lists the reference, so it reconciles as missing.
        let loser = &grouping.groups[1].reconciliation;
        assert_eq!(loser.covered_orders, 1);
        assert_eq!(loser.missing_bills, 1);

        assert_eq!(
            grouping.warnings,
            vec![DataWarning::DuplicateReference {
                company_bill_id: "CB-1".to_string(),
                kept_by: "VB-1".to_string(),
                dropped_from: "VB-2".to_string(),
            }]
        );
    }

    #[test]
    fn repeated_reference_within_one_list_counts_once() {
        let vendors = vec![vendor("VB-1", 600.0, &["CB-1", "CB-1"])];
        let companies = vec![company("CB-1", 600.0)];

        let grouping = group(&vendors, &companies);
        assert_eq!(child_ids(&grouping, "VB-1"), vec!["CB-1"]);

        let rec = &grouping.groups[0].reconciliation;
        assert_eq!(rec.covered_orders, 1);
        assert_eq!(rec.linked_bills, 1);
        assert!(rec.matched);

        assert_eq!(grouping.warnings.len(), 1);
        assert!(grouping.warnings[0]
            .to_string()
            .contains("listed more than once"));
    }

    #[test]
    fn unresolved_reference_warns_and_counts_toward_coverage() {
        let vendors = vec![vendor("VB-1", 1200.0, &["CB-1", "CB-9999"])];
        let companies = vec![company("CB-1", 700.0)];

        let grouping = group(&vendors, &companies);
        let rec = &grouping.groups[0].reconciliation;
        assert_eq!(rec.covered_orders, 2);
        assert_eq!(rec.linked_bills, 1);
        assert_eq!(rec.missing_bills, 1);

        assert_eq!(
            grouping.warnings,
            vec![DataWarning::UnresolvedReference {
                vendor_bill_id: "VB-1".to_string(),
                company_bill_id: "CB-9999".to_string(),
            }]
        );
    }

    #[test]
    fn output_order_is_stable_across_calls() {
        let vendors = vec![
            vendor("VB-3", 100.0, &["CB-2"]),
            vendor("VB-1", 200.0, &["CB-3", "CB-1"]),
            vendor("VB-2", 300.0, &[]),
        ];
        let companies = vec![
            company("CB-3", 50.0),
            company("CB-1", 60.0),
            company("CB-2", 70.0),
            company("CB-4", 80.0),
        ];

        let first = group(&vendors, &companies);
        let second = group(&vendors, &companies);

        let shape = |g: &Grouping| -> Vec<(String, Vec<String>)> {
            g.groups
                .iter()
                .map(|grp| {
                    (
                        grp.bill.id.clone(),
                        grp.children.iter().map(|c| c.id.clone()).collect(),
                    )
                })
                .collect()
        };
        assert_eq!(shape(&first), shape(&second));
        assert_eq!(orphan_ids(&first), orphan_ids(&second));
        assert_eq!(first.warnings, second.warnings);

        // Vendor order mirrors the input slice, not any sorted order.
        let ids: Vec<String> = first.groups.iter().map(|g| g.bill.id.clone()).collect();
        assert_eq!(ids, vec!["VB-3", "VB-1", "VB-2"]);
        // Orphan order mirrors the company input slice.
        assert_eq!(orphan_ids(&first), vec!["CB-4"]);
    }

    #[test]
    fn orphans_keep_company_input_order() {
        let vendors = vec![vendor("VB-1", 100.0, &["CB-2"])];
        let companies = vec![
            company("CB-5", 10.0),
            company("CB-2", 100.0),
            company("CB-3", 20.0),
            company("CB-1", 30.0),
        ];

        let grouping = group(&vendors, &companies);
        assert_eq!(orphan_ids(&grouping), vec!["CB-5", "CB-3", "CB-1"]);
    }
}
