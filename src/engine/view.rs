use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::bills::{BillStatus, PaymentStatus};

/// Which vendor bill groups are currently expanded. Everything starts
/// collapsed; only explicit toggles are remembered. The set is keyed by
/// vendor bill id and sorted so the persisted form is stable.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ViewState {
    #[serde(default)]
    pub expanded: BTreeSet<String>,
}

impl ViewState {
    /// Flips one group and reports the new state: true means expanded.
    pub fn toggle(&mut self, vendor_bill_id: &str) -> bool {
        if self.expanded.remove(vendor_bill_id) {
            false
        } else {
            self.expanded.insert(vendor_bill_id.to_string());
            true
        }
    }

    pub fn is_expanded(&self, vendor_bill_id: &str) -> bool {
        self.expanded.contains(vendor_bill_id)
    }
}

/// Actions available on a vendor bill row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VendorActions {
    pub record_payment: bool,
    pub edit: bool,
    pub view_details: bool,
}

/// Actions available on a company bill row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompanyActions {
    pub mark_sent: bool,
    pub view_details: bool,
}

/// Payment and edit actions close once a bill is fully paid; details
/// stay viewable forever.
pub fn vendor_actions(status: PaymentStatus) -> VendorActions {
    let open = status != PaymentStatus::Paid;
    VendorActions {
        record_payment: open,
        edit: open,
        view_details: true,
    }
}

/// A company bill can be marked as sent exactly once, from draft.
pub fn company_actions(status: BillStatus) -> CompanyActions {
    CompanyActions {
        mark_sent: status == BillStatus::Draft,
        view_details: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_and_persists_membership() {
        let mut state = ViewState::default();
        assert!(!state.is_expanded("VB-1001"));

        assert!(state.toggle("VB-1001"));
        assert!(state.is_expanded("VB-1001"));

        assert!(!state.toggle("VB-1001"));
        assert!(!state.is_expanded("VB-1001"));
    }

    #[test]
    fn toggling_one_group_leaves_others_alone() {
        let mut state = ViewState::default();
        state.toggle("VB-1001");
        state.toggle("VB-1002");
        state.toggle("VB-1001");
        assert!(!state.is_expanded("VB-1001"));
        assert!(state.is_expanded("VB-1002"));
    }

    #[test]
    fn state_round_trips_through_toml() {
        let mut state = ViewState::default();
        state.toggle("VB-1002");
        state.toggle("VB-1001");

        let text = toml::to_string(&state).unwrap();
        let back: ViewState = toml::from_str(&text).unwrap();
        assert!(back.is_expanded("VB-1001"));
        assert!(back.is_expanded("VB-1002"));

        let empty: ViewState = toml::from_str("").unwrap();
        assert!(empty.expanded.is_empty());
    }

    #[test]
    fn paid_bills_lose_payment_and_edit_actions() {
        let open = vendor_actions(PaymentStatus::Partial);
        assert!(open.record_payment);
        assert!(open.edit);
        assert!(open.view_details);

        let closed = vendor_actions(PaymentStatus::Paid);
        assert!(!closed.record_payment);
        assert!(!closed.edit);
        assert!(closed.view_details);

        // Overdue bills can of course still be paid.
        assert!(vendor_actions(PaymentStatus::Overdue).record_payment);
    }

    #[test]
    fn sent_company_bills_cannot_be_sent_again() {
        assert!(company_actions(BillStatus::Draft).mark_sent);
        let sent = company_actions(BillStatus::Sent);
        assert!(!sent.mark_sent);
        assert!(sent.view_details);
    }
}
