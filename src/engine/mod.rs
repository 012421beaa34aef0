//! The reconciliation core: pure functions from bill collections to
//! grouped, reconciled, classified output, plus the little interaction
//! state the host UI persists. Nothing in here performs I/O; loading and
//! saving stay with the host.

pub mod export;
pub mod group;
pub mod payment;
pub mod reconcile;
pub mod status;
pub mod view;

pub use export::{export_filename, export_rows, write_csv, ExportRow, EXPORT_HEADER};
pub use group::{group, DataWarning, GroupedVendorBill, Grouping};
pub use payment::{record_payment, AppliedPayment, PaymentError, PaymentInput};
pub use reconcile::{reconcile, Reconciliation, AMOUNT_TOLERANCE};
pub use status::{classify, MatchStatus, StatusStyle};
pub use view::{company_actions, vendor_actions, CompanyActions, VendorActions, ViewState};
