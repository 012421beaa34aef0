pub mod config;
pub mod engine;
pub mod error;

pub use config::{CompanyBill, Config, PaymentRecord, PaymentStatus, VendorBill};
pub use engine::{classify, group, record_payment, Grouping, MatchStatus, Reconciliation};
pub use error::{BillError, Result};
