use std::path::PathBuf;
use thiserror::Error;

use crate::engine::payment::PaymentError;

#[derive(Error, Debug)]
pub enum BillError {
    #[error("Config directory not found at {0}. Run 'billmatch init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Vendor bill '{0}' not found in vendor_bills.toml")]
    VendorBillNotFound(String),

    #[error("Company bill '{0}' not found in company_bills.toml")]
    CompanyBillNotFound(String),

    #[error("Bill '{0}' not found in either store. Use 'billmatch list' to see known bills.")]
    BillNotFound(String),

    #[error("Reference '{0}' matches more than one bill. Use the bill id.")]
    AmbiguousBill(String),

    #[error("Duplicate bill id '{id}' in {file}")]
    DuplicateBillId { id: String, file: String },

    #[error("Vendor bill '{0}' is already paid in full")]
    AlreadyPaid(String),

    #[error("Company bill '{0}' has already been marked as sent")]
    AlreadySent(String),

    #[error("Vendor bill '{0}' has no linked company bills to expand")]
    NothingToExpand(String),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD.")]
    InvalidDate(String),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BillError>;
