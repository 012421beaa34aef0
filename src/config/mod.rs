pub mod bills;
mod settings;

pub use bills::{
    BillStatus, CompanyBill, CompanyBillFile, PaymentRecord, PaymentStatus, VendorBill,
    VendorBillFile,
};
pub use settings::{BillingSettings, CompanyInfo, Config, ExportSettings};

use crate::engine::view::ViewState;
use crate::error::{BillError, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.billmatch/)
pub fn config_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "billmatch") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.billmatch/
    let home = dirs_home().ok_or_else(|| {
        BillError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".billmatch"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if path.starts_with("~/") {
        if let Some(home) = dirs_home() {
            return home.join(&path[2..]);
        }
    }
    PathBuf::from(path)
}

/// Resolve the export output directory: `~` expands, relative paths are
/// taken relative to the config directory.
pub fn resolve_output_dir(output_dir: &str, config_dir: &Path) -> PathBuf {
    let expanded = expand_path(output_dir);
    if expanded.is_absolute() {
        expanded
    } else {
        config_dir.join(expanded)
    }
}

/// Load the main config.toml
pub fn load_config(config_dir: &Path) -> Result<Config> {
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(BillError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| BillError::ConfigParse { path, source: e })
}

fn check_unique_ids<'a, I>(ids: I, file: &str) -> Result<()>
where
    I: Iterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(BillError::DuplicateBillId {
                id: id.to_string(),
                file: file.to_string(),
            });
        }
    }
    Ok(())
}

/// Load vendor_bills.toml in file order. Duplicate record ids are a
/// malformed store and fail fast rather than producing ambiguous lookups.
pub fn load_vendor_bills(config_dir: &Path) -> Result<Vec<VendorBill>> {
    let path = config_dir.join("vendor_bills.toml");
    if !path.exists() {
        return Err(BillError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    let file: VendorBillFile =
        toml::from_str(&content).map_err(|e| BillError::ConfigParse { path, source: e })?;
    check_unique_ids(file.bills.iter().map(|b| b.id.as_str()), "vendor_bills.toml")?;
    Ok(file.bills)
}

/// Load company_bills.toml in file order, same uniqueness rule.
pub fn load_company_bills(config_dir: &Path) -> Result<Vec<CompanyBill>> {
    let path = config_dir.join("company_bills.toml");
    if !path.exists() {
        return Err(BillError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    let file: CompanyBillFile =
        toml::from_str(&content).map_err(|e| BillError::ConfigParse { path, source: e })?;
    check_unique_ids(
        file.bills.iter().map(|b| b.id.as_str()),
        "company_bills.toml",
    )?;
    Ok(file.bills)
}

/// Reclassify every vendor bill's payment status against `today`.
/// Commands run this right after loading, before the engine sees the data.
pub fn refresh_all(bills: &mut [VendorBill], today: NaiveDate) {
    for bill in bills.iter_mut() {
        bill.refresh_payment_status(today);
    }
}

pub fn save_vendor_bills(config_dir: &Path, bills: &[VendorBill]) -> Result<()> {
    let path = config_dir.join("vendor_bills.toml");
    let file = VendorBillFile {
        bills: bills.to_vec(),
    };
    let content = toml::to_string_pretty(&file).map_err(|e| {
        BillError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })?;
    fs::write(path, content)?;
    Ok(())
}

pub fn save_company_bills(config_dir: &Path, bills: &[CompanyBill]) -> Result<()> {
    let path = config_dir.join("company_bills.toml");
    let file = CompanyBillFile {
        bills: bills.to_vec(),
    };
    let content = toml::to_string_pretty(&file).map_err(|e| {
        BillError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })?;
    fs::write(path, content)?;
    Ok(())
}

/// Load state.toml (defaults to empty view state if missing)
pub fn load_state(config_dir: &Path) -> Result<ViewState> {
    let path = config_dir.join("state.toml");
    if !path.exists() {
        return Ok(ViewState::default());
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| BillError::ConfigParse { path, source: e })
}

/// Save state.toml
pub fn save_state(config_dir: &Path, state: &ViewState) -> Result<()> {
    let path = config_dir.join("state.toml");
    let content = toml::to_string_pretty(state).map_err(|e| {
        BillError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })?;
    fs::write(path, content)?;
    Ok(())
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[company]
name = "Your Company Name"
# email = "accounts@yourcompany.com"   # optional
# phone = "+1-555-123-4567"            # optional

[billing]
currency = "USD"
currency_symbol = "$"
# fx_currency = "EUR"   # optional: show outstanding total converted to this
                        # currency in 'list' (needs network; skipped quietly
                        # when unavailable)

[export]
output_dir = "export"   # relative paths resolve inside the config directory
"#;

/// Template content for vendor_bills.toml
pub const VENDOR_BILLS_TEMPLATE: &str = r#"# Vendor bills: invoices received from your suppliers.
#
# Each [[bills]] entry is one vendor bill. File order matters: 'list' and
# 'export' keep it. 'covers' names the company bill ids this vendor bill
# claims to settle; reconciliation compares the amounts on both sides.
#
# The example below reconciles cleanly (600 + 400 = 1000); the second bill
# references a company bill that does not exist yet, so it shows up as a
# mismatch with a missing link.

[[bills]]
id = "VB-1001"
invoice_number = "SUP-2026-104"
invoice_date = "2026-01-10"
invoice_amount = 1000.0
supplier = "Harbor Crude Trading"
covers = ["CB-2001", "CB-2002"]

[[bills]]
id = "VB-1002"
invoice_number = "SUP-2026-118"
invoice_date = "2026-01-18"
invoice_amount = 1200.0
supplier = "Meridian Scrap Metals"
covers = ["CB-2003", "CB-9999"]
notes = "Awaiting company bill for the second lot"
# due_date = "2026-02-18"       # optional; open bills past this date list
                                # as overdue
# paid_amount = 0.0             # maintained by 'billmatch pay'
"#;

/// Template content for company_bills.toml
pub const COMPANY_BILLS_TEMPLATE: &str = r#"# Company bills: bills your company issues against its own purchase orders.
#
# Company bills carry no payment trail of their own; they are settled when a
# vendor bill's 'covers' list references their id. Any company bill no vendor
# bill references appears in the orphans section.

[[bills]]
id = "CB-2001"
invoice_number = "INT-2026-0001"
invoice_date = "2026-01-08"
invoice_amount = 600.0
order_number = "PO-7741"
supplier = "Harbor Crude Trading"

[[bills]]
id = "CB-2002"
invoice_number = "INT-2026-0002"
invoice_date = "2026-01-09"
invoice_amount = 400.0
order_number = "PO-7742"
supplier = "Harbor Crude Trading"

[[bills]]
id = "CB-2003"
invoice_number = "INT-2026-0003"
invoice_date = "2026-01-15"
invoice_amount = 700.0
order_number = "PO-7751"
supplier = "Meridian Scrap Metals"

[[bills]]
id = "CB-2004"
invoice_number = "INT-2026-0004"
invoice_date = "2026-01-16"
invoice_amount = 350.0
order_number = "PO-7752"
supplier = "Meridian Scrap Metals"
notes = "Not yet linked to a vendor bill"
"#;
