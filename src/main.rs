mod config;
mod engine;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tabled::{settings::Style, Table, Tabled};

use crate::config::{
    config_dir, load_company_bills, load_config, load_state, load_vendor_bills, refresh_all,
    save_company_bills, save_state, save_vendor_bills, BillStatus, CompanyBill, VendorBill,
    COMPANY_BILLS_TEMPLATE, CONFIG_TEMPLATE, VENDOR_BILLS_TEMPLATE,
};
use crate::engine::{
    classify, company_actions, export_filename, export_rows, group, record_payment,
    vendor_actions, write_csv, CompanyActions, DataWarning, MatchStatus, PaymentInput,
    VendorActions,
};
use crate::error::{BillError, Result};

#[derive(Parser)]
#[command(name = "billmatch")]
#[command(version, about = "Minimal CLI bill reconciliation system", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.billmatch or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with template files
    Init,

    /// List vendor bills with their linked company bills and match status
    List {
        /// Expand every group regardless of saved view state
        #[arg(short, long)]
        all: bool,
    },

    /// Expand or collapse a vendor bill group in 'list'
    Toggle {
        /// Vendor bill id or invoice number (e.g., VB-1001 or SUP-2026-104)
        bill: String,
    },

    /// Show full details for one bill, vendor or company
    Show {
        /// Bill id or invoice number
        bill: String,
    },

    /// Record a payment against a vendor bill
    Pay {
        /// Vendor bill id or invoice number
        bill: String,

        /// Payment amount
        amount: f64,

        /// Payment date (default: today)
        #[arg(long)]
        date: Option<String>,

        /// Payment method (e.g., wire, check)
        #[arg(long)]
        method: Option<String>,

        /// Bank or internal reference for the payment
        #[arg(long)]
        reference: Option<String>,

        /// Free-form note stored with the payment
        #[arg(long)]
        notes: Option<String>,
    },

    /// Show payment history for a vendor bill
    Payments {
        /// Vendor bill id or invoice number
        bill: String,
    },

    /// Mark a company bill as sent
    Send {
        /// Company bill id or invoice number
        bill: String,
    },

    /// Edit a vendor bill's covers list, due date, or notes
    Edit {
        /// Vendor bill id or invoice number
        bill: String,

        /// Replace the covered company bill ids (comma-separated)
        #[arg(long, value_delimiter = ',')]
        covers: Option<Vec<String>>,

        /// Set the due date (YYYY-MM-DD)
        #[arg(long)]
        due_date: Option<String>,

        /// Replace the notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// List company bills no vendor bill covers
    Orphans,

    /// Export all bills to CSV
    Export {
        /// Custom output file path (default: export_dir/bill-export-DATE.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show store summary and data warnings
    Status,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Determine config directory
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::List { all } => cmd_list(&cfg_dir, all),
        Commands::Toggle { bill } => cmd_toggle(&cfg_dir, &bill),
        Commands::Show { bill } => cmd_show(&cfg_dir, &bill),
        Commands::Pay {
            bill,
            amount,
            date,
            method,
            reference,
            notes,
        } => cmd_pay(&cfg_dir, &bill, amount, date, method, reference, notes),
        Commands::Payments { bill } => cmd_payments(&cfg_dir, &bill),
        Commands::Send { bill } => cmd_send(&cfg_dir, &bill),
        Commands::Edit {
            bill,
            covers,
            due_date,
            notes,
        } => cmd_edit(&cfg_dir, &bill, covers, due_date, notes),
        Commands::Orphans => cmd_orphans(&cfg_dir),
        Commands::Export { output } => cmd_export(&cfg_dir, output),
        Commands::Status => cmd_status(&cfg_dir),
    }
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &PathBuf) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(BillError::AlreadyInitialized(cfg_dir.clone()));
    }

    // Create directories
    fs::create_dir_all(cfg_dir)?;
    fs::create_dir_all(cfg_dir.join("export"))?;

    // Write template files
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;
    fs::write(cfg_dir.join("vendor_bills.toml"), VENDOR_BILLS_TEMPLATE)?;
    fs::write(cfg_dir.join("company_bills.toml"), COMPANY_BILLS_TEMPLATE)?;

    println!("Initialized billmatch config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit your company details:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!(
        "  2. Record vendor bills:        $EDITOR {}/vendor_bills.toml",
        cfg_dir.display()
    );
    println!(
        "  3. Record company bills:       $EDITOR {}/company_bills.toml",
        cfg_dir.display()
    );
    println!();
    println!("Then review the reconciliation:");
    println!("  billmatch list");

    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct BillRow {
    #[tabled(rename = "")]
    marker: String,
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "SUPPLIER")]
    supplier: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "MATCH")]
    matched: String,
}

#[derive(Tabled)]
struct OrphanRow {
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "SUPPLIER")]
    supplier: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
    #[tabled(rename = "PO")]
    po: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

#[derive(Tabled)]
struct PaymentRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
    #[tabled(rename = "METHOD")]
    method: String,
    #[tabled(rename = "REFERENCE")]
    reference: String,
}

fn format_whole_money(value: f64, currency_symbol: &str) -> String {
    let rounded = value.round() as i64;
    let grouped = format_grouped_int(rounded);
    format!("{}{:>6}", currency_symbol, grouped)
}

fn format_grouped_int(value: i64) -> String {
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    let mut grouped: String = out.chars().rev().collect();
    if negative {
        grouped.insert(0, '-');
    }
    grouped
}

fn add_financial_footer(table: &str, total: &str, paid: &str, outstanding: &str) -> String {
    // AMOUNT sits in this column of the list table; everything to its
    // left merges into the label cell, everything to its right closes off.
    const VALUE_COLUMN: usize = 4;

    let lines: Vec<&str> = table.lines().collect();
    if lines.len() < 4 {
        return table.to_string();
    }

    // Parse the top border to discover column widths
    let top = lines[0];
    let Some(inner) = top.strip_prefix('╭').and_then(|s| s.strip_suffix('╮')) else {
        return table.to_string();
    };

    let widths: Vec<usize> = inner.split('┬').map(|p| p.chars().count()).collect();
    if widths.len() <= VALUE_COLUMN + 1 {
        return table.to_string();
    }

    let left = &widths[..VALUE_COLUMN];
    let left_width = left.iter().sum::<usize>() + left.len() - 1; // separators become spaces
    let value_width = widths[VALUE_COLUMN];
    let tail = &widths[VALUE_COLUMN + 1..];

    let rows = [
        ("TOTAL", total),
        ("(-) PAID", paid),
        ("(=) OUTSTANDING", outstanding),
    ];

    // Strip the original bottom border and start building
    let mut out = lines[..lines.len() - 1].join("\n");
    out.push('\n');

    // First separator: merge the label columns, keep AMOUNT, close off the rest
    let left_border = left
        .iter()
        .map(|w| "─".repeat(*w))
        .collect::<Vec<_>>()
        .join("┴");
    let tail_border = tail
        .iter()
        .map(|w| "─".repeat(*w))
        .collect::<Vec<_>>()
        .join("┴");
    out.push_str(&format!(
        "├{}┼{}┼{}╯\n",
        left_border,
        "─".repeat(value_width),
        tail_border,
    ));

    // Summary rows with separators between them
    for (idx, (label, value)) in rows.iter().enumerate() {
        out.push_str(&format!(
            "│ {:>left$} │ {:>value$} │\n",
            label,
            value,
            left = left_width - 2,
            value = value_width - 2
        ));
        if idx < rows.len() - 1 {
            out.push_str(&format!(
                "├{}┼{}┤\n",
                "─".repeat(left_width),
                "─".repeat(value_width)
            ));
        }
    }

    // Bottom border
    out.push_str(&format!(
        "╰{}┴{}╯",
        "─".repeat(left_width),
        "─".repeat(value_width)
    ));

    out
}

/// Fetch the current exchange rate from the Frankfurter API. Returns
/// None on any failure (network, timeout, parse error) so the caller
/// can silently skip the converted line.
fn fetch_fx_rate(base: &str, symbol: &str) -> Option<f64> {
    use std::time::Duration;
    use ureq::Agent;

    let agent: Agent = Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(3)))
        .build()
        .into();

    let url = format!("https://api.frankfurter.dev/v1/latest?base={base}&symbols={symbol}");
    let body: String = agent
        .get(&url)
        .call()
        .ok()?
        .body_mut()
        .read_to_string()
        .ok()?;

    let json: serde_json::Value = serde_json::from_str(&body).ok()?;
    json["rates"][symbol].as_f64()
}

/// Resolve a vendor bill reference to its index. Accepts the bill id
/// or the invoice number; a reference that matches two different bills
/// is rejected instead of silently resolving to the first.
fn resolve_vendor_bill(bills: &[VendorBill], reference: &str) -> Result<usize> {
    let mut hits = bills
        .iter()
        .enumerate()
        .filter(|(_, b)| b.id == reference || b.invoice_number == reference)
        .map(|(idx, _)| idx);
    let first = hits
        .next()
        .ok_or_else(|| BillError::VendorBillNotFound(reference.to_string()))?;
    if hits.next().is_some() {
        return Err(BillError::AmbiguousBill(reference.to_string()));
    }
    Ok(first)
}

fn resolve_company_bill(bills: &[CompanyBill], reference: &str) -> Result<usize> {
    let mut hits = bills
        .iter()
        .enumerate()
        .filter(|(_, b)| b.id == reference || b.invoice_number == reference)
        .map(|(idx, _)| idx);
    let first = hits
        .next()
        .ok_or_else(|| BillError::CompanyBillNotFound(reference.to_string()))?;
    if hits.next().is_some() {
        return Err(BillError::AmbiguousBill(reference.to_string()));
    }
    Ok(first)
}

fn parse_date(value: &str) -> Result<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| BillError::InvalidDate(value.to_string()))
}

fn orphan_rows(orphans: &[&CompanyBill], currency_symbol: &str) -> Vec<OrphanRow> {
    orphans
        .iter()
        .map(|bill| OrphanRow {
            number: bill.invoice_number.clone(),
            supplier: bill.supplier.clone(),
            date: bill.invoice_date.to_string(),
            amount: format_whole_money(bill.invoice_amount, currency_symbol),
            po: bill
                .order_number
                .clone()
                .or_else(|| bill.purchase_order_id.clone())
                .unwrap_or_else(|| "-".to_string()),
            status: bill.bill_status.to_string().to_uppercase(),
        })
        .collect()
}

/// List vendor bill groups with reconciliation verdicts
fn cmd_list(cfg_dir: &PathBuf, all: bool) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(BillError::ConfigNotFound(cfg_dir.clone()));
    }

    let config = load_config(cfg_dir)?;
    let mut vendor_bills = load_vendor_bills(cfg_dir)?;
    let company_bills = load_company_bills(cfg_dir)?;
    let today = chrono::Local::now().date_naive();
    refresh_all(&mut vendor_bills, today);
    let state = load_state(cfg_dir)?;

    if vendor_bills.is_empty() && company_bills.is_empty() {
        println!("No bills recorded yet.");
        println!(
            "Add bills to: {}/vendor_bills.toml and company_bills.toml",
            cfg_dir.display()
        );
        return Ok(());
    }

    let grouping = group(&vendor_bills, &company_bills);
    let symbol = &config.billing.currency_symbol;

    if !grouping.groups.is_empty() {
        let mut rows: Vec<BillRow> = Vec::new();
        for grp in &grouping.groups {
            let has_children = !grp.children.is_empty();
            let expanded = all || state.is_expanded(&grp.bill.id);
            // Childless groups get no marker at all, not a disabled one.
            let marker = match (has_children, expanded) {
                (false, _) => "",
                (true, true) => "-",
                (true, false) => "+",
            };
            rows.push(BillRow {
                marker: marker.to_string(),
                number: grp.bill.invoice_number.clone(),
                supplier: grp.bill.supplier.clone(),
                date: grp.bill.invoice_date.to_string(),
                amount: format_whole_money(grp.bill.invoice_amount, symbol),
                status: grp.bill.payment_status.to_string().to_uppercase(),
                matched: classify(Some(&grp.reconciliation)).to_string(),
            });
            if has_children && expanded {
                for child in &grp.children {
                    rows.push(BillRow {
                        marker: String::new(),
                        number: format!("└ {}", child.invoice_number),
                        supplier: child.supplier.clone(),
                        date: child.invoice_date.to_string(),
                        amount: format_whole_money(child.invoice_amount, symbol),
                        status: child.bill_status.to_string().to_uppercase(),
                        matched: classify(None).to_string(),
                    });
                }
            }
        }

        // Financial summary covers vendor bills only; company bills are
        // the other side of the same money.
        let total: f64 = vendor_bills.iter().map(|b| b.invoice_amount).sum();
        let paid: f64 = vendor_bills.iter().map(|b| b.paid_amount).sum();
        let outstanding = total - paid;

        let table = Table::new(rows).with(Style::rounded()).to_string();
        let table = add_financial_footer(
            &table,
            &format_whole_money(total, symbol),
            &format_whole_money(paid, symbol),
            &format_whole_money(outstanding, symbol),
        );
        println!("{table}");

        println!();
        println!(
            "Total: {} vendor bills, {} company bills",
            vendor_bills.len(),
            company_bills.len()
        );

        // Show the outstanding amount converted if an fx currency is set
        if outstanding > 0.0 {
            if let Some(fx) = &config.billing.fx_currency {
                if let Some(rate) = fetch_fx_rate(&config.billing.currency, fx) {
                    let converted = (outstanding * rate).round() as i64;
                    println!(
                        "Outstanding in {}: {} (1 {} = {:.2} {})",
                        fx,
                        format_grouped_int(converted),
                        config.billing.currency,
                        rate,
                        fx
                    );
                }
            }
        }
    } else {
        println!("No vendor bills recorded yet.");
    }

    if !grouping.orphans.is_empty() {
        println!();
        println!("Orphaned company bills (no covering vendor bill):");
        let table = Table::new(orphan_rows(&grouping.orphans, symbol))
            .with(Style::rounded())
            .to_string();
        println!("{table}");
    }

    if !all && !grouping.groups.is_empty() {
        println!("Expand a group with 'billmatch toggle <bill>' (or pass --all)");
    }

    Ok(())
}

/// Expand or collapse one vendor bill group
fn cmd_toggle(cfg_dir: &PathBuf, bill_ref: &str) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(BillError::ConfigNotFound(cfg_dir.clone()));
    }

    let vendor_bills = load_vendor_bills(cfg_dir)?;
    let company_bills = load_company_bills(cfg_dir)?;
    let idx = resolve_vendor_bill(&vendor_bills, bill_ref)?;
    let bill_id = vendor_bills[idx].id.clone();

    // One group per vendor bill, in input order
    let grouping = group(&vendor_bills, &company_bills);
    let children = grouping.groups[idx].children.len();
    if children == 0 {
        return Err(BillError::NothingToExpand(bill_id));
    }

    let mut state = load_state(cfg_dir)?;
    let expanded = state.toggle(&bill_id);
    save_state(cfg_dir, &state)?;

    if expanded {
        println!("Expanded {} ({} company bills)", bill_id, children);
    } else {
        println!("Collapsed {}", bill_id);
    }

    Ok(())
}

fn describe_vendor_actions(actions: VendorActions) -> String {
    let mut parts = Vec::new();
    if actions.record_payment {
        parts.push("pay");
    }
    if actions.edit {
        parts.push("edit");
    }
    if actions.view_details {
        parts.push("show");
    }
    parts.join(", ")
}

fn describe_company_actions(actions: CompanyActions) -> String {
    let mut parts = Vec::new();
    if actions.mark_sent {
        parts.push("send");
    }
    if actions.view_details {
        parts.push("show");
    }
    parts.join(", ")
}

/// Show full details for one bill
fn cmd_show(cfg_dir: &PathBuf, bill_ref: &str) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(BillError::ConfigNotFound(cfg_dir.clone()));
    }

    let config = load_config(cfg_dir)?;
    let mut vendor_bills = load_vendor_bills(cfg_dir)?;
    let company_bills = load_company_bills(cfg_dir)?;
    refresh_all(&mut vendor_bills, chrono::Local::now().date_naive());
    let grouping = group(&vendor_bills, &company_bills);
    let symbol = &config.billing.currency_symbol;

    let vendor_idx = match resolve_vendor_bill(&vendor_bills, bill_ref) {
        Ok(idx) => Some(idx),
        Err(BillError::VendorBillNotFound(_)) => None,
        Err(e) => return Err(e),
    };
    let company_idx = match resolve_company_bill(&company_bills, bill_ref) {
        Ok(idx) => Some(idx),
        Err(BillError::CompanyBillNotFound(_)) => None,
        Err(e) => return Err(e),
    };
    if vendor_idx.is_some() && company_idx.is_some() {
        return Err(BillError::AmbiguousBill(bill_ref.to_string()));
    }

    if let Some(idx) = vendor_idx {
        let grp = &grouping.groups[idx];
        let bill = grp.bill;
        let status = classify(Some(&grp.reconciliation));

        println!("Vendor bill {} ({})", bill.invoice_number, bill.id);
        println!("{}", "-".repeat(50));
        println!("Supplier:     {}", bill.supplier);
        println!("Date:         {}", bill.invoice_date);
        if let Some(due) = bill.due_date {
            println!("Due:          {}", due);
        }
        println!("Amount:       {}{:.2}", symbol, bill.invoice_amount);
        println!("Paid:         {}{:.2}", symbol, bill.paid_amount);
        println!("Balance:      {}{:.2}", symbol, bill.balance_due());
        println!(
            "Status:       {}",
            bill.payment_status.to_string().to_uppercase()
        );
        println!("Match:        {} {}", status.style().icon, status);
        if let Some(notes) = &bill.notes {
            println!("Notes:        {notes}");
        }

        println!();
        if grp.reconciliation.covered_orders == 0 {
            println!("No linked company bills.");
        } else {
            println!(
                "Covers {} of {} purchase order(s):",
                grp.reconciliation.linked_bills, grp.reconciliation.covered_orders
            );
            for child in &grp.children {
                println!(
                    "  {} - {} - {}{:.2} ({})",
                    child.id, child.invoice_number, symbol, child.invoice_amount, child.bill_status
                );
            }
            // References without a child line: ids that resolve to
            // nothing, and ids an earlier vendor bill already claimed.
            for warning in &grouping.warnings {
                match warning {
                    DataWarning::UnresolvedReference {
                        vendor_bill_id,
                        company_bill_id,
                    } if vendor_bill_id == &bill.id => {
                        println!("  {} - no matching company bill", company_bill_id);
                    }
                    DataWarning::DuplicateReference {
                        company_bill_id,
                        kept_by,
                        dropped_from,
                    } if dropped_from == &bill.id && kept_by != dropped_from => {
                        println!("  {} - claimed by vendor bill '{}'", company_bill_id, kept_by);
                    }
                    _ => {}
                }
            }
        }

        println!();
        println!(
            "Actions: {}",
            describe_vendor_actions(vendor_actions(bill.payment_status))
        );
        return Ok(());
    }

    let Some(idx) = company_idx else {
        return Err(BillError::BillNotFound(bill_ref.to_string()));
    };
    let bill = &company_bills[idx];
    let parent = grouping
        .groups
        .iter()
        .find(|grp| grp.children.iter().any(|c| c.id == bill.id));

    println!("Company bill {} ({})", bill.invoice_number, bill.id);
    println!("{}", "-".repeat(50));
    println!("Supplier:     {}", bill.supplier);
    println!("Date:         {}", bill.invoice_date);
    println!("Amount:       {}{:.2}", symbol, bill.invoice_amount);
    if let Some(po) = bill.order_number.as_ref().or(bill.purchase_order_id.as_ref()) {
        println!("PO:           {}", po);
    }
    println!(
        "Status:       {}",
        bill.bill_status.to_string().to_uppercase()
    );
    match parent {
        Some(grp) => println!(
            "Covered by:   {} ({})",
            grp.bill.invoice_number, grp.bill.id
        ),
        None => println!("Covered by:   (no vendor bill - orphan)"),
    }
    if let Some(notes) = &bill.notes {
        println!("Notes:        {notes}");
    }

    println!();
    println!(
        "Actions: {}",
        describe_company_actions(company_actions(bill.bill_status))
    );

    Ok(())
}

/// Record a payment against a vendor bill
fn cmd_pay(
    cfg_dir: &PathBuf,
    bill_ref: &str,
    amount: f64,
    date_str: Option<String>,
    method: Option<String>,
    reference: Option<String>,
    notes: Option<String>,
) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(BillError::ConfigNotFound(cfg_dir.clone()));
    }

    let config = load_config(cfg_dir)?;
    let mut vendor_bills = load_vendor_bills(cfg_dir)?;
    let today = chrono::Local::now().date_naive();
    refresh_all(&mut vendor_bills, today);

    let idx = resolve_vendor_bill(&vendor_bills, bill_ref)?;

    // Action gate: fully paid bills accept no further payments
    if !vendor_actions(vendor_bills[idx].payment_status).record_payment {
        return Err(BillError::AlreadyPaid(vendor_bills[idx].id.clone()));
    }

    // Parse payment date (default to today)
    let date = match date_str {
        Some(s) => parse_date(&s)?,
        None => today,
    };

    let input = PaymentInput {
        amount,
        date,
        method,
        reference,
        notes,
    };
    let applied = record_payment(&vendor_bills[idx], &input)?;

    let bill = &mut vendor_bills[idx];
    bill.paid_amount += applied.amount;
    bill.payments.push(applied.into());
    bill.refresh_payment_status(today);

    let remaining = bill.balance_due();
    let number = bill.invoice_number.clone();

    save_vendor_bills(cfg_dir, &vendor_bills)?;

    // Print confirmation
    let symbol = &config.billing.currency_symbol;
    if remaining <= 0.001 {
        println!(
            "Recorded {}{:.2} payment for {} (fully paid)",
            symbol, amount, number
        );
    } else {
        println!(
            "Recorded {}{:.2} payment for {} ({}{:.2} remaining)",
            symbol, amount, number, symbol, remaining
        );
    }

    Ok(())
}

/// Show payment history for a vendor bill
fn cmd_payments(cfg_dir: &PathBuf, bill_ref: &str) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(BillError::ConfigNotFound(cfg_dir.clone()));
    }

    let config = load_config(cfg_dir)?;
    let mut vendor_bills = load_vendor_bills(cfg_dir)?;
    refresh_all(&mut vendor_bills, chrono::Local::now().date_naive());

    let idx = resolve_vendor_bill(&vendor_bills, bill_ref)?;
    let bill = &vendor_bills[idx];
    let symbol = &config.billing.currency_symbol;

    println!("Payments for {}", bill.invoice_number);

    if bill.payments.is_empty() {
        println!("  No payments recorded.");
    } else {
        let rows: Vec<PaymentRow> = bill
            .payments
            .iter()
            .enumerate()
            .map(|(idx, p)| PaymentRow {
                index: idx + 1,
                date: p.date.to_string(),
                amount: format!("{}{:.2}", symbol, p.amount),
                method: p.method.clone().unwrap_or_else(|| "-".to_string()),
                reference: p.reference.clone().unwrap_or_else(|| "-".to_string()),
            })
            .collect();

        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{table}");
    }

    println!(
        "Total paid: {}{:.2} / {}{:.2} (Status: {})",
        symbol,
        bill.paid_amount,
        symbol,
        bill.invoice_amount,
        bill.payment_status.to_string().to_uppercase()
    );

    Ok(())
}

/// Mark a company bill as sent
fn cmd_send(cfg_dir: &PathBuf, bill_ref: &str) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(BillError::ConfigNotFound(cfg_dir.clone()));
    }

    let mut company_bills = load_company_bills(cfg_dir)?;
    let idx = resolve_company_bill(&company_bills, bill_ref)?;

    // Action gate: sending is a one-way, one-time transition
    if !company_actions(company_bills[idx].bill_status).mark_sent {
        return Err(BillError::AlreadySent(company_bills[idx].id.clone()));
    }

    company_bills[idx].bill_status = BillStatus::Sent;
    let number = company_bills[idx].invoice_number.clone();

    save_company_bills(cfg_dir, &company_bills)?;

    println!("Marked {} as sent", number);

    Ok(())
}

/// Edit a vendor bill's covers list, due date, or notes
fn cmd_edit(
    cfg_dir: &PathBuf,
    bill_ref: &str,
    covers: Option<Vec<String>>,
    due_date: Option<String>,
    notes: Option<String>,
) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(BillError::ConfigNotFound(cfg_dir.clone()));
    }

    let mut vendor_bills = load_vendor_bills(cfg_dir)?;
    let today = chrono::Local::now().date_naive();
    refresh_all(&mut vendor_bills, today);

    let idx = resolve_vendor_bill(&vendor_bills, bill_ref)?;

    // Action gate: paid bills are settled history
    if !vendor_actions(vendor_bills[idx].payment_status).edit {
        return Err(BillError::AlreadyPaid(vendor_bills[idx].id.clone()));
    }

    if covers.is_none() && due_date.is_none() && notes.is_none() {
        println!("Nothing to change for {}.", vendor_bills[idx].id);
        println!("Pass --covers, --due-date, or --notes.");
        return Ok(());
    }

    let parsed_due = due_date.map(|s| parse_date(&s)).transpose()?;

    let bill = &mut vendor_bills[idx];
    if let Some(covers) = covers {
        bill.covers = covers;
    }
    if let Some(due) = parsed_due {
        bill.due_date = Some(due);
    }
    if let Some(notes) = notes {
        bill.notes = Some(notes);
    }
    // A new due date can flip the bill to or from overdue
    bill.refresh_payment_status(today);

    let id = bill.id.clone();
    let covers_view = bill.covers.join(", ");

    save_vendor_bills(cfg_dir, &vendor_bills)?;

    println!("Updated {}", id);
    if covers_view.is_empty() {
        println!("  Covers: (none)");
    } else {
        println!("  Covers: {}", covers_view);
    }

    Ok(())
}

/// List company bills no vendor bill covers
fn cmd_orphans(cfg_dir: &PathBuf) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(BillError::ConfigNotFound(cfg_dir.clone()));
    }

    let config = load_config(cfg_dir)?;
    let vendor_bills = load_vendor_bills(cfg_dir)?;
    let company_bills = load_company_bills(cfg_dir)?;
    let grouping = group(&vendor_bills, &company_bills);

    if grouping.orphans.is_empty() {
        println!("No orphaned company bills.");
        return Ok(());
    }

    let table = Table::new(orphan_rows(&grouping.orphans, &config.billing.currency_symbol))
        .with(Style::rounded())
        .to_string();
    println!("{table}");

    println!();
    println!("Total: {} orphaned company bills", grouping.orphans.len());

    Ok(())
}

/// Export all bills to CSV
fn cmd_export(cfg_dir: &PathBuf, output: Option<PathBuf>) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(BillError::ConfigNotFound(cfg_dir.clone()));
    }

    let config = load_config(cfg_dir)?;
    let mut vendor_bills = load_vendor_bills(cfg_dir)?;
    let company_bills = load_company_bills(cfg_dir)?;
    let today = chrono::Local::now().date_naive();
    refresh_all(&mut vendor_bills, today);

    let grouping = group(&vendor_bills, &company_bills);
    let rows = export_rows(&grouping);

    // Determine output path
    let path = match output {
        Some(p) => {
            if let Some(parent) = p.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            p
        }
        None => {
            let dir = config::resolve_output_dir(&config.export.output_dir, cfg_dir);
            std::fs::create_dir_all(&dir)?;
            dir.join(export_filename(today))
        }
    };

    let file = std::fs::File::create(&path)?;
    write_csv(file, &rows)?;

    println!("Exported {} rows", rows.len());
    println!("  Vendor bills:  {}", grouping.groups.len());
    println!("  Company bills: {}", company_bills.len());
    println!("  Saved: {}", path.display());

    Ok(())
}

/// Show store summary and data warnings
fn cmd_status(cfg_dir: &PathBuf) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(BillError::ConfigNotFound(cfg_dir.clone()));
    }

    let config = load_config(cfg_dir)?;
    let mut vendor_bills = load_vendor_bills(cfg_dir)?;
    let company_bills = load_company_bills(cfg_dir)?;
    refresh_all(&mut vendor_bills, chrono::Local::now().date_naive());

    let grouping = group(&vendor_bills, &company_bills);

    let mut matched = 0;
    let mut mismatched = 0;
    let mut pending = 0;
    for grp in &grouping.groups {
        match classify(Some(&grp.reconciliation)) {
            MatchStatus::Matched => matched += 1,
            MatchStatus::Mismatch { .. } => mismatched += 1,
            MatchStatus::Pending { .. } => pending += 1,
            MatchStatus::Info => {}
        }
    }

    let outstanding: f64 = vendor_bills.iter().map(|b| b.balance_due()).sum();

    println!("Bill Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", cfg_dir.display());
    println!("Company:          {}", config.company.name);
    println!("Vendor bills:     {}", vendor_bills.len());
    println!("Company bills:    {}", company_bills.len());
    println!("Matched:          {}", matched);
    println!("Mismatched:       {}", mismatched);
    println!("Pending:          {}", pending);
    println!("Orphans:          {}", grouping.orphans.len());
    println!(
        "Outstanding:      {}{:.2}",
        config.billing.currency_symbol, outstanding
    );

    println!();
    if grouping.warnings.is_empty() {
        println!("No data warnings.");
    } else {
        println!("Data warnings:");
        for warning in &grouping.warnings {
            println!("  - {warning}");
        }
    }

    Ok(())
}
