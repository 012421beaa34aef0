use chrono::NaiveDate;
use thiserror::Error;

use crate::config::bills::{PaymentRecord, VendorBill};

/// Slack used when comparing a payment against the remaining balance,
/// so a payoff computed from the displayed two-decimal figures is not
/// rejected over a float rounding residue.
const PAYMENT_EPSILON: f64 = 0.001;

#[derive(Debug, Error, PartialEq)]
pub enum PaymentError {
    #[error("Payment amount must be a positive number")]
    InvalidAmount,
    #[error("Payment of {amount:.2} exceeds the remaining balance of {available:.2}")]
    ExceedsBalance { amount: f64, available: f64 },
}

/// A payment as requested by the caller, before validation.
#[derive(Debug, Clone)]
pub struct PaymentInput {
    pub amount: f64,
    pub date: NaiveDate,
    pub method: Option<String>,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

/// A payment that passed validation. The caller applies it to the bill
/// and persists; nothing here mutates the store.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedPayment {
    pub amount: f64,
    pub date: NaiveDate,
    pub method: Option<String>,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

impl From<AppliedPayment> for PaymentRecord {
    fn from(applied: AppliedPayment) -> Self {
        PaymentRecord {
            amount: applied.amount,
            date: applied.date,
            method: applied.method,
            reference: applied.reference,
            notes: applied.notes,
        }
    }
}

/// Validates a payment against the bill's remaining balance, not its
/// face amount: partially paid bills only accept what is still owed.
pub fn record_payment(
    bill: &VendorBill,
    input: &PaymentInput,
) -> Result<AppliedPayment, PaymentError> {
    if !input.amount.is_finite() || input.amount <= 0.0 {
        return Err(PaymentError::InvalidAmount);
    }

    let available = bill.balance_due();
    if input.amount > available + PAYMENT_EPSILON {
        return Err(PaymentError::ExceedsBalance {
            amount: input.amount,
            available,
        });
    }

    Ok(AppliedPayment {
        amount: input.amount,
        date: input.date,
        method: input.method.clone(),
        reference: input.reference.clone(),
        notes: input.notes.clone(),
    })
}
