use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::utils::money::Money;

pub const DEFAULT_PAYMENT_METHOD: &str = "bank/mobile";

crate::string_enum! {
    pub enum InvoiceStatus {
        Unpaid => "unpaid",
        Partial => "partial",
        Paid => "paid",
        PendingVerification => "pending_verification",
    }
}

impl InvoiceStatus {
    /// Status implied by the payments recorded so far.
    pub fn from_payments(total: Money, paid: Money) -> Self {
        if paid >= total {
            InvoiceStatus::Paid
        } else if paid.is_positive() {
            InvoiceStatus::Partial
        } else {
            InvoiceStatus::Unpaid
        }
    }

    /// Like [`from_payments`](Self::from_payments), but an invoice that is not
    /// fully paid stays awaiting verification while a proof is unverified.
    pub fn settle(total: Money, paid: Money, awaiting_proof: bool) -> Self {
        match Self::from_payments(total, paid) {
            InvoiceStatus::Paid => InvoiceStatus::Paid,
            _ if awaiting_proof => InvoiceStatus::PendingVerification,
            status => status,
        }
    }

    /// Unpaid, partial or awaiting verification.
    pub fn is_outstanding(&self) -> bool {
        !matches!(self, InvoiceStatus::Paid)
    }

    /// Eligible for fee reminders and overdue counts.
    pub fn is_collectable(&self) -> bool {
        matches!(self, InvoiceStatus::Unpaid | InvoiceStatus::Partial)
    }
}

/// Amount still owed, never negative.
pub fn remaining_balance(total: Money, paid: Money) -> Money {
    (total - paid).non_negative()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeeStructure {
    pub id: i64,
    pub name: String,
    pub grade: String,
    pub amount: Money,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeeInvoice {
    pub id: i64,
    pub student_id: i64,
    pub parent_id: Option<i64>,
    pub fee_structure_id: i64,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub total_amount: Money,
    pub status: InvoiceStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub id: i64,
    pub invoice_id: i64,
    pub payment_date: NaiveDate,
    pub amount: Money,
    pub method: String,
    pub reference: String,
    pub recorded_by: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Uploaded proof of payment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentProof {
    pub id: i64,
    pub invoice_id: i64,
    pub uploaded_by: i64,
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing, default)]
    pub stored_name: String,
    pub original_name: String,
    pub content_type: String,
    pub file_size: i64,
    pub note: String,
    pub verified: bool,
    pub verified_at: Option<chrono::DateTime<chrono::Utc>>,
    pub verified_by: Option<i64>,
}

/// Invoice with student, fee structure and payment totals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvoiceRow {
    #[serde(flatten)]
    pub invoice: FeeInvoice,
    pub student_code: String,
    pub student_name: String,
    pub fee_structure_name: String,
    pub paid: Money,
    pub balance: Money,
}

/// Latest-invoice summary shown on the student dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvoiceSnapshot {
    pub id: i64,
    pub status: InvoiceStatus,
    pub total: Money,
    pub paid: Money,
    pub balance: Money,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProofQueueRow {
    #[serde(flatten)]
    pub proof: PaymentProof,
    pub student_code: String,
    pub student_name: String,
    pub invoice_total: Money,
    pub invoice_status: InvoiceStatus,
    pub uploaded_by_username: String,
}

/// Overdue invoice with the contact details needed to chase it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderTarget {
    pub invoice_id: i64,
    pub total: Money,
    pub due_date: NaiveDate,
    pub student_code: String,
    pub student_first_name: String,
    pub student_last_name: String,
    pub parent_id: Option<i64>,
    pub parent_email: Option<String>,
    pub parent_phone: Option<String>,
}

impl ReminderTarget {
    pub fn message(&self) -> String {
        format!(
            "School Fees Reminder: {} {} (ID {}) outstanding invoice #{}. Amount {}. Due {}.",
            self.student_first_name,
            self.student_last_name,
            self.student_code,
            self.invoice_id,
            self.total,
            self.due_date
        )
    }
}

/// Invoice counts and sums for dashboards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinanceStats {
    pub invoices_total: u64,
    pub paid: u64,
    /// Anything not yet paid.
    pub outstanding: u64,
    pub pending_verification: u64,
    /// Unpaid or partial and past due.
    pub overdue: u64,
    pub invoiced_sum: Money,
    pub paid_sum: Money,
    /// Sum of remaining balances.
    pub outstanding_sum: Money,
}

#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    pub payment: Payment,
    pub status: InvoiceStatus,
    pub paid_sum: Money,
    pub remaining: Money,
}

#[derive(Debug, Clone)]
pub struct VerifyOutcome {
    pub proof: PaymentProof,
    pub payment: Option<Payment>,
    pub status: InvoiceStatus,
    pub remaining: Money,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_payments() {
        let total = Money::from_cents(10000);
        assert_eq!(
            InvoiceStatus::from_payments(total, Money::ZERO),
            InvoiceStatus::Unpaid
        );
        assert_eq!(
            InvoiceStatus::from_payments(total, Money::from_cents(2500)),
            InvoiceStatus::Partial
        );
        assert_eq!(
            InvoiceStatus::from_payments(total, Money::from_cents(10000)),
            InvoiceStatus::Paid
        );
        assert_eq!(
            InvoiceStatus::from_payments(total, Money::from_cents(12000)),
            InvoiceStatus::Paid
        );
    }

    #[test]
    fn test_remaining_balance_floors_at_zero() {
        let total = Money::from_cents(5000);
        assert_eq!(remaining_balance(total, Money::from_cents(2000)).cents(), 3000);
        assert_eq!(remaining_balance(total, Money::from_cents(9000)), Money::ZERO);
    }

    #[test]
    fn test_reminder_message() {
        let target = ReminderTarget {
            invoice_id: 7,
            total: Money::from_cents(15000),
            due_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            student_code: "BB001".to_string(),
            student_first_name: "Rudo".to_string(),
            student_last_name: "Ncube".to_string(),
            parent_id: None,
            parent_email: None,
            parent_phone: None,
        };
        assert_eq!(
            target.message(),
            "School Fees Reminder: Rudo Ncube (ID BB001) outstanding invoice #7. Amount 150.00. Due 2025-02-01."
        );
    }

    #[test]
    fn test_pending_verification_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&InvoiceStatus::PendingVerification).unwrap(),
            "\"pending_verification\""
        );
        assert!(InvoiceStatus::PendingVerification.is_outstanding());
        assert!(!InvoiceStatus::PendingVerification.is_collectable());
    }
}
