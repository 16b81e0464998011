use chrono::NaiveDate;
use serde::Deserialize;

use crate::utils::money::Money;

#[derive(Debug, Deserialize)]
pub struct CreateFeeStructureRequest {
    pub name: String,
    #[serde(default)]
    pub grade: String,
    pub amount: Money,
}

#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    /// Student code, not the row id.
    pub student_id: String,
    pub fee_structure_id: i64,
    pub due_date: NaiveDate,
    /// Defaults to the fee structure amount.
    pub total_amount: Option<Money>,
    pub parent_username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    pub amount: Money,
    pub method: Option<String>,
    pub reference: Option<String>,
    pub payment_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProofQueueQuery {
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VerifyProofRequest {
    /// Defaults to the remaining balance.
    pub amount: Option<Money>,
    pub method: Option<String>,
    pub reference: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeeReminderRequest {
    pub days_overdue: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub student_id: i64,
    pub parent_id: Option<i64>,
    pub fee_structure_id: i64,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub total_amount: Money,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub invoice_id: i64,
    pub payment_date: NaiveDate,
    pub amount: Money,
    pub method: String,
    pub reference: String,
    pub recorded_by: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewProof {
    pub invoice_id: i64,
    pub uploaded_by: i64,
    pub stored_name: String,
    pub original_name: String,
    pub content_type: String,
    pub file_size: i64,
    pub note: String,
}
