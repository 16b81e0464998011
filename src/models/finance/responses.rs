use chrono::NaiveDate;
use serde::Serialize;

use super::entities::{
    FeeStructure, InvoiceRow, InvoiceStatus, Payment, PaymentProof, ProofQueueRow,
};
use crate::utils::money::Money;

#[derive(Debug, Serialize)]
pub struct FeeStructureListResponse {
    pub items: Vec<FeeStructure>,
}

#[derive(Debug, Serialize)]
pub struct MyFeesResponse {
    pub items: Vec<InvoiceRow>,
    pub total_due: Money,
    pub paid_count: usize,
    pub pending_count: usize,
}

#[derive(Debug, Serialize)]
pub struct InvoiceDetailResponse {
    pub invoice: InvoiceRow,
    pub payments: Vec<Payment>,
    pub proofs: Vec<PaymentProof>,
    pub paid_sum: Money,
    pub remaining: Money,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub payment: Payment,
    pub invoice_status: InvoiceStatus,
    pub paid_sum: Money,
    pub remaining: Money,
}

#[derive(Debug, Serialize)]
pub struct ProofResponse {
    pub proof: PaymentProof,
    pub invoice_status: InvoiceStatus,
}

#[derive(Debug, Serialize)]
pub struct ProofQueueResponse {
    pub items: Vec<ProofQueueRow>,
}

#[derive(Debug, Serialize)]
pub struct VerifyProofResponse {
    pub proof: PaymentProof,
    pub payment: Option<Payment>,
    pub invoice_status: InvoiceStatus,
    pub remaining: Money,
}

#[derive(Debug, Serialize)]
pub struct FeeReminderResponse {
    pub queued: usize,
    pub days_overdue: i64,
    pub cutoff: NaiveDate,
}
