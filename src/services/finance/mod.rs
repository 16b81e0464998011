pub mod fee_structures;
pub mod invoices;
pub mod payments;
pub mod proofs;
pub mod reminders;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::Result;
use crate::models::finance::requests::{
    CreateFeeStructureRequest, CreateInvoiceRequest, FeeReminderRequest, ProofQueueQuery,
    RecordPaymentRequest, VerifyProofRequest,
};
use crate::models::users::entities::{User, UserRole};
use crate::storage::Storage;

pub struct FinanceService {
    storage: Option<Arc<dyn Storage>>,
}

/// Finance staff, or a parent linked to the invoiced student.
pub(crate) async fn can_view_invoice(
    storage: &dyn Storage,
    user: &User,
    student_id: i64,
) -> Result<bool> {
    match user.role {
        UserRole::Principal | UserRole::Admin => Ok(true),
        UserRole::Parent => storage.is_guardian(user.id, student_id).await,
        UserRole::Teacher => Ok(false),
    }
}

impl FinanceService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub async fn list_fee_structures(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        fee_structures::list_fee_structures(self, request).await
    }

    pub async fn create_fee_structure(
        &self,
        body: CreateFeeStructureRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        fee_structures::create_fee_structure(self, body, request).await
    }

    pub async fn create_invoice(
        &self,
        body: CreateInvoiceRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        invoices::create_invoice(self, body, request).await
    }

    pub async fn my_fees(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        invoices::my_fees(self, request).await
    }

    pub async fn invoice_detail(
        &self,
        invoice_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        invoices::invoice_detail(self, invoice_id, request).await
    }

    pub async fn record_payment(
        &self,
        invoice_id: i64,
        body: RecordPaymentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        payments::record_payment(self, invoice_id, body, request).await
    }

    pub async fn upload_pop(
        &self,
        invoice_id: i64,
        payload: Multipart,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        proofs::upload_pop(self, invoice_id, payload, request).await
    }

    pub async fn verification_queue(
        &self,
        query: ProofQueueQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        proofs::verification_queue(self, query, request).await
    }

    pub async fn verify_proof(
        &self,
        proof_id: i64,
        body: VerifyProofRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        proofs::verify_proof(self, proof_id, body, request).await
    }

    pub async fn download_proof(
        &self,
        proof_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        proofs::download_proof(self, proof_id, request).await
    }

    pub async fn send_fee_reminders(
        &self,
        body: FeeReminderRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        reminders::send_fee_reminders(self, body, request).await
    }
}
