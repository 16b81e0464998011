use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RateLimit, RequirePermission};
use crate::models::finance::requests::{
    CreateFeeStructureRequest, CreateInvoiceRequest, FeeReminderRequest, ProofQueueQuery,
    RecordPaymentRequest, VerifyProofRequest,
};
use crate::models::rbac::entities::perms;
use crate::models::users::entities::UserRole;
use crate::services::FinanceService;
use crate::utils::SafeIDI64;

static FINANCE_SERVICE: Lazy<FinanceService> = Lazy::new(FinanceService::new_lazy);

pub async fn list_fee_structures(req: HttpRequest) -> ActixResult<HttpResponse> {
    FINANCE_SERVICE.list_fee_structures(&req).await
}

pub async fn create_fee_structure(
    req: HttpRequest,
    body: web::Json<CreateFeeStructureRequest>,
) -> ActixResult<HttpResponse> {
    FINANCE_SERVICE
        .create_fee_structure(body.into_inner(), &req)
        .await
}

pub async fn create_invoice(
    req: HttpRequest,
    body: web::Json<CreateInvoiceRequest>,
) -> ActixResult<HttpResponse> {
    FINANCE_SERVICE.create_invoice(body.into_inner(), &req).await
}

pub async fn my_fees(req: HttpRequest) -> ActixResult<HttpResponse> {
    FINANCE_SERVICE.my_fees(&req).await
}

pub async fn invoice_detail(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    FINANCE_SERVICE.invoice_detail(id.0, &req).await
}

pub async fn record_payment(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<RecordPaymentRequest>,
) -> ActixResult<HttpResponse> {
    FINANCE_SERVICE
        .record_payment(id.0, body.into_inner(), &req)
        .await
}

pub async fn upload_pop(
    req: HttpRequest,
    id: SafeIDI64,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    FINANCE_SERVICE.upload_pop(id.0, payload, &req).await
}

pub async fn verification_queue(
    req: HttpRequest,
    query: web::Query<ProofQueueQuery>,
) -> ActixResult<HttpResponse> {
    FINANCE_SERVICE
        .verification_queue(query.into_inner(), &req)
        .await
}

pub async fn verify_proof(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<VerifyProofRequest>,
) -> ActixResult<HttpResponse> {
    FINANCE_SERVICE
        .verify_proof(id.0, body.into_inner(), &req)
        .await
}

pub async fn download_proof(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    FINANCE_SERVICE.download_proof(id.0, &req).await
}

pub async fn send_fee_reminders(
    req: HttpRequest,
    body: web::Json<FeeReminderRequest>,
) -> ActixResult<HttpResponse> {
    FINANCE_SERVICE
        .send_fee_reminders(body.into_inner(), &req)
        .await
}

pub fn configure_finance_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/finance")
            .wrap(middlewares::RequireJWT)
            .route("/fee-structures", web::get().to(list_fee_structures))
            .route("/invoices/mine", web::get().to(my_fees))
            .service(
                web::resource("/invoices")
                    .wrap(RequirePermission::new(perms::CREATE_INVOICE))
                    .route(web::post().to(create_invoice)),
            )
            .route("/invoices/{id}", web::get().to(invoice_detail))
            .service(
                web::resource("/invoices/{id}/payments")
                    .wrap(RequirePermission::new(perms::RECORD_PAYMENT))
                    .route(web::post().to(record_payment)),
            )
            .service(
                web::resource("/invoices/{id}/proofs")
                    .wrap(RateLimit::file_upload())
                    .route(web::post().to(upload_pop)),
            )
            .service(
                web::resource("/proofs")
                    .wrap(RequirePermission::new(perms::VERIFY_POP))
                    .route(web::get().to(verification_queue)),
            )
            .service(
                web::resource("/proofs/{id}/verify")
                    .wrap(RequirePermission::new(perms::VERIFY_POP))
                    .route(web::post().to(verify_proof)),
            )
            .route("/proofs/{id}/file", web::get().to(download_proof))
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
                    .route("/fee-structures", web::post().to(create_fee_structure))
                    .route("/reminders", web::post().to(send_fee_reminders)),
            ),
    );
}
