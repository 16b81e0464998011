use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::FinanceService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    finance::{
        entities::DEFAULT_PAYMENT_METHOD,
        requests::{NewPayment, RecordPaymentRequest},
        responses::PaymentResponse,
    },
};
use crate::services::access::{bad_request, not_found};
use crate::utils::dates::today;

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub async fn record_payment(
    service: &FinanceService,
    invoice_id: i64,
    body: RecordPaymentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    if !body.amount.is_positive() {
        return Ok(bad_request(ErrorCode::BadRequest, "Amount must be greater than zero"));
    }
    let storage = service.get_storage(request);

    if storage.get_invoice(invoice_id).await?.is_none() {
        return Ok(not_found(ErrorCode::InvoiceNotFound, "Invoice not found"));
    }

    let outcome = storage
        .record_payment(NewPayment {
            invoice_id,
            payment_date: body.payment_date.unwrap_or_else(today),
            amount: body.amount,
            method: non_blank(body.method).unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string()),
            reference: non_blank(body.reference).unwrap_or_default(),
            recorded_by: Some(user.id),
        })
        .await?;
    tracing::info!(
        "Payment of {} recorded on invoice {} by user {}; status now {}",
        body.amount,
        invoice_id,
        user.id,
        outcome.status
    );

    Ok(HttpResponse::Created().json(ApiResponse::success(
        PaymentResponse {
            payment: outcome.payment,
            invoice_status: outcome.status,
            paid_sum: outcome.paid_sum,
            remaining: outcome.remaining,
        },
        "Payment recorded",
    )))
}
