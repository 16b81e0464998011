use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{FinanceService, can_view_invoice};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    finance::{
        entities::{InvoiceRow, InvoiceStatus, remaining_balance},
        requests::{CreateInvoiceRequest, NewInvoice},
        responses::{InvoiceDetailResponse, MyFeesResponse},
    },
    users::entities::UserRole,
};
use crate::services::access::{ACCESS_DENIED, bad_request, forbidden, not_found};
use crate::utils::{Money, dates::today};

const MY_FEES_LIMIT: u64 = 200;

pub(crate) fn summarize(items: Vec<InvoiceRow>) -> MyFeesResponse {
    let total_due = items
        .iter()
        .filter(|row| row.invoice.status != InvoiceStatus::Paid)
        .map(|row| row.invoice.total_amount)
        .sum::<Money>();
    let paid_count = items
        .iter()
        .filter(|row| row.invoice.status == InvoiceStatus::Paid)
        .count();
    let pending_count = items
        .iter()
        .filter(|row| row.invoice.status == InvoiceStatus::PendingVerification)
        .count();
    MyFeesResponse {
        items,
        total_due,
        paid_count,
        pending_count,
    }
}

pub async fn create_invoice(
    service: &FinanceService,
    body: CreateInvoiceRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(student) = storage.get_student_by_code(body.student_id.trim()).await? else {
        return Ok(not_found(ErrorCode::StudentNotFound, "Student not found"));
    };
    let Some(structure) = storage.get_fee_structure(body.fee_structure_id).await? else {
        return Ok(not_found(
            ErrorCode::FeeStructureNotFound,
            "Fee structure not found",
        ));
    };

    let parent_id = match body
        .parent_username
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
    {
        Some(username) => match storage.get_user_by_username(username).await? {
            Some(parent) if parent.role == UserRole::Parent => Some(parent.id),
            Some(_) => {
                return Ok(bad_request(
                    ErrorCode::BadRequest,
                    "Invoices can only be addressed to parent accounts",
                ));
            }
            None => return Ok(not_found(ErrorCode::UserNotFound, "Parent not found")),
        },
        None => None,
    };

    let total_amount = body.total_amount.unwrap_or(structure.amount);
    if !total_amount.is_positive() {
        return Ok(bad_request(ErrorCode::BadRequest, "Total must be greater than zero"));
    }

    let invoice = storage
        .create_invoice(NewInvoice {
            student_id: student.id,
            parent_id,
            fee_structure_id: structure.id,
            issue_date: today(),
            due_date: body.due_date,
            total_amount,
        })
        .await?;
    tracing::info!(
        "Invoice {} issued to student {} for {}",
        invoice.invoice.id,
        student.student_id,
        total_amount
    );

    Ok(HttpResponse::Created().json(ApiResponse::success(invoice, "Invoice created")))
}

/// Parents see their children's invoices, finance staff every invoice.
pub async fn my_fees(service: &FinanceService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request);

    let items = match user.role {
        UserRole::Parent => {
            let ids: Vec<i64> = storage
                .list_children(user.id)
                .await?
                .iter()
                .map(|s| s.id)
                .collect();
            storage
                .list_invoices(Some(&ids), None, MY_FEES_LIMIT)
                .await?
        }
        UserRole::Principal | UserRole::Admin => {
            storage.list_invoices(None, None, MY_FEES_LIMIT).await?
        }
        UserRole::Teacher => return Ok(forbidden(ACCESS_DENIED)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        summarize(items),
        "Fees retrieved successfully",
    )))
}

pub async fn invoice_detail(
    service: &FinanceService,
    invoice_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request);

    let Some(invoice) = storage.get_invoice(invoice_id).await? else {
        return Ok(not_found(ErrorCode::InvoiceNotFound, "Invoice not found"));
    };
    if !can_view_invoice(storage.as_ref(), &user, invoice.invoice.student_id).await? {
        return Ok(forbidden(ACCESS_DENIED));
    }

    let payments = storage.list_payments(invoice_id).await?;
    let proofs = storage.list_proofs(invoice_id).await?;
    let paid_sum: Money = payments.iter().map(|p| p.amount).sum();
    let remaining = remaining_balance(invoice.invoice.total_amount, paid_sum);

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        InvoiceDetailResponse {
            invoice,
            payments,
            proofs,
            paid_sum,
            remaining,
        },
        "Invoice retrieved successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::finance::entities::FeeInvoice;
    use chrono::{NaiveDate, Utc};

    fn row(id: i64, cents: i64, status: InvoiceStatus) -> InvoiceRow {
        let date = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        InvoiceRow {
            invoice: FeeInvoice {
                id,
                student_id: 1,
                parent_id: None,
                fee_structure_id: 1,
                issue_date: date,
                due_date: date,
                total_amount: Money::from_cents(cents),
                status,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            student_code: "BB001".to_string(),
            student_name: "Rudo Ncube".to_string(),
            fee_structure_name: "Term 1".to_string(),
            paid: Money::default(),
            balance: Money::from_cents(cents),
        }
    }

    #[test]
    fn test_fee_summary() {
        let summary = summarize(vec![
            row(1, 10_000, InvoiceStatus::Paid),
            row(2, 25_000, InvoiceStatus::Unpaid),
            row(3, 5_000, InvoiceStatus::PendingVerification),
            row(4, 1_000, InvoiceStatus::Partial),
        ]);
        assert_eq!(summary.total_due, Money::from_cents(31_000));
        assert_eq!(summary.paid_count, 1);
        assert_eq!(summary.pending_count, 1);
        assert_eq!(summary.items.len(), 4);
    }
}
