use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Duration;

use super::ReportsService;
use crate::models::{ApiResponse, reports::responses::AdminDashboardResponse};
use crate::models::people::entities::StudentStatus;
use crate::utils::dates::today;

const RECENT_ROWS: u64 = 10;
const ATTENDANCE_WINDOW_DAYS: i64 = 30;

/// School-wide aggregates for principal and admin accounts.
pub async fn dashboard(service: &ReportsService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let today = today();
    let since = today - Duration::days(ATTENDANCE_WINDOW_DAYS);

    let students_total = storage.count_students(None).await?;
    let students_active = storage.count_students(Some(StudentStatus::Active)).await?;
    let admissions = storage.application_counts().await?;
    let attendance = storage.attendance_summary_since(since).await?;
    let finance = storage.finance_stats(today).await?;

    let recent_applications = storage.list_applications(None, None, RECENT_ROWS).await?;
    let recent_invoices = storage.list_invoices(None, None, RECENT_ROWS).await?;
    let recent_absences = storage.recent_absences(since, RECENT_ROWS).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        AdminDashboardResponse {
            today,
            students_total,
            students_active,
            admissions_new: admissions.new,
            admissions_reviewed: admissions.reviewed,
            admissions_accepted: admissions.accepted,
            attendance_total: attendance.total,
            attendance_present: attendance.present,
            attendance_absent: attendance.absent,
            attendance_late: attendance.late,
            invoices_total: finance.invoices_total,
            invoices_paid: finance.paid,
            invoices_pending: finance.outstanding,
            invoiced_sum: finance.invoiced_sum,
            paid_sum: finance.paid_sum,
            balance: (finance.invoiced_sum - finance.paid_sum).non_negative(),
            recent_applications,
            recent_invoices,
            recent_absences,
        },
        "Dashboard retrieved successfully",
    )))
}
