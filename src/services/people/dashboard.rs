use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Duration;

use super::{PeopleService, has_student_perm};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse,
    people::responses::{StudentDashboardResponse, StudentDashboardRow},
    rbac::entities::perms,
};
use crate::services::access::{ACCESS_DENIED, forbidden};
use crate::utils::dates::today;

const DASHBOARD_LIMIT: u64 = 300;
const ATTENDANCE_WINDOW_DAYS: i64 = 30;

/// One row per student with enrollment, recent attendance and latest invoice.
pub async fn students_dashboard(
    service: &PeopleService,
    search: Option<String>,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request);

    if !has_student_perm(storage.as_ref(), &user, perms::VIEW_STUDENT).await? {
        return Ok(forbidden(ACCESS_DENIED));
    }

    let students = storage.list_students_ordered(search, DASHBOARD_LIMIT).await?;
    let ids: Vec<i64> = students.iter().map(|s| s.id).collect();

    let since = today() - Duration::days(ATTENDANCE_WINDOW_DAYS);
    let mut enrollments = storage.current_enrollments(&ids).await?;
    let mut attendance = storage.attendance_counts_since(&ids, since).await?;
    let mut invoices = storage.latest_invoice_snapshots(&ids).await?;

    let items = students
        .into_iter()
        .map(|student| StudentDashboardRow {
            enrollment: enrollments.remove(&student.id),
            attendance: attendance.remove(&student.id).unwrap_or_default(),
            latest_invoice: invoices.remove(&student.id),
            student,
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        StudentDashboardResponse { items },
        "Student dashboard retrieved successfully",
    )))
}
