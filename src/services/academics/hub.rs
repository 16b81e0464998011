use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AcademicsService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    academics::{
        requests::{ChildQuery, TimetableFilter},
        responses::ParentHubResponse,
    },
    users::entities::UserRole,
};
use crate::services::access::{ACCESS_DENIED, forbidden, not_found, select_child};

const HUB_ATTENDANCE_LIMIT: u64 = 30;
const HUB_GRADES_LIMIT: u64 = 40;

/// Everything a parent looks at for one child on a single page.
pub async fn parent_hub(
    service: &AcademicsService,
    query: ChildQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    if user.role != UserRole::Parent {
        return Ok(forbidden(ACCESS_DENIED));
    }
    let storage = service.get_storage(request);

    let Some(student) = select_child(storage.as_ref(), user.id, query.student_id).await? else {
        return Ok(not_found(
            ErrorCode::StudentNotLinked,
            "No linked student found.",
        ));
    };

    let enrollment = storage.get_current_enrollment(student.id).await?;
    let timetable = match &enrollment {
        Some(enrollment) => {
            storage
                .list_timetable(TimetableFilter {
                    class_group_id: Some(enrollment.class_group_id),
                    ..Default::default()
                })
                .await?
        }
        None => Vec::new(),
    };
    let attendance = storage
        .list_attendance(&[student.id], None, HUB_ATTENDANCE_LIMIT)
        .await?;
    let grades = storage
        .list_grades(&[student.id], None, HUB_GRADES_LIMIT)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ParentHubResponse {
            student,
            enrollment,
            timetable,
            attendance,
            grades,
        },
        "Parent hub retrieved successfully",
    )))
}
