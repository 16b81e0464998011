use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::PeopleService;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode, people::responses::StudentDetailResponse};
use crate::services::access::{ACCESS_DENIED, can_view_student, forbidden, not_found};

pub async fn get_student(
    service: &PeopleService,
    student_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request);

    let Some(student) = storage.get_student_by_id(student_id).await? else {
        return Ok(not_found(ErrorCode::StudentNotFound, "Student not found"));
    };

    if !can_view_student(storage.as_ref(), &user, student.id).await? {
        return Ok(forbidden(ACCESS_DENIED));
    }

    let guardians = storage.list_guardians(student.id).await?;
    let enrollment = storage.get_current_enrollment(student.id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        StudentDetailResponse {
            student,
            guardians,
            enrollment,
        },
        "Student retrieved successfully",
    )))
}
