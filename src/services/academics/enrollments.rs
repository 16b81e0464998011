use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AcademicsService;
use crate::models::{
    ApiResponse, ErrorCode,
    academics::{requests::CreateEnrollmentRequest, responses::EnrollmentResponse},
};
use crate::services::access::not_found;

/// The academic year comes from the class group. An enrollment already held
/// for that year is moved rather than duplicated.
pub async fn create_enrollment(
    service: &AcademicsService,
    body: CreateEnrollmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    if storage.get_student_by_id(body.student_id).await?.is_none() {
        return Ok(not_found(ErrorCode::StudentNotFound, "Student not found"));
    }
    if storage.get_class_group(body.class_group_id).await?.is_none() {
        return Ok(not_found(ErrorCode::ClassGroupNotFound, "Class group not found"));
    }

    let (enrollment, outcome) = storage
        .enroll_student(body.student_id, body.class_group_id)
        .await?;
    tracing::info!(
        "Student {} enrolled in class {} ({:?})",
        body.student_id,
        body.class_group_id,
        outcome
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        EnrollmentResponse {
            enrollment,
            outcome,
        },
        "Enrollment saved",
    )))
}

pub async fn delete_enrollment(
    service: &AcademicsService,
    enrollment_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    if storage.delete_enrollment(enrollment_id).await? {
        Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Enrollment deleted")))
    } else {
        Ok(not_found(ErrorCode::NotFound, "Enrollment not found"))
    }
}
