use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{PeopleService, has_student_perm};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode, people::requests::UpdateStudentRequest, rbac::entities::perms,
};
use crate::services::access::{ACCESS_DENIED, bad_request, forbidden, not_found};
use crate::utils::validate::{validate_required, validate_student_code};

pub async fn update_student(
    service: &PeopleService,
    student_id: i64,
    body: UpdateStudentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request);

    if !has_student_perm(storage.as_ref(), &user, perms::CHANGE_STUDENT).await? {
        return Ok(forbidden(ACCESS_DENIED));
    }

    if let Some(code) = &body.student_id {
        if let Err(msg) = validate_student_code(code) {
            return Ok(bad_request(ErrorCode::BadRequest, msg));
        }
        if let Some(existing) = storage.get_student_by_code(code).await?
            && existing.id != student_id
        {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::StudentAlreadyExists,
                "A student with that ID already exists",
            )));
        }
    }
    for (value, field) in [(&body.first_name, "First name"), (&body.last_name, "Last name")] {
        if let Some(value) = value
            && let Err(msg) = validate_required(value, field, 100)
        {
            return Ok(bad_request(ErrorCode::BadRequest, msg));
        }
    }

    match storage.update_student(student_id, body).await? {
        Some(student) => Ok(HttpResponse::Ok().json(ApiResponse::success(student, "Student updated"))),
        None => Ok(not_found(ErrorCode::StudentNotFound, "Student not found")),
    }
}
