use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{PeopleService, has_student_perm};
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode, rbac::entities::perms};
use crate::services::access::{ACCESS_DENIED, forbidden, not_found};

pub async fn delete_student(
    service: &PeopleService,
    student_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request);

    if !has_student_perm(storage.as_ref(), &user, perms::DELETE_STUDENT).await? {
        return Ok(forbidden(ACCESS_DENIED));
    }

    if storage.delete_student(student_id).await? {
        tracing::info!("Student {} deleted by user {}", student_id, user.id);
        Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Student deleted")))
    } else {
        Ok(not_found(ErrorCode::StudentNotFound, "Student not found"))
    }
}
