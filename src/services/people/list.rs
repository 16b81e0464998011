use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{PeopleService, has_student_perm};
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, people::requests::StudentListParams, rbac::entities::perms};
use crate::services::access::{ACCESS_DENIED, forbidden};

pub async fn list_students(
    service: &PeopleService,
    query: StudentListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request);

    if !has_student_perm(storage.as_ref(), &user, perms::VIEW_STUDENT).await? {
        return Ok(forbidden(ACCESS_DENIED));
    }

    let (page, size) = query.pagination.normalized();
    let response = storage
        .list_students_with_pagination(page, size, query.search)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        response,
        "Student list retrieved successfully",
    )))
}
