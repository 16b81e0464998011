use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{PeopleService, has_student_perm};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode, people::requests::AddGuardianRequest, rbac::entities::perms,
    users::entities::UserRole,
};
use crate::services::access::{ACCESS_DENIED, bad_request, forbidden, not_found};

pub async fn add_guardian(
    service: &PeopleService,
    student_id: i64,
    body: AddGuardianRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request);

    if !has_student_perm(storage.as_ref(), &user, perms::CHANGE_STUDENT).await? {
        return Ok(forbidden(ACCESS_DENIED));
    }
    if storage.get_student_by_id(student_id).await?.is_none() {
        return Ok(not_found(ErrorCode::StudentNotFound, "Student not found"));
    }

    let Some(parent) = storage.get_user_by_username(body.username.trim()).await? else {
        return Ok(not_found(ErrorCode::UserNotFound, "User not found"));
    };
    if parent.role != UserRole::Parent {
        return Ok(bad_request(
            ErrorCode::BadRequest,
            "Only parent accounts can be linked as guardians",
        ));
    }

    let created = storage.add_guardian(student_id, parent.id).await?;
    let guardians = storage.list_guardians(student_id).await?;
    let message = if created {
        "Guardian linked"
    } else {
        "Guardian was already linked"
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(guardians, message)))
}

pub async fn remove_guardian(
    service: &PeopleService,
    student_id: i64,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request);

    if !has_student_perm(storage.as_ref(), &user, perms::CHANGE_STUDENT).await? {
        return Ok(forbidden(ACCESS_DENIED));
    }

    if storage.remove_guardian(student_id, user_id).await? {
        Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Guardian removed")))
    } else {
        Ok(not_found(ErrorCode::StudentNotLinked, "Guardian link not found"))
    }
}
