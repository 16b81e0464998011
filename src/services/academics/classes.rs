use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AcademicsService, can_access_class};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    academics::{
        requests::{ClassGroupListParams, CreateClassGroupRequest},
        responses::{ClassGroupListResponse, RosterResponse},
    },
};
use crate::services::access::{bad_request, not_found};
use crate::utils::validate::validate_required;

pub(crate) const NOT_ASSIGNED: &str = "You are not assigned to this class.";

pub async fn list_class_groups(
    service: &AcademicsService,
    query: ClassGroupListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let items = storage.list_class_groups(query.academic_year_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ClassGroupListResponse { items },
        "Class groups retrieved successfully",
    )))
}

pub async fn create_class_group(
    service: &AcademicsService,
    body: CreateClassGroupRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let name = body.name.trim();
    if let Err(msg) = validate_required(name, "Name", 64) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }
    let storage = service.get_storage(request);

    let year = match body.academic_year_id {
        Some(id) => storage.get_academic_year(id).await?,
        None => storage.get_current_academic_year().await?,
    };
    let Some(year) = year else {
        return Ok(bad_request(
            ErrorCode::BadRequest,
            "No academic year selected and no current academic year is set",
        ));
    };

    let class_group = storage
        .create_class_group(name, body.grade_level.trim(), year.id)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(class_group, "Class group created")))
}

pub async fn roster(
    service: &AcademicsService,
    class_group_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request);

    let Some(class_group) = storage.get_class_group(class_group_id).await? else {
        return Ok(not_found(ErrorCode::ClassGroupNotFound, "Class group not found"));
    };
    if !can_access_class(storage.as_ref(), &user, class_group_id).await? {
        return Ok(not_assigned());
    }

    let students = storage.list_roster(class_group_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        RosterResponse {
            class_group,
            students,
        },
        "Roster retrieved successfully",
    )))
}

/// Shared 403 for class-scoped teacher pages.
pub(crate) fn not_assigned() -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse::error_empty(
        ErrorCode::NotAssignedToClass,
        NOT_ASSIGNED,
    ))
}
