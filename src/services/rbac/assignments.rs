use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::RbacService;
use crate::models::{
    ApiResponse, ErrorCode,
    rbac::{
        requests::AssignRoleRequest,
        responses::{AssignmentListResponse, AssignmentResponse},
    },
};
use crate::services::access::not_found;

const ASSIGNMENT_LIMIT: u64 = 500;

pub async fn list_assignments(
    service: &RbacService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let items = storage.list_assignments(ASSIGNMENT_LIMIT).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        AssignmentListResponse { items },
        "Role assignments retrieved successfully",
    )))
}

pub async fn assign_role(
    service: &RbacService,
    body: AssignRoleRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    if storage.get_user_by_id(body.user_id).await?.is_none() {
        return Ok(not_found(ErrorCode::UserNotFound, "User not found"));
    }
    if storage.get_role(body.role_id).await?.is_none() {
        return Ok(not_found(ErrorCode::NotFound, "Role not found"));
    }

    let (assignment, created) = storage.assign_role(body.user_id, body.role_id).await?;
    let message = if created {
        "Role assigned"
    } else {
        "Role was already assigned"
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        AssignmentResponse {
            assignment,
            created,
        },
        message,
    )))
}

pub async fn revoke_assignment(
    service: &RbacService,
    assignment_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    if storage.revoke_assignment(assignment_id).await? {
        Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Role revoked")))
    } else {
        Ok(not_found(ErrorCode::NotFound, "Role assignment not found"))
    }
}
