use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::RbacService;
use crate::models::{
    ApiResponse, ErrorCode,
    rbac::{
        entities::is_valid_permission_code, requests::CreatePermissionRequest,
        responses::PermissionListResponse,
    },
};
use crate::services::access::bad_request;
use crate::utils::validate::validate_required;

pub async fn list_permissions(
    service: &RbacService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let items = storage.list_permissions().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        PermissionListResponse { items },
        "Permissions retrieved successfully",
    )))
}

pub async fn create_permission(
    service: &RbacService,
    body: CreatePermissionRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let code = body.code.trim();
    if !is_valid_permission_code(code) {
        return Ok(bad_request(
            ErrorCode::BadRequest,
            "Permission code must look like app.action",
        ));
    }
    let name = body.name.trim();
    if let Err(msg) = validate_required(name, "Name", 100) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }

    let storage = service.get_storage(request);
    let permission = storage.create_permission(code, name).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(permission, "Permission created")))
}
