use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::RbacService;
use crate::models::{
    ApiResponse, ErrorCode,
    rbac::{
        requests::{CreateRoleRequest, UpdateRoleRequest},
        responses::{RoleListResponse, RoleResponse},
    },
};
use crate::services::access::{bad_request, not_found};
use crate::utils::validate::validate_required;

fn normalize_codes(codes: Vec<String>) -> Vec<String> {
    let mut codes: Vec<String> = codes
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    codes.sort();
    codes.dedup();
    codes
}

pub async fn list_roles(service: &RbacService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let items = storage.list_roles().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        RoleListResponse { items },
        "Roles retrieved successfully",
    )))
}

/// Unknown permission codes surface as a validation error from storage.
pub async fn create_role(
    service: &RbacService,
    body: CreateRoleRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let name = body.name.trim();
    if let Err(msg) = validate_required(name, "Name", 64) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }
    let storage = service.get_storage(request);

    let codes = normalize_codes(body.permissions);
    let role = storage
        .create_role(name, body.description.trim(), &codes)
        .await?;
    tracing::info!("Role '{}' created with {} permissions", role.name, role.permissions.len());
    Ok(HttpResponse::Created().json(ApiResponse::success(RoleResponse { role }, "Role created")))
}

pub async fn update_role(
    service: &RbacService,
    role_id: i64,
    mut body: UpdateRoleRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Some(name) = body.name.as_mut() {
        *name = name.trim().to_string();
        if let Err(msg) = validate_required(name, "Name", 64) {
            return Ok(bad_request(ErrorCode::BadRequest, msg));
        }
    }
    body.permissions = body.permissions.map(normalize_codes);

    let storage = service.get_storage(request);
    match storage.update_role(role_id, body).await? {
        Some(role) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            RoleResponse { role },
            "Role updated",
        ))),
        None => Ok(not_found(ErrorCode::NotFound, "Role not found")),
    }
}

pub async fn delete_role(
    service: &RbacService,
    role_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    if storage.delete_role(role_id).await? {
        Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Role deleted")))
    } else {
        Ok(not_found(ErrorCode::NotFound, "Role not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_trimmed_and_deduplicated() {
        let codes = normalize_codes(vec![
            " people.view_student".to_string(),
            "".to_string(),
            "finance.verify_pop".to_string(),
            "people.view_student ".to_string(),
        ]);
        assert_eq!(codes, vec!["finance.verify_pop", "people.view_student"]);
    }
}
