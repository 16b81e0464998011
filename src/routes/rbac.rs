use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::rbac::requests::{
    AssignRoleRequest, CreatePermissionRequest, CreateRoleRequest, UpdateRoleRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::RbacService;
use crate::utils::SafeIDI64;

static RBAC_SERVICE: Lazy<RbacService> = Lazy::new(RbacService::new_lazy);

pub async fn list_permissions(req: HttpRequest) -> ActixResult<HttpResponse> {
    RBAC_SERVICE.list_permissions(&req).await
}

pub async fn create_permission(
    req: HttpRequest,
    body: web::Json<CreatePermissionRequest>,
) -> ActixResult<HttpResponse> {
    RBAC_SERVICE.create_permission(body.into_inner(), &req).await
}

pub async fn list_roles(req: HttpRequest) -> ActixResult<HttpResponse> {
    RBAC_SERVICE.list_roles(&req).await
}

pub async fn create_role(
    req: HttpRequest,
    body: web::Json<CreateRoleRequest>,
) -> ActixResult<HttpResponse> {
    RBAC_SERVICE.create_role(body.into_inner(), &req).await
}

pub async fn update_role(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateRoleRequest>,
) -> ActixResult<HttpResponse> {
    RBAC_SERVICE.update_role(id.0, body.into_inner(), &req).await
}

pub async fn delete_role(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    RBAC_SERVICE.delete_role(id.0, &req).await
}

pub async fn list_assignments(req: HttpRequest) -> ActixResult<HttpResponse> {
    RBAC_SERVICE.list_assignments(&req).await
}

pub async fn assign_role(
    req: HttpRequest,
    body: web::Json<AssignRoleRequest>,
) -> ActixResult<HttpResponse> {
    RBAC_SERVICE.assign_role(body.into_inner(), &req).await
}

pub async fn revoke_assignment(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    RBAC_SERVICE.revoke_assignment(id.0, &req).await
}

pub fn configure_rbac_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/rbac")
            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
            .wrap(middlewares::RequireJWT)
            .route("/permissions", web::get().to(list_permissions))
            .route("/permissions", web::post().to(create_permission))
            .route("/roles", web::get().to(list_roles))
            .route("/roles", web::post().to(create_role))
            .route("/roles/{id}", web::put().to(update_role))
            .route("/roles/{id}", web::delete().to(delete_role))
            .route("/assignments", web::get().to(list_assignments))
            .route("/assignments", web::post().to(assign_role))
            .route("/assignments/{id}", web::delete().to(revoke_assignment)),
    );
}
