pub mod assignments;
pub mod permissions;
pub mod roles;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::rbac::requests::{
    AssignRoleRequest, CreatePermissionRequest, CreateRoleRequest, UpdateRoleRequest,
};
use crate::storage::Storage;

pub struct RbacService {
    storage: Option<Arc<dyn Storage>>,
}

impl RbacService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub async fn list_permissions(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        permissions::list_permissions(self, request).await
    }

    pub async fn create_permission(
        &self,
        body: CreatePermissionRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        permissions::create_permission(self, body, request).await
    }

    pub async fn list_roles(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        roles::list_roles(self, request).await
    }

    pub async fn create_role(
        &self,
        body: CreateRoleRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        roles::create_role(self, body, request).await
    }

    pub async fn update_role(
        &self,
        role_id: i64,
        body: UpdateRoleRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        roles::update_role(self, role_id, body, request).await
    }

    pub async fn delete_role(&self, role_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        roles::delete_role(self, role_id, request).await
    }

    pub async fn list_assignments(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        assignments::list_assignments(self, request).await
    }

    pub async fn assign_role(
        &self,
        body: AssignRoleRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        assignments::assign_role(self, body, request).await
    }

    pub async fn revoke_assignment(
        &self,
        assignment_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        assignments::revoke_assignment(self, assignment_id, request).await
    }
}
