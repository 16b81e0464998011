/*!
 * Fine-grained permission gate backed by RBAC roles. Must be wrapped inside
 * `RequireJWT`. Principal and admin accounts always pass.
 *
 * ```rust,ignore
 * web::resource("/students")
 *     .wrap(RequirePermission::new(perms::VIEW_STUDENT))
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{info, warn};

use super::create_error_response;
use crate::errors::Result;
use crate::middlewares::RequireJWT;
use crate::models::ErrorCode;
use crate::models::users::entities::User;
use crate::storage::Storage;

/// Whether `user` holds the permission `code`.
pub async fn user_has_perm(storage: &dyn Storage, user: &User, code: &str) -> Result<bool> {
    if user.role.is_staff_admin() {
        return Ok(true);
    }
    storage.user_has_permission(user.id, code).await
}

#[derive(Clone)]
pub struct RequirePermission {
    code: &'static str,
}

impl RequirePermission {
    pub fn new(code: &'static str) -> Self {
        Self { code }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequirePermission
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequirePermissionMiddleware<S>;
    type Future = Ready<std::result::Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequirePermissionMiddleware {
            service: Rc::new(service),
            code: self.code,
        }))
    }
}

pub struct RequirePermissionMiddleware<S> {
    service: Rc<S>,
    code: &'static str,
}

impl<S, B> Service<ServiceRequest> for RequirePermissionMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let code = self.code;

        Box::pin(async move {
            let Some(user) = RequireJWT::current_user(req.request()) else {
                return Ok(req.into_response(
                    create_error_response(
                        StatusCode::UNAUTHORIZED,
                        ErrorCode::Unauthorized,
                        "Authentication required",
                    )
                    .map_into_right_body(),
                ));
            };

            let storage = req
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone();

            match user_has_perm(storage.as_ref(), &user, code).await {
                Ok(true) => {
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Ok(false) => {
                    info!("User {} lacks permission {}", user.id, code);
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::FORBIDDEN,
                            ErrorCode::Forbidden,
                            "You do not have access to this page.",
                        )
                        .map_into_right_body(),
                    ))
                }
                Err(e) => {
                    warn!("Permission check for {} failed: {}", code, e);
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            ErrorCode::InternalServerError,
                            "Permission check failed",
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rbac::entities::perms;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::users::tests::new_user;

    #[tokio::test]
    async fn test_staff_admins_bypass_roles() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let principal = storage
            .create_user(new_user("head", UserRole::Principal))
            .await
            .unwrap();
        let teacher = storage
            .create_user(new_user("teach", UserRole::Teacher))
            .await
            .unwrap();
        let parent = storage
            .create_user(new_user("mum", UserRole::Parent))
            .await
            .unwrap();

        assert!(user_has_perm(&storage, &principal, perms::VERIFY_POP).await.unwrap());
        assert!(user_has_perm(&storage, &teacher, perms::VIEW_STUDENT).await.unwrap());
        assert!(!user_has_perm(&storage, &teacher, perms::VERIFY_POP).await.unwrap());
        assert!(!user_has_perm(&storage, &parent, perms::VIEW_STUDENT).await.unwrap());
    }
}
