/*!
 * Bearer token authentication.
 *
 * Validates `Authorization: Bearer <access token>`, loads the account (through
 * the object cache) and stores it in the request extensions. Inactive or
 * suspended accounts are refused even while their token is still valid.
 *
 * ```rust,ignore
 * web::scope("/api/v1/people")
 *     .wrap(RequireJWT)
 *     .route("/students", web::get().to(list_students))
 * ```
 *
 * Handlers read the account back with [`RequireJWT::current_user`].
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpRequest, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, info};

use super::create_error_response;
use crate::cache::{self, ObjectCache};
use crate::config::AppConfig;
use crate::errors::BusyBeeError;
use crate::models::ErrorCode;
use crate::models::users::entities::{User, UserRole};
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;

const BEARER_PREFIX: &str = "Bearer ";
const AUTHORIZATION_HEADER: &str = "Authorization";

/// Cache key of an authenticated account. Writers that change a user drop it.
pub fn user_cache_key(user_id: i64) -> String {
    format!("user:{user_id}")
}

#[derive(Clone)]
pub struct RequireJWT;

/// Rejection reason; inactive accounts get their own code.
struct AuthRejection {
    code: ErrorCode,
    message: String,
}

impl AuthRejection {
    fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Unauthorized,
            message: message.into(),
        }
    }
}

async fn extract_and_validate_jwt(req: &ServiceRequest) -> Result<User, AuthRejection> {
    let token = req
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .ok_or_else(|| AuthRejection::unauthorized("Missing or invalid Authorization header"))?;

    let claims = JwtUtils::verify_access_token(token).map_err(|err| {
        info!("Access token rejected: {}", err);
        AuthRejection::unauthorized("Invalid or expired token")
    })?;

    let user_id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| AuthRejection::unauthorized("Invalid user id in token"))?;

    let cache = req
        .app_data::<actix_web::web::Data<Arc<dyn ObjectCache>>>()
        .expect("Cache not found in app data")
        .get_ref()
        .clone();

    let user = match cache::get_json::<User>(cache.as_ref(), &user_cache_key(user_id)).await {
        Some(user) => user,
        None => {
            let storage = req
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone();

            let user = storage
                .get_user_by_id(user_id)
                .await
                .map_err(|e| {
                    info!("User lookup failed during authentication: {}", e);
                    AuthRejection::unauthorized("Failed to load account")
                })?
                .ok_or_else(|| AuthRejection::unauthorized("User not found"))?;

            cache::insert_json(
                cache.as_ref(),
                user_cache_key(user_id),
                &user,
                AppConfig::get().cache.default_ttl,
            )
            .await;
            user
        }
    };

    if !user.is_active() {
        return Err(AuthRejection {
            code: ErrorCode::AccountInactive,
            message: "This account is not active".to_string(),
        });
    }

    Ok(user)
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // CORS preflight carries no credentials.
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(HttpResponse::NoContent().finish().map_into_right_body()));
            }

            match extract_and_validate_jwt(&req).await {
                Ok(user) => {
                    debug!("Authenticated user {} ({})", user.id, user.role);
                    req.extensions_mut().insert(user);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(rejection) => {
                    info!(
                        "Authentication failed for {}: {}",
                        req.path(),
                        rejection.message
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            rejection.code,
                            &rejection.message,
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

impl RequireJWT {
    /// Account stored by the middleware, if it ran.
    pub fn current_user(req: &HttpRequest) -> Option<User> {
        req.extensions().get::<User>().cloned()
    }

    /// Like [`current_user`](Self::current_user) but as an error for `?`.
    pub fn require_user(req: &HttpRequest) -> Result<User, BusyBeeError> {
        Self::current_user(req).ok_or_else(|| BusyBeeError::authentication("Not signed in"))
    }

    pub fn extract_user_id(req: &HttpRequest) -> Option<i64> {
        req.extensions().get::<User>().map(|user| user.id)
    }

    pub fn extract_user_role(req: &HttpRequest) -> Option<UserRole> {
        req.extensions().get::<User>().map(|user| user.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test as actix_test, web};

    async fn ok() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    #[actix_web::test]
    async fn test_missing_header_is_unauthorized() {
        let app = actix_test::init_service(
            App::new().service(web::scope("/p").wrap(RequireJWT).route("", web::get().to(ok))),
        )
        .await;
        let req = actix_test::TestRequest::get().uri("/p").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["code"], ErrorCode::Unauthorized as i32);
    }

    #[actix_web::test]
    async fn test_garbage_token_is_unauthorized() {
        let app = actix_test::init_service(
            App::new().service(web::scope("/p").wrap(RequireJWT).route("", web::get().to(ok))),
        )
        .await;
        let req = actix_test::TestRequest::get()
            .uri("/p")
            .insert_header((AUTHORIZATION_HEADER, "Bearer not-a-jwt"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_preflight_passes_without_token() {
        let app = actix_test::init_service(
            App::new().service(web::scope("/p").wrap(RequireJWT).route("", web::get().to(ok))),
        )
        .await;
        let req = actix_test::TestRequest::default()
            .method(actix_web::http::Method::OPTIONS)
            .uri("/p")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(user_cache_key(42), "user:42");
    }
}
