use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode, auth::responses::UserInfoResponse};
use crate::services::access::invalidate_user_cache;

use super::AuthService;

pub async fn handle_accept_terms(
    service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    if user.has_accepted_terms() {
        return Ok(HttpResponse::Ok().json(ApiResponse::success(
            UserInfoResponse {
                terms_accepted: true,
                user,
            },
            "Terms already accepted",
        )));
    }

    let Some(updated) = service.get_storage(request).accept_terms(user.id).await? else {
        return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User not found",
        )));
    };
    invalidate_user_cache(request, user.id).await;
    tracing::info!("User {} accepted the terms of use", updated.username);

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        UserInfoResponse {
            terms_accepted: updated.has_accepted_terms(),
            user: updated,
        },
        "Terms accepted",
    )))
}
