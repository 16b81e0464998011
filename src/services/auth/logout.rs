use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::RequireJWT;
use crate::models::ApiResponse;
use crate::services::access::invalidate_user_cache;
use crate::utils::jwt::JwtUtils;

use super::AuthService;

pub async fn handle_logout(
    _service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Some(user_id) = RequireJWT::extract_user_id(request) {
        invalidate_user_cache(request, user_id).await;
        tracing::info!("User {} logged out", user_id);
    }

    Ok(HttpResponse::Ok()
        .cookie(JwtUtils::create_empty_refresh_token_cookie())
        .json(ApiResponse::success_empty("Logged out successfully")))
}
