use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::RequireJWT;
use crate::models::auth::responses::{RefreshTokenResponse, UserInfoResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::system::DynamicConfig;
use crate::utils::jwt;

use super::AuthService;

pub async fn handle_refresh_token(
    service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(refresh_token) = jwt::JwtUtils::extract_refresh_token_from_cookie(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized access, please login",
        )));
    };

    let expired = || {
        HttpResponse::Unauthorized()
            .cookie(jwt::JwtUtils::create_empty_refresh_token_cookie())
            .json(ApiResponse::error_empty(
                ErrorCode::Unauthorized,
                "Login expired or invalid, please login again",
            ))
    };

    let claims = match jwt::JwtUtils::verify_refresh_token(&refresh_token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::info!("Refresh token rejected: {}", e);
            return Ok(expired());
        }
    };

    // The account may have been deactivated since the cookie was issued.
    let user_id = claims.sub.parse::<i64>().unwrap_or_default();
    match service.get_storage(request).get_user_by_id(user_id).await? {
        Some(user) if user.is_active() => {}
        _ => return Ok(expired()),
    }

    let access_minutes = DynamicConfig::access_token_expiry().await;
    match jwt::JwtUtils::refresh_access_token(
        &refresh_token,
        Some(chrono::Duration::minutes(access_minutes)),
    ) {
        Ok(access_token) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            RefreshTokenResponse {
                access_token,
                expires_in: access_minutes * 60,
            },
            "Token refreshed successfully",
        ))),
        Err(e) => {
            tracing::error!("Refresh token failed: {}", e);
            Ok(expired())
        }
    }
}

pub async fn handle_get_user(
    _service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        UserInfoResponse {
            terms_accepted: user.has_accepted_terms(),
            user,
        },
        "User information retrieved successfully",
    )))
}
