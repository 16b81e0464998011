use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::access::invalidate_user_cache;

pub async fn delete_user(
    service: &UserService,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if RequireJWT::extract_user_id(request) == Some(user_id) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::CanNotDeleteCurrentUser,
            "You cannot delete your own account",
        )));
    }

    if service.get_storage(request).delete_user(user_id).await? {
        invalidate_user_cache(request, user_id).await;
        tracing::info!("User {} deleted", user_id);
        Ok(HttpResponse::Ok().json(ApiResponse::success_empty("User deleted successfully")))
    } else {
        Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User not found",
        )))
    }
}
