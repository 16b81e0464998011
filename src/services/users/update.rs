use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::models::{
    ApiResponse, ErrorCode,
    users::{
        requests::{UpdateUserRequest, UserChanges},
        responses::UserResponse,
    },
};
use crate::services::access::invalidate_user_cache;
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password_simple};

pub async fn update_user(
    service: &UserService,
    user_id: i64,
    update_data: UpdateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let email = update_data.email.map(|e| e.trim().to_lowercase());
    if let Some(email) = &email {
        if let Err(msg) = validate_email(email) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::UserEmailInvalid, msg)));
        }
        if let Some(other) = storage.get_user_by_email(email).await?
            && other.id != user_id
        {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::UserAlreadyExists,
                "Email already in use",
            )));
        }
    }

    let password_hash = match update_data.password {
        Some(password) => {
            if let Err(msg) = validate_password_simple(&password) {
                return Ok(HttpResponse::BadRequest()
                    .json(ApiResponse::error_empty(ErrorCode::UserPasswordInvalid, msg)));
            }
            Some(hash_password(&password)?)
        }
        None => None,
    };

    let changes = UserChanges {
        email,
        password_hash,
        role: update_data.role,
        status: update_data.status,
        first_name: update_data.first_name.map(|v| v.trim().to_string()),
        last_name: update_data.last_name.map(|v| v.trim().to_string()),
        phone: update_data.phone,
        preferred_language: update_data.preferred_language,
        staff_code: update_data.staff_code,
    };

    match storage.update_user(user_id, changes).await? {
        Some(user) => {
            invalidate_user_cache(request, user_id).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                UserResponse { user },
                "User information updated successfully",
            )))
        }
        None => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User not found",
        ))),
    }
}
