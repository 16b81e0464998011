use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::UserService;
use crate::models::{
    ApiResponse, ErrorCode,
    users::{
        entities::PreferredLanguage,
        requests::{CreateUserRequest, NewUser},
        responses::UserResponse,
    },
};
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password_simple, validate_username};

/// Returns the first failing field check.
pub(crate) fn validate_new_user(req: &CreateUserRequest) -> Result<(), (ErrorCode, String)> {
    validate_username(req.username.trim())
        .map_err(|msg| (ErrorCode::UserNameInvalid, msg.to_string()))?;
    validate_email(req.email.trim()).map_err(|msg| (ErrorCode::UserEmailInvalid, msg.to_string()))?;
    validate_password_simple(&req.password).map_err(|msg| (ErrorCode::UserPasswordInvalid, msg))?;
    Ok(())
}

pub async fn create_user(
    service: &UserService,
    user_data: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err((code, msg)) = validate_new_user(&user_data) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(code, msg)));
    }

    let storage = service.get_storage(request);
    let username = user_data.username.trim().to_string();
    let email = user_data.email.trim().to_lowercase();

    if storage.get_user_by_username(&username).await?.is_some()
        || storage.get_user_by_email(&email).await?.is_some()
    {
        return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::UserAlreadyExists,
            "Username or email already exists",
        )));
    }

    let password_hash = hash_password(&user_data.password)?;
    let new_user = NewUser {
        username,
        email,
        password_hash,
        role: user_data.role,
        first_name: user_data.first_name.trim().to_string(),
        last_name: user_data.last_name.trim().to_string(),
        phone: user_data.phone.filter(|p| !p.trim().is_empty()),
        preferred_language: user_data
            .preferred_language
            .unwrap_or(PreferredLanguage::English),
        staff_code: user_data.staff_code.filter(|c| !c.trim().is_empty()),
    };

    let user = storage.create_user(new_user).await?;
    info!("User {} created with role {}", user.username, user.role);

    Ok(HttpResponse::Created().json(ApiResponse::success(
        UserResponse { user },
        "User created successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;

    fn request(username: &str, email: &str, password: &str) -> CreateUserRequest {
        CreateUserRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: UserRole::Teacher,
            first_name: String::new(),
            last_name: String::new(),
            phone: None,
            preferred_language: None,
            staff_code: None,
        }
    }

    #[test]
    fn test_validation_order() {
        assert!(validate_new_user(&request("tmoyo", "t@school.zw", "Chalk2025x")).is_ok());
        assert_eq!(
            validate_new_user(&request("t m", "t@school.zw", "Chalk2025x"))
                .unwrap_err()
                .0,
            ErrorCode::UserNameInvalid
        );
        assert_eq!(
            validate_new_user(&request("tmoyo", "not-an-email", "Chalk2025x"))
                .unwrap_err()
                .0,
            ErrorCode::UserEmailInvalid
        );
        assert_eq!(
            validate_new_user(&request("tmoyo", "t@school.zw", "short"))
                .unwrap_err()
                .0,
            ErrorCode::UserPasswordInvalid
        );
    }
}
