use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::{
    ApiResponse, ErrorCode,
    auth::{requests::LoginRequest, responses::LoginResponse},
    users::entities::{User, UserRole},
};
use crate::services::system::DynamicConfig;
use crate::utils::jwt;
use crate::utils::password::verify_password;

use super::AuthService;

const BAD_CREDENTIALS: &str = "Username or password is incorrect";

/// Why a credential check failed, in the order the checks run.
#[derive(Debug, PartialEq)]
pub(crate) enum LoginRejection {
    RoleRequired,
    BadCredentials,
    RoleMismatch,
    Inactive,
}

impl LoginRejection {
    fn into_response(self) -> HttpResponse {
        match self {
            LoginRejection::RoleRequired => HttpResponse::BadRequest().json(
                ApiResponse::error_empty(ErrorCode::RoleRequired, "Please select a role."),
            ),
            LoginRejection::BadCredentials => HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::AuthFailed, BAD_CREDENTIALS)),
            LoginRejection::RoleMismatch => {
                HttpResponse::Unauthorized().json(ApiResponse::error_empty(
                    ErrorCode::RoleMismatch,
                    "You selected a role that does not match your account",
                ))
            }
            LoginRejection::Inactive => HttpResponse::Forbidden().json(ApiResponse::error_empty(
                ErrorCode::AccountInactive,
                "This account is not active",
            )),
        }
    }
}

/// Role the user picked on the form. Blank means none was picked.
pub(crate) fn parse_selected_role(role: Option<&str>) -> Result<UserRole, LoginRejection> {
    let role = role.map(str::trim).filter(|r| !r.is_empty());
    match role {
        None => Err(LoginRejection::RoleRequired),
        // An unknown role can never match an account.
        Some(value) => value.parse().map_err(|_| LoginRejection::RoleMismatch),
    }
}

/// Checks a user whose password already matched.
pub(crate) fn check_account(user: &User, selected: UserRole) -> Result<(), LoginRejection> {
    if user.role != selected {
        return Err(LoginRejection::RoleMismatch);
    }
    if !user.is_active() {
        return Err(LoginRejection::Inactive);
    }
    Ok(())
}

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let selected_role = match parse_selected_role(login_request.role.as_deref()) {
        Ok(role) => role,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    let storage = service.get_storage(request);
    let user = match storage
        .get_user_by_username_or_email(login_request.username.trim())
        .await?
    {
        Some(user) if verify_password(&login_request.password, &user.password_hash) => user,
        _ => return Ok(LoginRejection::BadCredentials.into_response()),
    };

    if let Err(rejection) = check_account(&user, selected_role) {
        tracing::info!("Login refused for {}: {:?}", user.username, rejection);
        return Ok(rejection.into_response());
    }

    if let Err(e) = storage.update_last_login(user.id).await {
        tracing::warn!("Failed to update last login for {}: {}", user.username, e);
    }

    let access_minutes = DynamicConfig::access_token_expiry().await;
    let refresh_days = if login_request.remember_me {
        DynamicConfig::refresh_token_remember_me_expiry().await
    } else {
        DynamicConfig::refresh_token_expiry().await
    };

    let token_pair = match user.generate_token_pair(
        chrono::Duration::minutes(access_minutes),
        chrono::Duration::days(refresh_days),
    ) {
        Ok(pair) => pair,
        Err(e) => {
            tracing::error!("Failed to generate JWT token: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Login failed, unable to generate token",
                )),
            );
        }
    };

    tracing::info!("User {} logged in as {}", user.username, user.role);

    let refresh_cookie =
        jwt::JwtUtils::create_refresh_token_cookie(&token_pair.refresh_token, refresh_days);
    let response = LoginResponse {
        access_token: token_pair.access_token,
        expires_in: access_minutes * 60,
        terms_accepted: user.has_accepted_terms(),
        user,
        created_at: chrono::Utc::now(),
    };

    Ok(HttpResponse::Ok()
        .cookie(refresh_cookie)
        .json(ApiResponse::success(response, "Login successful")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::{PreferredLanguage, UserStatus};

    fn user(role: UserRole, status: UserStatus) -> User {
        User {
            id: 3,
            username: "mum".to_string(),
            email: "mum@example.com".to_string(),
            password_hash: String::new(),
            role,
            status,
            first_name: String::new(),
            last_name: String::new(),
            phone: None,
            preferred_language: PreferredLanguage::English,
            staff_code: None,
            terms_accepted_at: None,
            last_login: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_role_must_be_selected() {
        assert_eq!(parse_selected_role(None), Err(LoginRejection::RoleRequired));
        assert_eq!(parse_selected_role(Some("  ")), Err(LoginRejection::RoleRequired));
        assert_eq!(parse_selected_role(Some("Parent")), Ok(UserRole::Parent));
        assert_eq!(
            parse_selected_role(Some("janitor")),
            Err(LoginRejection::RoleMismatch)
        );
    }

    #[test]
    fn test_account_checks() {
        let parent = user(UserRole::Parent, UserStatus::Active);
        assert_eq!(check_account(&parent, UserRole::Parent), Ok(()));
        assert_eq!(
            check_account(&parent, UserRole::Teacher),
            Err(LoginRejection::RoleMismatch)
        );
        let suspended = user(UserRole::Parent, UserStatus::Suspended);
        assert_eq!(
            check_account(&suspended, UserRole::Parent),
            Err(LoginRejection::Inactive)
        );
    }
}
