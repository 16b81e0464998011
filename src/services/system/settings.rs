use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{DynamicConfig, SystemService};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    system::{
        entities::SettingValueType,
        requests::UpdateSettingRequest,
        responses::{AdminSettingsListResponse, SchoolInfoResponse, SettingResponse},
    },
};

const MAX_STRING_SETTING_LEN: usize = 255;

/// School name, upload limits and the current academic year. Any signed-in user.
pub async fn school_info(
    service: &SystemService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let config = service.get_config();

    let response = SchoolInfoResponse {
        school_name: DynamicConfig::school_name().await,
        country: DynamicConfig::school_country().await,
        timezone: DynamicConfig::school_timezone().await,
        max_file_size: DynamicConfig::upload_max_size().await,
        allowed_file_types: DynamicConfig::upload_allowed_types().await,
        environment: config.app.environment.clone(),
        current_academic_year: storage.get_current_academic_year().await?,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        response,
        "School information retrieved successfully",
    )))
}

pub async fn list_settings(
    service: &SystemService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let settings = service.get_storage(request).list_all_settings().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        AdminSettingsListResponse { settings },
        "Settings retrieved successfully",
    )))
}

pub async fn update_setting(
    service: &SystemService,
    request: &HttpRequest,
    key: String,
    body: UpdateSettingRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request);

    let Some(existing) = storage.get_setting_by_key(&key).await? else {
        return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::NotFound,
            format!("Setting not found: {key}"),
        )));
    };

    let value = match normalize_setting_value(existing.value_type, &body.value) {
        Ok(value) => value,
        Err(msg) => {
            return Ok(
                HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg))
            );
        }
    };

    let setting = storage.update_setting(&key, &value, user.id).await?;
    DynamicConfig::update(&key, &setting.value).await;
    info!("Setting {} updated by user {}", key, user.id);

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        SettingResponse { setting },
        "Setting updated successfully",
    )))
}

/// Checks `raw` against the declared type and returns the value to store.
fn normalize_setting_value(value_type: SettingValueType, raw: &str) -> Result<String, String> {
    let raw = raw.trim();
    match value_type {
        SettingValueType::String => {
            if raw.chars().count() > MAX_STRING_SETTING_LEN {
                Err(format!(
                    "Value must be at most {MAX_STRING_SETTING_LEN} characters"
                ))
            } else {
                Ok(raw.to_string())
            }
        }
        SettingValueType::Integer => match raw.parse::<i64>() {
            Ok(n) if n >= 0 => Ok(n.to_string()),
            _ => Err("Value must be a non-negative integer".to_string()),
        },
        SettingValueType::Boolean => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok("true".to_string()),
            "false" | "0" | "no" => Ok("false".to_string()),
            _ => Err("Value must be true or false".to_string()),
        },
        SettingValueType::JsonArray => serde_json::from_str::<Vec<String>>(raw)
            .map_err(|_| "Value must be a JSON array of strings".to_string())
            .and_then(|items| serde_json::to_string(&items).map_err(|e| e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_settings() {
        assert_eq!(
            normalize_setting_value(SettingValueType::Integer, " 30 "),
            Ok("30".to_string())
        );
        assert!(normalize_setting_value(SettingValueType::Integer, "-1").is_err());
        assert!(normalize_setting_value(SettingValueType::Integer, "ten").is_err());
    }

    #[test]
    fn test_boolean_and_array_settings() {
        assert_eq!(
            normalize_setting_value(SettingValueType::Boolean, "Yes"),
            Ok("true".to_string())
        );
        assert!(normalize_setting_value(SettingValueType::Boolean, "maybe").is_err());
        assert_eq!(
            normalize_setting_value(SettingValueType::JsonArray, r#"[ ".pdf", ".png" ]"#),
            Ok(r#"[".pdf",".png"]"#.to_string())
        );
        assert!(normalize_setting_value(SettingValueType::JsonArray, "[1, 2]").is_err());
    }

    #[test]
    fn test_string_length_limit() {
        let long = "x".repeat(MAX_STRING_SETTING_LEN + 1);
        assert!(normalize_setting_value(SettingValueType::String, &long).is_err());
        assert_eq!(
            normalize_setting_value(SettingValueType::String, " Hillside "),
            Ok("Hillside".to_string())
        );
    }
}
