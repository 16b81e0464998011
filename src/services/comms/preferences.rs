use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CommsService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse,
    comms::{
        requests::UpdatePreferencesRequest,
        responses::{NotificationListResponse, PreferenceResponse},
    },
};

const RECENT_NOTIFICATIONS_LIMIT: u64 = 50;

pub async fn get_preferences(
    service: &CommsService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request);
    let preference = storage.get_or_create_preference(user.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        PreferenceResponse { preference },
        "Notification preferences retrieved successfully",
    )))
}

pub async fn update_preferences(
    service: &CommsService,
    body: UpdatePreferencesRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request);
    let preference = storage.update_preference(user.id, body).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        PreferenceResponse { preference },
        "Notification preferences updated",
    )))
}

pub async fn recent_notifications(
    service: &CommsService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let items = storage
        .list_recent_notifications(RECENT_NOTIFICATIONS_LIMIT)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        NotificationListResponse { items },
        "Notifications retrieved successfully",
    )))
}
