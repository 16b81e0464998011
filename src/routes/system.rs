use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, middleware, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::system::requests::{CreateAcademicYearRequest, UpdateSettingRequest};
use crate::models::users::entities::UserRole;
use crate::services::SystemService;
use crate::utils::{SafeIDI64, SafeSettingKey};

static SYSTEM_SERVICE: Lazy<SystemService> = Lazy::new(SystemService::new_lazy);

pub async fn school_info(request: HttpRequest) -> ActixResult<HttpResponse> {
    SYSTEM_SERVICE.school_info(&request).await
}

pub async fn list_settings(request: HttpRequest) -> ActixResult<HttpResponse> {
    SYSTEM_SERVICE.list_settings(&request).await
}

pub async fn update_setting(
    request: HttpRequest,
    key: SafeSettingKey,
    body: web::Json<UpdateSettingRequest>,
) -> ActixResult<HttpResponse> {
    SYSTEM_SERVICE
        .update_setting(&request, key.0, body.into_inner())
        .await
}

pub async fn list_academic_years(request: HttpRequest) -> ActixResult<HttpResponse> {
    SYSTEM_SERVICE.list_academic_years(&request).await
}

pub async fn create_academic_year(
    request: HttpRequest,
    body: web::Json<CreateAcademicYearRequest>,
) -> ActixResult<HttpResponse> {
    SYSTEM_SERVICE
        .create_academic_year(&request, body.into_inner())
        .await
}

pub async fn set_current_academic_year(
    request: HttpRequest,
    id: SafeIDI64,
) -> ActixResult<HttpResponse> {
    SYSTEM_SERVICE.set_current_academic_year(&request, id.0).await
}

pub fn configure_system_routes(cfg: &mut web::ServiceConfig) {
    // Public: the login page shows the school name.
    cfg.route("/api/v1/system/info", web::get().to(school_info));
    cfg.service(
        web::scope("/api/v1/system")
            .wrap(middleware::Compress::default())
            .wrap(middlewares::RequireJWT)
            .route("/academic-years", web::get().to(list_academic_years))
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
                    .route("/settings", web::get().to(list_settings))
                    .route("/settings/{key}", web::put().to(update_setting))
                    .route("/academic-years", web::post().to(create_academic_year))
                    .route(
                        "/academic-years/{id}/current",
                        web::post().to(set_current_academic_year),
                    ),
            ),
    );
}
