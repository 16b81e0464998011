use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RateLimit, RequirePermission};
use crate::models::rbac::entities::perms;
use crate::models::registrar::requests::{
    AdmitRequest, ApplicationListQuery, CreateApplicationRequest, MarkStatusRequest,
};
use crate::services::RegistrarService;
use crate::utils::SafeIDI64;

static REGISTRAR_SERVICE: Lazy<RegistrarService> = Lazy::new(RegistrarService::new_lazy);

pub async fn list_applications(
    req: HttpRequest,
    query: web::Query<ApplicationListQuery>,
) -> ActixResult<HttpResponse> {
    REGISTRAR_SERVICE
        .list_applications(query.into_inner(), &req)
        .await
}

pub async fn apply(
    req: HttpRequest,
    body: web::Json<CreateApplicationRequest>,
) -> ActixResult<HttpResponse> {
    REGISTRAR_SERVICE.apply(body.into_inner(), &req).await
}

pub async fn application_detail(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    REGISTRAR_SERVICE.application_detail(id.0, &req).await
}

pub async fn mark_status(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<MarkStatusRequest>,
) -> ActixResult<HttpResponse> {
    REGISTRAR_SERVICE
        .mark_status(id.0, body.into_inner(), &req)
        .await
}

pub async fn admit(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<AdmitRequest>,
) -> ActixResult<HttpResponse> {
    REGISTRAR_SERVICE.admit(id.0, body.into_inner(), &req).await
}

pub async fn bulk_admission(req: HttpRequest, payload: Multipart) -> ActixResult<HttpResponse> {
    REGISTRAR_SERVICE.bulk_admission(payload, &req).await
}

pub fn configure_registrar_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/registrar")
            .wrap(middlewares::RequireJWT)
            .route("/applications", web::post().to(apply))
            .route("/applications/{id}", web::get().to(application_detail))
            .service(
                web::scope("")
                    .wrap(RequirePermission::new(perms::MANAGE_APPLICATIONS))
                    .route("/applications", web::get().to(list_applications))
                    .route("/applications/{id}/status", web::post().to(mark_status))
                    .route("/applications/{id}/admit", web::post().to(admit))
                    .service(
                        web::resource("/bulk-admission")
                            .wrap(RateLimit::file_upload())
                            .route(web::post().to(bulk_admission)),
                    ),
            ),
    );
}
