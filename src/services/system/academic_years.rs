use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SystemService;
use crate::models::{
    ApiResponse, ErrorCode,
    system::{requests::CreateAcademicYearRequest, responses::AcademicYearListResponse},
};
use crate::utils::validate::validate_required;

pub async fn list_academic_years(
    service: &SystemService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let items = service.get_storage(request).list_academic_years().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        AcademicYearListResponse { items },
        "Academic years retrieved successfully",
    )))
}

pub async fn create_academic_year(
    service: &SystemService,
    request: &HttpRequest,
    body: CreateAcademicYearRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_required(&body.name, "Name", 32) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
    }
    if body.start_date > body.end_date {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "End date must be after start date.",
        )));
    }

    let storage = service.get_storage(request);
    if storage.get_academic_year_by_name(&body.name).await?.is_some() {
        return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::Conflict,
            "An academic year with that name already exists",
        )));
    }

    let year = storage.create_academic_year(body).await?;
    tracing::info!("Academic year {} created", year.name);

    Ok(HttpResponse::Created().json(ApiResponse::success(year, "Academic year created")))
}

pub async fn set_current_academic_year(
    service: &SystemService,
    request: &HttpRequest,
    id: i64,
) -> ActixResult<HttpResponse> {
    match service
        .get_storage(request)
        .set_current_academic_year(id)
        .await?
    {
        Some(year) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            year,
            "Current academic year updated",
        ))),
        None => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::NotFound,
            "Academic year not found",
        ))),
    }
}
