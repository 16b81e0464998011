use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AcademicsService;
use crate::models::{
    ApiResponse, ErrorCode,
    academics::{requests::CreateSubjectRequest, responses::SubjectListResponse},
};
use crate::services::access::bad_request;
use crate::utils::validate::validate_required;

pub async fn list_subjects(
    service: &AcademicsService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let items = storage.list_subjects().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        SubjectListResponse { items },
        "Subjects retrieved successfully",
    )))
}

pub async fn create_subject(
    service: &AcademicsService,
    body: CreateSubjectRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let code = body.code.trim().to_uppercase();
    let name = body.name.trim();
    if let Err(msg) = validate_required(&code, "Code", 20)
        .and_then(|_| validate_required(name, "Name", 100))
    {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }

    let storage = service.get_storage(request);
    let subject = storage.create_subject(&code, name).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(subject, "Subject created")))
}
