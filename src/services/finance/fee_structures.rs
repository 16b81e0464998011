use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::FinanceService;
use crate::models::{
    ApiResponse, ErrorCode,
    finance::{requests::CreateFeeStructureRequest, responses::FeeStructureListResponse},
};
use crate::services::access::bad_request;
use crate::utils::validate::validate_required;

pub async fn list_fee_structures(
    service: &FinanceService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let items = storage.list_fee_structures().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        FeeStructureListResponse { items },
        "Fee structures retrieved successfully",
    )))
}

pub async fn create_fee_structure(
    service: &FinanceService,
    body: CreateFeeStructureRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let name = body.name.trim();
    if let Err(msg) = validate_required(name, "Name", 100) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }
    if !body.amount.is_positive() {
        return Ok(bad_request(ErrorCode::BadRequest, "Amount must be greater than zero"));
    }

    let storage = service.get_storage(request);
    let structure = storage
        .create_fee_structure(name, body.grade.trim(), body.amount)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(structure, "Fee structure created")))
}
