use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CommsService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    comms::{
        requests::{CreateBehaviourRecordRequest, CreatePerformanceNoteRequest},
        responses::StudentNotesResponse,
    },
};
use crate::services::access::{
    ACCESS_DENIED, bad_request, can_see_student_records, forbidden, not_found,
};
use crate::utils::dates::{first_of_month, today};
use crate::utils::validate::validate_required;

const MAX_NOTE_LEN: usize = 4000;

pub async fn create_performance_note(
    service: &CommsService,
    body: CreatePerformanceNoteRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    if !user.role.is_staff() {
        return Ok(forbidden(ACCESS_DENIED));
    }
    if let Err(msg) = validate_required(&body.summary, "Summary", MAX_NOTE_LEN) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }
    let storage = service.get_storage(request);
    if storage.get_student_by_id(body.student_id).await?.is_none() {
        return Ok(not_found(ErrorCode::StudentNotFound, "Student not found"));
    }

    let note = storage
        .create_performance_note(
            body.student_id,
            user.id,
            first_of_month(body.term_month),
            body.summary.trim(),
        )
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(note, "Performance note saved")))
}

pub async fn create_behaviour_record(
    service: &CommsService,
    body: CreateBehaviourRecordRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    if !user.role.is_staff() {
        return Ok(forbidden(ACCESS_DENIED));
    }
    if let Err(msg) = validate_required(&body.note, "Note", MAX_NOTE_LEN) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }
    let storage = service.get_storage(request);
    if storage.get_student_by_id(body.student_id).await?.is_none() {
        return Ok(not_found(ErrorCode::StudentNotFound, "Student not found"));
    }

    let record = storage
        .create_behaviour_record(
            body.student_id,
            user.id,
            body.occurred_on.unwrap_or_else(today),
            body.note.trim(),
        )
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(record, "Behaviour record saved")))
}

pub async fn student_notes(
    service: &CommsService,
    student_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request);

    if storage.get_student_by_id(student_id).await?.is_none() {
        return Ok(not_found(ErrorCode::StudentNotFound, "Student not found"));
    }
    if !can_see_student_records(storage.as_ref(), &user, student_id).await? {
        return Ok(forbidden(ACCESS_DENIED));
    }

    let performance_notes = storage.list_performance_notes(student_id, None).await?;
    let behaviour_records = storage.list_behaviour_records(student_id, None).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        StudentNotesResponse {
            performance_notes,
            behaviour_records,
        },
        "Notes retrieved successfully",
    )))
}
