use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::RegistrarService;
use crate::errors::BusyBeeError;
use crate::models::{
    ApiResponse, ErrorCode,
    people::entities::normalize_student_code,
    registrar::{entities::AdmitPlan, requests::AdmitRequest, responses::AdmitResponse},
    users::entities::UserRole,
};
use crate::services::access::{bad_request, not_found};
use crate::utils::dates::today;
use crate::utils::validate::validate_student_code;

/// Turns an application into a student with an enrollment and, when the
/// parent account exists, a guardian link.
pub async fn admit(
    service: &RegistrarService,
    application_id: i64,
    body: AdmitRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_student_code(body.student_id.trim()) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }
    let storage = service.get_storage(request);

    let Some(application) = storage.get_application(application_id).await? else {
        return Ok(not_found(ErrorCode::ApplicationNotFound, "Application not found"));
    };
    if storage.get_class_group(body.class_group_id).await?.is_none() {
        return Ok(not_found(ErrorCode::ClassGroupNotFound, "Class group not found"));
    }
    let Some(date_of_birth) = application.date_of_birth.or(body.date_of_birth) else {
        return Ok(bad_request(
            ErrorCode::BadRequest,
            "Date of birth is required to admit an applicant.",
        ));
    };

    let mut warning = None;
    let parent_id = match body
        .parent_username
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
    {
        Some(username) => match storage.get_user_by_username(username).await? {
            Some(user) if user.role == UserRole::Parent => Some(user.id),
            _ => {
                warning = Some(format!(
                    "Parent account '{username}' was not found. The student was admitted without a guardian link."
                ));
                None
            }
        },
        None => None,
    };

    let outcome = storage
        .admit_application(AdmitPlan {
            application_id,
            student_code: normalize_student_code(&body.student_id),
            first_name: application.first_name.clone(),
            last_name: application.last_name.clone(),
            date_of_birth,
            grade: application.requested_grade.clone(),
            admission_date: today(),
            class_group_id: body.class_group_id,
            parent_id,
        })
        .await?;

    let student = storage
        .get_student_by_id(outcome.student_id)
        .await?
        .ok_or_else(|| BusyBeeError::not_found("Admitted student not found"))?;
    let enrollment = storage.get_current_enrollment(student.id).await?;
    tracing::info!(
        "Application {} admitted as student {} ({:?})",
        application_id,
        student.student_id,
        outcome.enrollment
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        AdmitResponse {
            application: outcome.application,
            student,
            student_created: outcome.student_created,
            enrollment,
            enrollment_outcome: outcome.enrollment,
            warning,
        },
        "Applicant admitted",
    )))
}
