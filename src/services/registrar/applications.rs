use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::RegistrarService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    registrar::{
        entities::ApplicationStatus,
        requests::{ApplicationListQuery, CreateApplicationRequest, MarkStatusRequest},
        responses::{ApplicationDetailResponse, ApplicationListResponse, ApplicationResponse},
    },
};
use crate::services::access::{bad_request, not_found};
use crate::utils::dates::today;
use crate::utils::validate::{validate_email, validate_required};

const APPLICATION_LIST_LIMIT: u64 = 250;

pub(crate) fn validate_application(req: &CreateApplicationRequest) -> Result<(), String> {
    validate_required(&req.first_name, "First name", 100)?;
    validate_required(&req.last_name, "Last name", 100)?;
    validate_required(&req.guardian_name, "Guardian name", 200)?;
    let email = req.guardian_email.trim();
    if !email.is_empty() {
        validate_email(email).map_err(str::to_string)?;
    }
    if req.guardian_phone.trim().chars().count() > 32 {
        return Err("Guardian phone cannot exceed 32 characters".to_string());
    }
    if req.date_of_birth.is_some_and(|dob| dob > today()) {
        return Err("Date of birth cannot be in the future".to_string());
    }
    Ok(())
}

fn trimmed(mut req: CreateApplicationRequest) -> CreateApplicationRequest {
    for field in [
        &mut req.first_name,
        &mut req.last_name,
        &mut req.requested_grade,
        &mut req.guardian_name,
        &mut req.guardian_phone,
        &mut req.guardian_relationship,
        &mut req.notes,
    ] {
        *field = field.trim().to_string();
    }
    req.guardian_email = req.guardian_email.trim().to_lowercase();
    req
}

pub async fn list_applications(
    service: &RegistrarService,
    query: ApplicationListQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let status = match query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => match raw.parse::<ApplicationStatus>() {
            Ok(status) => Some(status),
            Err(_) => {
                return Ok(bad_request(ErrorCode::ApplicationStatusInvalid, "Invalid status."));
            }
        },
        None => None,
    };

    let storage = service.get_storage(request);
    let items = storage
        .list_applications(query.q, status, APPLICATION_LIST_LIMIT)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ApplicationListResponse { items },
        "Applications retrieved successfully",
    )))
}

pub async fn apply(
    service: &RegistrarService,
    body: CreateApplicationRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_application(&body) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }
    let storage = service.get_storage(request);
    let application = storage.create_application(trimmed(body)).await?;
    tracing::info!("Admission application {} received", application.id);
    Ok(HttpResponse::Created().json(ApiResponse::success(
        ApplicationResponse { application },
        "Application submitted",
    )))
}

pub async fn application_detail(
    service: &RegistrarService,
    application_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request);

    let Some(application) = storage.get_application(application_id).await? else {
        return Ok(not_found(ErrorCode::ApplicationNotFound, "Application not found"));
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ApplicationDetailResponse {
            application,
            can_manage: user.role.is_staff_admin(),
        },
        "Application retrieved successfully",
    )))
}

pub async fn mark_status(
    service: &RegistrarService,
    application_id: i64,
    body: MarkStatusRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Ok(status) = body.status.trim().parse::<ApplicationStatus>() else {
        return Ok(bad_request(ErrorCode::ApplicationStatusInvalid, "Invalid status."));
    };
    let storage = service.get_storage(request);

    match storage
        .update_application_status(application_id, status)
        .await?
    {
        Some(application) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ApplicationResponse { application },
            "Application status updated",
        ))),
        None => Ok(not_found(ErrorCode::ApplicationNotFound, "Application not found")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateApplicationRequest {
        CreateApplicationRequest {
            first_name: "Tariro".to_string(),
            last_name: "Dube".to_string(),
            date_of_birth: None,
            requested_grade: "Grade 1".to_string(),
            guardian_name: "Nyasha Dube".to_string(),
            guardian_phone: "+263 77 123 4567".to_string(),
            guardian_email: String::new(),
            guardian_relationship: "Mother".to_string(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_application_validation() {
        assert!(validate_application(&request()).is_ok());

        let mut bad_email = request();
        bad_email.guardian_email = "not-an-email".to_string();
        assert!(validate_application(&bad_email).is_err());

        let mut no_guardian = request();
        no_guardian.guardian_name = " ".to_string();
        assert!(validate_application(&no_guardian).is_err());

        let mut unborn = request();
        unborn.date_of_birth = today().succ_opt();
        assert!(validate_application(&unborn).is_err());
    }

    #[test]
    fn test_trimmed_lowercases_email() {
        let mut req = request();
        req.guardian_email = " Nyasha@Example.com ".to_string();
        req.first_name = " Tariro ".to_string();
        let req = trimmed(req);
        assert_eq!(req.guardian_email, "nyasha@example.com");
        assert_eq!(req.first_name, "Tariro");
    }
}
