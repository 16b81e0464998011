use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{PeopleService, has_student_perm};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode, people::requests::CreateStudentRequest, rbac::entities::perms,
};
use crate::services::access::{ACCESS_DENIED, bad_request, forbidden};
use crate::utils::validate::{validate_required, validate_student_code};

pub(crate) fn validate_student(req: &CreateStudentRequest) -> Result<(), String> {
    validate_student_code(&req.student_id).map_err(str::to_string)?;
    validate_required(&req.first_name, "First name", 100)?;
    validate_required(&req.last_name, "Last name", 100)?;
    if req
        .admission_date
        .is_some_and(|admitted| admitted < req.date_of_birth)
    {
        return Err("Admission date cannot be before the date of birth".to_string());
    }
    Ok(())
}

pub async fn create_student(
    service: &PeopleService,
    mut body: CreateStudentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request);

    if !has_student_perm(storage.as_ref(), &user, perms::ADD_STUDENT).await? {
        return Ok(forbidden(ACCESS_DENIED));
    }
    if let Err(msg) = validate_student(&body) {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }
    if storage.get_student_by_code(&body.student_id).await?.is_some() {
        return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::StudentAlreadyExists,
            "A student with that ID already exists",
        )));
    }

    body.first_name = body.first_name.trim().to_string();
    body.last_name = body.last_name.trim().to_string();
    let student = storage.create_student(body).await?;
    tracing::info!("Student {} created by user {}", student.student_id, user.id);

    Ok(HttpResponse::Created().json(ApiResponse::success(student, "Student created")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn request() -> CreateStudentRequest {
        CreateStudentRequest {
            student_id: "bb-0042".to_string(),
            first_name: "Rudo".to_string(),
            last_name: "Ncube".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(2014, 6, 2).unwrap(),
            admission_date: NaiveDate::from_ymd_opt(2020, 1, 14),
            grade: "Grade 5".to_string(),
            status: None,
        }
    }

    #[test]
    fn test_student_validation() {
        assert!(validate_student(&request()).is_ok());

        let mut blank_name = request();
        blank_name.last_name = "  ".to_string();
        assert!(validate_student(&blank_name).is_err());

        let mut bad_code = request();
        bad_code.student_id = "BB 42".to_string();
        assert!(validate_student(&bad_code).is_err());

        let mut early = request();
        early.admission_date = NaiveDate::from_ymd_opt(2010, 1, 1);
        assert!(validate_student(&early).is_err());
    }
}
