use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::PeopleService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    people::{
        requests::LinkStudentRequest,
        responses::{ChildSummary, MyChildrenResponse},
    },
    users::entities::UserRole,
};
use crate::services::access::{ACCESS_DENIED, forbidden, not_found};

const NO_MATCH: &str = "No matching student found. Please confirm details with the school.";

pub async fn my_children(
    service: &PeopleService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    if user.role != UserRole::Parent {
        return Ok(forbidden(ACCESS_DENIED));
    }
    let storage = service.get_storage(request);

    let children = storage.list_children(user.id).await?;
    let ids: Vec<i64> = children.iter().map(|s| s.id).collect();
    let mut enrollments = storage.current_enrollments(&ids).await?;

    let items = children
        .into_iter()
        .map(|student| ChildSummary {
            enrollment: enrollments.remove(&student.id),
            student,
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        MyChildrenResponse { items },
        "Children retrieved successfully",
    )))
}

/// A parent proves the relationship with code, last name and date of birth.
pub async fn link_student(
    service: &PeopleService,
    body: LinkStudentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    if user.role != UserRole::Parent {
        return Ok(forbidden(ACCESS_DENIED));
    }
    let storage = service.get_storage(request);

    let found = storage
        .find_student_for_link(
            body.student_id.trim(),
            body.last_name.trim(),
            body.date_of_birth,
        )
        .await?;
    let Some(student) = found else {
        return Ok(not_found(ErrorCode::StudentNotFound, NO_MATCH));
    };

    if storage.add_guardian(student.id, user.id).await? {
        tracing::info!("Parent {} linked to student {}", user.id, student.student_id);
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(student, "Student linked")))
}
