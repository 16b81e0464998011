//! Access rules shared by several services.

use actix_web::{HttpRequest, HttpResponse, web};
use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::errors::Result;
use crate::middlewares::require_jwt::user_cache_key;
use crate::middlewares::require_permission::user_has_perm;
use crate::models::people::entities::Student;
use crate::models::rbac::entities::perms;
use crate::models::users::entities::{User, UserRole};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub(crate) const ACCESS_DENIED: &str = "You do not have access to this page.";

pub(crate) fn forbidden(message: &str) -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse::error_empty(ErrorCode::Forbidden, message))
}

pub(crate) fn bad_request(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(code, message))
}

pub(crate) fn not_found(code: ErrorCode, message: &str) -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(code, message))
}

/// Drops the cached copy of an account so the next request reloads it.
pub(crate) async fn invalidate_user_cache(request: &HttpRequest, user_id: i64) {
    if let Some(cache) = request.app_data::<web::Data<Arc<dyn ObjectCache>>>() {
        cache.remove(&user_cache_key(user_id)).await;
    }
}

/// Staff with the view permission, or a parent linked to the student.
pub(crate) async fn can_view_student(
    storage: &dyn Storage,
    user: &User,
    student_id: i64,
) -> Result<bool> {
    if user.role == UserRole::Parent {
        return storage.is_guardian(user.id, student_id).await;
    }
    user_has_perm(storage, user, perms::VIEW_STUDENT).await
}

/// Principal, admin or teacher, or a parent linked to the student.
pub(crate) async fn can_see_student_records(
    storage: &dyn Storage,
    user: &User,
    student_id: i64,
) -> Result<bool> {
    if user.role.is_staff() {
        return Ok(true);
    }
    storage.is_guardian(user.id, student_id).await
}

/// Picks one of a parent's linked students. With a requested id, that student
/// if linked and `None` otherwise; without one, the first linked student.
pub(crate) async fn select_child(
    storage: &dyn Storage,
    parent_id: i64,
    requested: Option<i64>,
) -> Result<Option<Student>> {
    let children = storage.list_children(parent_id).await?;
    Ok(match requested {
        Some(id) => children.into_iter().find(|s| s.id == id),
        None => children.into_iter().next(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::people::requests::CreateStudentRequest;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::users::tests::new_user;
    use chrono::NaiveDate;

    fn student(code: &str, last: &str) -> CreateStudentRequest {
        CreateStudentRequest {
            student_id: code.to_string(),
            first_name: "Rudo".to_string(),
            last_name: last.to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(2015, 5, 1).unwrap(),
            admission_date: None,
            grade: "Grade 4".to_string(),
            status: None,
        }
    }

    #[tokio::test]
    async fn test_parent_sees_only_linked_students() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let parent = storage.create_user(new_user("mum", UserRole::Parent)).await.unwrap();
        let teacher = storage.create_user(new_user("teach", UserRole::Teacher)).await.unwrap();
        let mine = storage.create_student(student("BB001", "Ncube")).await.unwrap();
        let other = storage.create_student(student("BB002", "Dube")).await.unwrap();
        storage.add_guardian(mine.id, parent.id).await.unwrap();

        assert!(can_view_student(&storage, &parent, mine.id).await.unwrap());
        assert!(!can_view_student(&storage, &parent, other.id).await.unwrap());
        assert!(can_view_student(&storage, &teacher, other.id).await.unwrap());
        assert!(can_see_student_records(&storage, &teacher, other.id).await.unwrap());
        assert!(!can_see_student_records(&storage, &parent, other.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_select_child() {
        let storage = SeaOrmStorage::new_in_memory().await;
        let parent = storage.create_user(new_user("dad", UserRole::Parent)).await.unwrap();
        let first = storage.create_student(student("BB010", "Moyo")).await.unwrap();
        let second = storage.create_student(student("BB011", "Moyo")).await.unwrap();
        let stranger = storage.create_student(student("BB012", "Sibanda")).await.unwrap();
        storage.add_guardian(first.id, parent.id).await.unwrap();
        storage.add_guardian(second.id, parent.id).await.unwrap();

        let picked = select_child(&storage, parent.id, Some(second.id)).await.unwrap();
        assert_eq!(picked.map(|s| s.id), Some(second.id));
        assert!(select_child(&storage, parent.id, Some(stranger.id)).await.unwrap().is_none());
        assert!(select_child(&storage, parent.id, None).await.unwrap().is_some());
    }
}
