use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CommsService;
use crate::errors::BusyBeeError;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    comms::{
        entities::InboxScope,
        requests::{InboxQuery, StartThreadRequest},
        responses::{InboxResponse, StartThreadResponse, ThreadDetailResponse},
    },
    users::entities::{User, UserRole},
};
use crate::services::access::{ACCESS_DENIED, bad_request, forbidden, not_found};

pub(crate) fn inbox_scope(user: &User) -> InboxScope {
    match user.role {
        UserRole::Teacher => InboxScope::Teacher(user.id),
        UserRole::Parent => InboxScope::Parent(user.id),
        UserRole::Principal | UserRole::Admin => InboxScope::All,
    }
}

pub async fn inbox(
    service: &CommsService,
    query: InboxQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request);

    let items = storage
        .list_inbox(user.id, inbox_scope(&user), query.q)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        InboxResponse { items },
        "Inbox retrieved successfully",
    )))
}

/// Teachers open conversations with a parent about one of the parent's children.
pub async fn start_thread(
    service: &CommsService,
    body: StartThreadRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    if user.role != UserRole::Teacher {
        return Ok(forbidden(ACCESS_DENIED));
    }
    let storage = service.get_storage(request);

    let Some(student) = storage.get_student_by_code(body.student_id.trim()).await? else {
        return Ok(not_found(ErrorCode::StudentNotFound, "Student not found"));
    };
    let parent = storage
        .get_user_by_username(body.parent_username.trim())
        .await?
        .filter(|u| u.role == UserRole::Parent);
    let Some(parent) = parent else {
        return Ok(not_found(ErrorCode::UserNotFound, "Parent not found"));
    };
    if !storage.is_guardian(parent.id, student.id).await? {
        return Ok(bad_request(
            ErrorCode::StudentNotLinked,
            "That parent is not linked to this student.",
        ));
    }

    let (thread, created) = storage
        .get_or_create_thread(student.id, user.id, parent.id)
        .await?;
    let row = storage
        .get_inbox_row(thread.id, user.id)
        .await?
        .ok_or_else(|| BusyBeeError::not_found("Thread not found"))?;

    let response = StartThreadResponse {
        thread: row,
        created,
    };
    if created {
        Ok(HttpResponse::Created().json(ApiResponse::success(response, "Conversation started")))
    } else {
        Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Conversation already exists")))
    }
}

pub async fn thread_detail(
    service: &CommsService,
    thread_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request);

    let Some(thread) = storage.get_thread(thread_id).await? else {
        return Ok(not_found(ErrorCode::ThreadNotFound, "Conversation not found"));
    };
    let participant = thread.is_participant(user.id);
    if !participant && !user.role.is_staff_admin() {
        return Ok(forbidden(ACCESS_DENIED));
    }

    if participant {
        storage.mark_thread_read(thread_id, user.id).await?;
    }
    let row = storage
        .get_inbox_row(thread_id, user.id)
        .await?
        .ok_or_else(|| BusyBeeError::not_found("Conversation not found"))?;
    let messages = storage.list_messages(thread_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ThreadDetailResponse {
            thread: row,
            messages,
        },
        "Conversation retrieved successfully",
    )))
}
