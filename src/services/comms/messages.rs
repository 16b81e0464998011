use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::warn;

use super::{CommsService, notify};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    comms::{entities::MAX_MESSAGE_LEN, requests::PostMessageRequest, responses::MessageResponse},
};
use crate::services::access::{ACCESS_DENIED, bad_request, forbidden, not_found};

pub(crate) fn clean_body(raw: &str) -> Result<&str, String> {
    let body = raw.trim();
    if body.is_empty() {
        return Err("Message cannot be empty".to_string());
    }
    if body.chars().count() > MAX_MESSAGE_LEN {
        return Err(format!("Message cannot exceed {MAX_MESSAGE_LEN} characters"));
    }
    Ok(body)
}

pub async fn post_message(
    service: &CommsService,
    thread_id: i64,
    body: PostMessageRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::require_user(request)?;
    let storage = service.get_storage(request);

    let Some(thread) = storage.get_thread(thread_id).await? else {
        return Ok(not_found(ErrorCode::ThreadNotFound, "Conversation not found"));
    };
    if !thread.is_participant(user.id) {
        return Ok(forbidden(ACCESS_DENIED));
    }
    let text = match clean_body(&body.body) {
        Ok(text) => text,
        Err(msg) => return Ok(bad_request(ErrorCode::BadRequest, msg)),
    };

    let message = storage.create_message(thread_id, user.id, text).await?;

    // A failed notification never loses the message.
    let mut notifications_sent = 0;
    if let Some(recipient) = storage.get_user_by_id(thread.counterpart(user.id)).await? {
        match notify::notify_user(storage.as_ref(), &recipient, "New message", text).await {
            Ok(sent) => notifications_sent = sent,
            Err(e) => warn!("Message {} notification failed: {}", message.id, e),
        }
    }

    Ok(HttpResponse::Created().json(ApiResponse::success(
        MessageResponse {
            message,
            notifications_sent,
        },
        "Message sent",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_body_rules() {
        assert_eq!(clean_body("  Hello  "), Ok("Hello"));
        assert!(clean_body("   ").is_err());
        assert!(clean_body(&"a".repeat(MAX_MESSAGE_LEN)).is_ok());
        assert!(clean_body(&"a".repeat(MAX_MESSAGE_LEN + 1)).is_err());
        // Multi-byte characters count once.
        assert!(clean_body(&"é".repeat(MAX_MESSAGE_LEN)).is_ok());
    }
}
