//! Path extractors that reject malformed parameters with the JSON envelope.

use actix_web::dev::Payload;
use actix_web::error::InternalError;
use actix_web::{FromRequest, HttpRequest, HttpResponse};
use futures_util::future::{Ready, ready};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{ApiResponse, ErrorCode};

static SETTING_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]*(\.[a-z][a-z0-9_]*)+$").expect("Invalid key regex"));

fn bad_path(message: String) -> actix_web::Error {
    InternalError::from_response(
        message.clone(),
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, message)),
    )
    .into()
}

fn positive_id(req: &HttpRequest, name: &str) -> Result<i64, actix_web::Error> {
    let raw = req.match_info().get(name).unwrap_or_default();
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(bad_path(format!("Invalid {name}: '{raw}'"))),
    }
}

macro_rules! id_extractor {
    ($(#[$meta:meta])* $name:ident, $param:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name(pub i64);

        impl FromRequest for $name {
            type Error = actix_web::Error;
            type Future = Ready<Result<Self, Self::Error>>;

            fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
                ready(positive_id(req, $param).map($name))
            }
        }
    };
}

id_extractor!(
    /// Positive `{id}` path segment.
    SafeIDI64,
    "id"
);
id_extractor!(SafeStudentIdI64, "student_id");

/// Dotted `{key}` path segment such as `school.name`.
#[derive(Debug, Clone)]
pub struct SafeSettingKey(pub String);

impl FromRequest for SafeSettingKey {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let raw = req.match_info().get("key").unwrap_or_default();
        if raw.len() <= 64 && SETTING_KEY_RE.is_match(raw) {
            ready(Ok(SafeSettingKey(raw.to_string())))
        } else {
            ready(Err(bad_path(format!("Invalid setting key: '{raw}'"))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn test_id_extraction() {
        let req = TestRequest::default().param("id", "42").to_http_request();
        let id = SafeIDI64::extract(&req).await.unwrap();
        assert_eq!(id.0, 42);

        for bad in ["0", "-3", "abc", ""] {
            let req = TestRequest::default().param("id", bad).to_http_request();
            assert!(SafeIDI64::extract(&req).await.is_err());
        }
    }

    #[actix_web::test]
    async fn test_setting_key_extraction() {
        let req = TestRequest::default()
            .param("key", "finance.reminder_days_overdue")
            .to_http_request();
        let key = SafeSettingKey::extract(&req).await.unwrap();
        assert_eq!(key.0, "finance.reminder_days_overdue");

        let req = TestRequest::default().param("key", "../etc").to_http_request();
        assert!(SafeSettingKey::extract(&req).await.is_err());
    }
}
