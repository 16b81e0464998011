//! Unified error handling.
//!
//! Variants are generated by a macro so every error carries a stable code, a
//! type name and a message. The type doubles as an actix `ResponseError`, which
//! lets service code use `?` and still answer with the JSON envelope.

use std::fmt;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};

use crate::models::{ApiResponse, ErrorCode};

/// Generates the error enum together with:
/// - `code()` for the stable error code
/// - `error_type()` for the type name
/// - `message()` for the detail text
/// - snake_case constructors
macro_rules! define_busybee_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum BusyBeeError {
            $($variant(String),)*
        }

        impl BusyBeeError {
            pub fn code(&self) -> &'static str {
                match self {
                    $(BusyBeeError::$variant(_) => $code,)*
                }
            }

            pub fn error_type(&self) -> &'static str {
                match self {
                    $(BusyBeeError::$variant(_) => $type_name,)*
                }
            }

            pub fn message(&self) -> &str {
                match self {
                    $(BusyBeeError::$variant(msg) => msg,)*
                }
            }
        }

        paste::paste! {
            impl BusyBeeError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        BusyBeeError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_busybee_errors! {
    CacheConnection("E001", "Cache Connection Error"),
    DatabaseConfig("E002", "Database Configuration Error"),
    DatabaseConnection("E003", "Database Connection Error"),
    DatabaseOperation("E004", "Database Operation Error"),
    FileOperation("E005", "File Operation Error"),
    Validation("E006", "Validation Error"),
    NotFound("E007", "Resource Not Found"),
    Conflict("E008", "Resource Conflict"),
    Serialization("E009", "Serialization Error"),
    DateParse("E010", "Date Parse Error"),
    Authentication("E011", "Authentication Error"),
    Authorization("E012", "Authorization Error"),
    Import("E013", "Import Error"),
    Render("E014", "Render Error"),
}

impl BusyBeeError {
    /// Colored output for development logs.
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// API error code reported in the response envelope.
    pub fn api_code(&self) -> ErrorCode {
        match self {
            BusyBeeError::Validation(_) | BusyBeeError::DateParse(_) => ErrorCode::BadRequest,
            BusyBeeError::Import(_) => ErrorCode::ImportFileDataInvalid,
            BusyBeeError::NotFound(_) => ErrorCode::NotFound,
            BusyBeeError::Conflict(_) => ErrorCode::Conflict,
            BusyBeeError::Authentication(_) => ErrorCode::Unauthorized,
            BusyBeeError::Authorization(_) => ErrorCode::Forbidden,
            _ => ErrorCode::InternalServerError,
        }
    }

    /// Whether the message is safe to show to a client verbatim.
    fn is_client_error(&self) -> bool {
        !matches!(self.api_code(), ErrorCode::InternalServerError)
    }
}

impl fmt::Display for BusyBeeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for BusyBeeError {}

impl ResponseError for BusyBeeError {
    fn status_code(&self) -> StatusCode {
        match self.api_code() {
            ErrorCode::BadRequest | ErrorCode::ImportFileDataInvalid => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = if self.is_client_error() {
            self.message().to_string()
        } else {
            tracing::error!("{}", self.format_simple());
            "Internal server error".to_string()
        };
        HttpResponse::build(self.status_code())
            .json(ApiResponse::error_empty(self.api_code(), message))
    }
}

impl From<sea_orm::DbErr> for BusyBeeError {
    fn from(err: sea_orm::DbErr) -> Self {
        BusyBeeError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for BusyBeeError {
    fn from(err: std::io::Error) -> Self {
        BusyBeeError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for BusyBeeError {
    fn from(err: serde_json::Error) -> Self {
        BusyBeeError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for BusyBeeError {
    fn from(err: chrono::ParseError) -> Self {
        BusyBeeError::DateParse(err.to_string())
    }
}

impl From<csv::Error> for BusyBeeError {
    fn from(err: csv::Error) -> Self {
        BusyBeeError::Import(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BusyBeeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(BusyBeeError::cache_connection("test").code(), "E001");
        assert_eq!(BusyBeeError::validation("test").code(), "E006");
        assert_eq!(BusyBeeError::conflict("test").code(), "E008");
        assert_eq!(BusyBeeError::authorization("test").code(), "E012");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            BusyBeeError::not_found("test").error_type(),
            "Resource Not Found"
        );
        assert_eq!(
            BusyBeeError::validation("test").error_type(),
            "Validation Error"
        );
    }

    #[test]
    fn test_format_simple() {
        let err = BusyBeeError::validation("End date must be after start date.");
        let formatted = err.format_simple();
        assert!(formatted.contains("Validation Error"));
        assert!(formatted.contains("End date must be after start date."));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            BusyBeeError::validation("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            BusyBeeError::authentication("x").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            BusyBeeError::authorization("x").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            BusyBeeError::not_found("x").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            BusyBeeError::conflict("x").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            BusyBeeError::database_operation("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_db_error_conversion() {
        let err: BusyBeeError = sea_orm::DbErr::Custom("boom".into()).into();
        assert_eq!(err.code(), "E004");
        assert_eq!(err.api_code(), ErrorCode::InternalServerError);
    }
}
