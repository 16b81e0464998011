use serde::Serialize;

use super::entities::User;
use crate::models::common::PaginationInfo;

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub items: Vec<User>,
    pub pagination: PaginationInfo,
}

/// One rejected CSV row. `row` is the 1-based line number including the header.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImportRowError {
    pub row: usize,
    pub field: String,
    pub message: String,
}

impl ImportRowError {
    pub fn new(row: usize, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            row,
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct UserImportResponse {
    pub total: usize,
    pub created: usize,
    pub skipped: usize,
    pub errors: Vec<ImportRowError>,
}
