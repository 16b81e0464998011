use chrono::NaiveDate;
use serde::Deserialize;

use super::entities::StudentStatus;
use crate::models::common::PaginationQuery;

#[derive(Debug, Deserialize)]
pub struct StudentListParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(alias = "q")]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateStudentRequest {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub admission_date: Option<NaiveDate>,
    #[serde(default)]
    pub grade: String,
    pub status: Option<StudentStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateStudentRequest {
    pub student_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub admission_date: Option<NaiveDate>,
    pub grade: Option<String>,
    pub status: Option<StudentStatus>,
}

#[derive(Debug, Deserialize)]
pub struct AddGuardianRequest {
    pub username: String,
}

/// Parent self-service link; all three values must match one student.
#[derive(Debug, Deserialize)]
pub struct LinkStudentRequest {
    pub student_id: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
}
