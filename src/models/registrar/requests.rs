use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ApplicationListQuery {
    pub q: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateApplicationRequest {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub requested_grade: String,
    pub guardian_name: String,
    #[serde(default)]
    pub guardian_phone: String,
    #[serde(default)]
    pub guardian_email: String,
    #[serde(default)]
    pub guardian_relationship: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Deserialize)]
pub struct MarkStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct AdmitRequest {
    /// Student code to assign or reuse.
    pub student_id: String,
    pub class_group_id: i64,
    pub parent_username: Option<String>,
    /// Needed when the application has no date of birth.
    pub date_of_birth: Option<NaiveDate>,
}
