use serde::Serialize;

use super::entities::{AcademicYear, SystemSetting};

/// Public school information.
#[derive(Debug, Serialize)]
pub struct SchoolInfoResponse {
    pub school_name: String,
    pub country: String,
    pub timezone: String,
    pub max_file_size: usize,
    pub allowed_file_types: Vec<String>,
    pub environment: String,
    pub current_academic_year: Option<AcademicYear>,
}

#[derive(Debug, Serialize)]
pub struct AdminSettingsListResponse {
    pub settings: Vec<SystemSetting>,
}

#[derive(Debug, Serialize)]
pub struct SettingResponse {
    pub setting: SystemSetting,
}

#[derive(Debug, Serialize)]
pub struct AcademicYearListResponse {
    pub items: Vec<AcademicYear>,
}
