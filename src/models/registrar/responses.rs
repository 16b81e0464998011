use serde::Serialize;

use super::entities::AdmissionApplication;
use crate::models::academics::entities::{EnrollmentDetail, EnrollmentOutcome};
use crate::models::people::entities::Student;
use crate::models::users::responses::ImportRowError;

#[derive(Debug, Serialize)]
pub struct ApplicationListResponse {
    pub items: Vec<AdmissionApplication>,
}

#[derive(Debug, Serialize)]
pub struct ApplicationDetailResponse {
    pub application: AdmissionApplication,
    pub can_manage: bool,
}

#[derive(Debug, Serialize)]
pub struct ApplicationResponse {
    pub application: AdmissionApplication,
}

#[derive(Debug, Serialize)]
pub struct AdmitResponse {
    pub application: AdmissionApplication,
    pub student: Student,
    pub student_created: bool,
    pub enrollment: Option<EnrollmentDetail>,
    pub enrollment_outcome: EnrollmentOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkAdmissionResponse {
    pub total_rows: usize,
    pub students_created: usize,
    pub students_existing: usize,
    pub enrollments_created: usize,
    pub enrollments_updated: usize,
    pub parents_created: usize,
    pub parents_linked: usize,
    pub skipped: usize,
    pub errors: Vec<ImportRowError>,
}
