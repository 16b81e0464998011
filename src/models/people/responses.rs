use serde::Serialize;

use super::entities::{GuardianSummary, Student};
use crate::models::academics::entities::{AttendanceCounts, EnrollmentDetail};
use crate::models::common::PaginationInfo;
use crate::models::finance::entities::InvoiceSnapshot;

#[derive(Debug, Serialize)]
pub struct StudentListResponse {
    pub items: Vec<Student>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Serialize)]
pub struct StudentDetailResponse {
    pub student: Student,
    pub guardians: Vec<GuardianSummary>,
    pub enrollment: Option<EnrollmentDetail>,
}

#[derive(Debug, Serialize)]
pub struct StudentDashboardRow {
    pub student: Student,
    pub enrollment: Option<EnrollmentDetail>,
    pub attendance: AttendanceCounts,
    pub latest_invoice: Option<InvoiceSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct StudentDashboardResponse {
    pub items: Vec<StudentDashboardRow>,
}

#[derive(Debug, Serialize)]
pub struct ChildSummary {
    pub student: Student,
    pub enrollment: Option<EnrollmentDetail>,
}

#[derive(Debug, Serialize)]
pub struct MyChildrenResponse {
    pub items: Vec<ChildSummary>,
}
