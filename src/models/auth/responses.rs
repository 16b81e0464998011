use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::academics::entities::AbsenceRow;
use crate::models::comms::entities::NotificationLog;
use crate::models::users::entities::User;
use crate::utils::money::Money;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub user: User,
    pub terms_accepted: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct UserInfoResponse {
    pub user: User,
    pub terms_accepted: bool,
}

#[derive(Debug, Serialize)]
pub struct ManagementDashboard {
    pub students_count: u64,
    pub teachers_count: u64,
    pub employees_count: u64,
    pub subjects_count: u64,
    pub unpaid_invoices: u64,
    pub finance_invoices_total: u64,
    pub finance_pending_verification: u64,
    pub finance_overdue: u64,
    pub finance_outstanding: Money,
    pub threads_count: u64,
    pub recent_notifications: Vec<NotificationLog>,
    pub admissions_total: u64,
    pub admissions_new: u64,
    pub admissions_accepted: u64,
    /// Last 30 days keyed by attendance status.
    pub attendance_summary: BTreeMap<String, u64>,
    pub recent_absences: Vec<AbsenceRow>,
}

#[derive(Debug, Serialize)]
pub struct TeacherDashboard {
    pub my_threads: u64,
    pub my_sent_messages: u64,
    pub class_groups_count: u64,
}

#[derive(Debug, Serialize)]
pub struct ParentDashboard {
    pub linked_students: u64,
    pub my_invoices: u64,
    pub my_threads: u64,
}

/// Role landing page payload, tagged with the dashboard kind.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DashboardResponse {
    Management(ManagementDashboard),
    Teacher(TeacherDashboard),
    Parent(ParentDashboard),
}
