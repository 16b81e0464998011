use chrono::NaiveDate;
use serde::Serialize;

use crate::models::academics::entities::{
    AttendanceCounts, AttendanceRow, EnrollmentDetail, GradeRow,
};
use crate::models::finance::entities::{InvoiceRow, Payment};
use crate::models::people::entities::Student;
use crate::models::registrar::entities::AdmissionApplication;
use crate::utils::money::Money;

#[derive(Debug, Serialize)]
pub struct ReportAttendance {
    #[serde(flatten)]
    pub counts: AttendanceCounts,
    pub records: Vec<AttendanceRow>,
}

#[derive(Debug, Serialize)]
pub struct ReportFees {
    pub invoices: Vec<InvoiceRow>,
    pub payments: Vec<Payment>,
    pub total_invoiced: Money,
    pub total_paid: Money,
    pub balance: Money,
}

#[derive(Debug, Serialize)]
pub struct StudentReport {
    pub student: Student,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub enrollment: Option<EnrollmentDetail>,
    pub attendance: ReportAttendance,
    pub grades: Vec<GradeRow>,
    pub fees: ReportFees,
}

/// Teacher note line on the monthly report.
#[derive(Debug, Clone, Serialize)]
pub struct NoteLine {
    pub date: Option<NaiveDate>,
    pub teacher_name: String,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct MonthlyReport {
    pub student: Student,
    pub month: NaiveDate,
    pub performance_notes: Vec<NoteLine>,
    pub behaviour_records: Vec<NoteLine>,
}

#[derive(Debug, Serialize)]
pub struct AdminDashboardResponse {
    pub today: NaiveDate,
    pub students_total: u64,
    pub students_active: u64,
    pub admissions_new: u64,
    pub admissions_reviewed: u64,
    pub admissions_accepted: u64,
    pub attendance_total: u64,
    pub attendance_present: u64,
    pub attendance_absent: u64,
    pub attendance_late: u64,
    pub invoices_total: u64,
    pub invoices_paid: u64,
    pub invoices_pending: u64,
    pub invoiced_sum: Money,
    pub paid_sum: Money,
    pub balance: Money,
    pub recent_applications: Vec<AdmissionApplication>,
    pub recent_invoices: Vec<InvoiceRow>,
    pub recent_absences: Vec<AttendanceRow>,
}
