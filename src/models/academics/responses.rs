use chrono::NaiveDate;
use serde::Serialize;

use super::entities::{
    AssessmentDetail, AttendanceCounts, AttendanceRow, AttendanceStatus, ClassGroupDetail,
    EnrollmentDetail, EnrollmentOutcome, GradeRow, RosterEntry, Subject, TimetableEntryDetail,
};
use crate::models::people::entities::Student;

#[derive(Debug, Serialize)]
pub struct SubjectListResponse {
    pub items: Vec<Subject>,
}

#[derive(Debug, Serialize)]
pub struct ClassGroupListResponse {
    pub items: Vec<ClassGroupDetail>,
}

#[derive(Debug, Serialize)]
pub struct RosterResponse {
    pub class_group: ClassGroupDetail,
    pub students: Vec<RosterEntry>,
}

#[derive(Debug, Serialize)]
pub struct EnrollmentResponse {
    pub enrollment: EnrollmentDetail,
    pub outcome: EnrollmentOutcome,
}

#[derive(Debug, Serialize)]
pub struct TimetableResponse {
    pub items: Vec<TimetableEntryDetail>,
    /// Linked student whose timetable is shown, for parents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<Student>,
}

#[derive(Debug, Serialize)]
pub struct TeacherTodayResponse {
    pub date: NaiveDate,
    pub day_of_week: i32,
    pub entries: Vec<TimetableEntryDetail>,
    pub classes: Vec<ClassGroupDetail>,
}

#[derive(Debug, Serialize)]
pub struct AttendanceSheetRow {
    #[serde(flatten)]
    pub student: RosterEntry,
    pub status: Option<AttendanceStatus>,
}

#[derive(Debug, Serialize)]
pub struct AttendanceSheetResponse {
    pub class_group: ClassGroupDetail,
    pub date: NaiveDate,
    pub rows: Vec<AttendanceSheetRow>,
}

#[derive(Debug, Serialize)]
pub struct MarkAttendanceResponse {
    pub date: NaiveDate,
    pub marked: usize,
    pub counts: AttendanceCounts,
}

#[derive(Debug, Serialize)]
pub struct AttendanceListResponse {
    pub items: Vec<AttendanceRow>,
}

#[derive(Debug, Serialize)]
pub struct AssessmentListResponse {
    pub items: Vec<AssessmentDetail>,
}

#[derive(Debug, Serialize)]
pub struct GradeSheetRow {
    #[serde(flatten)]
    pub student: RosterEntry,
    pub score: Option<f64>,
    pub comment: String,
}

#[derive(Debug, Serialize)]
pub struct GradeSheetResponse {
    pub assessment: AssessmentDetail,
    pub rows: Vec<GradeSheetRow>,
}

#[derive(Debug, Serialize)]
pub struct EnterGradesResponse {
    pub saved: usize,
    pub skipped: usize,
}

#[derive(Debug, Serialize)]
pub struct GradeListResponse {
    pub items: Vec<GradeRow>,
}

#[derive(Debug, Serialize)]
pub struct ParentHubResponse {
    pub student: Student,
    pub enrollment: Option<EnrollmentDetail>,
    pub timetable: Vec<TimetableEntryDetail>,
    pub attendance: Vec<AttendanceRow>,
    pub grades: Vec<GradeRow>,
}
