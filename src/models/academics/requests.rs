use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;

use super::entities::{AssessmentType, AttendanceStatus};

#[derive(Debug, Deserialize)]
pub struct CreateSubjectRequest {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClassGroupListParams {
    pub academic_year_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateClassGroupRequest {
    pub name: String,
    #[serde(default)]
    pub grade_level: String,
    /// Defaults to the current academic year.
    pub academic_year_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEnrollmentRequest {
    pub student_id: i64,
    pub class_group_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateTimetableEntryRequest {
    pub class_group_id: i64,
    pub subject_id: i64,
    pub teacher_id: Option<i64>,
    pub day_of_week: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default)]
    pub room: String,
}

/// Selects one of a parent's linked students.
#[derive(Debug, Default, Deserialize)]
pub struct ChildQuery {
    pub student_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AttendanceSheetQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct MarkAttendanceRequest {
    pub date: Option<NaiveDate>,
    /// Student id to status; anything unrecognised counts as present.
    #[serde(default)]
    pub marks: HashMap<i64, String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AssessmentSearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAssessmentRequest {
    pub class_group_id: i64,
    pub subject_id: i64,
    pub title: String,
    pub assessment_type: AssessmentType,
    #[serde(default = "default_hundred")]
    pub max_score: f64,
    #[serde(default = "default_hundred")]
    pub weight: f64,
    pub date: NaiveDate,
}

fn default_hundred() -> f64 {
    100.0
}

#[derive(Debug, Deserialize)]
pub struct GradeEntryInput {
    pub student_id: i64,
    /// Number or numeric string; null or blank leaves the grade untouched.
    pub score: Option<serde_json::Value>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EnterGradesRequest {
    pub entries: Vec<GradeEntryInput>,
}

/// Validated attendance row handed to storage.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceMark {
    pub student_id: i64,
    pub status: AttendanceStatus,
}

/// Validated grade row handed to storage.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeUpsert {
    pub student_id: i64,
    pub score: f64,
    pub comment: String,
}

#[derive(Debug, Clone)]
pub struct NewTimetableEntry {
    pub class_group_id: i64,
    pub subject_id: i64,
    pub teacher_id: Option<i64>,
    pub day_of_week: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room: String,
}

#[derive(Debug, Clone)]
pub struct NewAssessment {
    pub class_group_id: i64,
    pub subject_id: i64,
    pub teacher_id: i64,
    pub title: String,
    pub assessment_type: AssessmentType,
    pub max_score: f64,
    pub weight: f64,
    pub date: NaiveDate,
}

/// Storage-level timetable filter; unset fields match everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimetableFilter {
    pub teacher_id: Option<i64>,
    pub class_group_id: Option<i64>,
    pub day_of_week: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marks_accept_string_keys() {
        let req: MarkAttendanceRequest =
            serde_json::from_str(r#"{"date":"2025-03-03","marks":{"12":"absent","13":"late"}}"#)
                .unwrap();
        assert_eq!(req.marks.get(&12).map(String::as_str), Some("absent"));
        assert_eq!(req.date, NaiveDate::from_ymd_opt(2025, 3, 3));
    }

    #[test]
    fn test_assessment_defaults() {
        let req: CreateAssessmentRequest = serde_json::from_str(
            r#"{"class_group_id":1,"subject_id":2,"title":"Quiz","assessment_type":"test","date":"2025-03-03"}"#,
        )
        .unwrap();
        assert_eq!(req.max_score, 100.0);
        assert_eq!(req.weight, 100.0);
    }
}
