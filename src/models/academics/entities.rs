use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subject {
    pub id: i64,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassGroup {
    pub id: i64,
    pub name: String,
    pub grade_level: String,
    pub academic_year_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassGroupDetail {
    #[serde(flatten)]
    pub class_group: ClassGroup,
    pub academic_year_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Enrollment {
    pub id: i64,
    pub student_id: i64,
    pub class_group_id: i64,
    pub academic_year_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Enrollment joined with its class group and academic year.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrollmentDetail {
    pub id: i64,
    pub student_id: i64,
    pub class_group_id: i64,
    pub class_group_name: String,
    pub grade_level: String,
    pub academic_year_id: i64,
    pub academic_year_name: String,
    pub is_current_year: bool,
}

/// Outcome of placing a student in a class for a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentOutcome {
    Created,
    Moved,
    Unchanged,
}

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Name for a 0-based weekday (Monday = 0).
pub fn day_name(day_of_week: i32) -> Option<&'static str> {
    usize::try_from(day_of_week)
        .ok()
        .and_then(|d| DAY_NAMES.get(d).copied())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimetableEntry {
    pub id: i64,
    pub class_group_id: i64,
    pub subject_id: i64,
    pub teacher_id: Option<i64>,
    pub day_of_week: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimetableEntryDetail {
    #[serde(flatten)]
    pub entry: TimetableEntry,
    pub day_name: String,
    pub class_group_name: String,
    pub subject_code: String,
    pub subject_name: String,
    pub teacher_name: Option<String>,
}

crate::string_enum! {
    pub enum AttendanceStatus {
        Present => "present",
        Absent => "absent",
        Late => "late",
    }
}

impl AttendanceStatus {
    /// Unknown or blank marks count as present.
    pub fn parse_or_present(value: &str) -> Self {
        value.parse().unwrap_or(AttendanceStatus::Present)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttendanceRecord {
    pub id: i64,
    pub student_id: i64,
    pub class_group_id: i64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub recorded_by: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Attendance record with student and class names for listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttendanceRow {
    pub id: i64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub student_id: i64,
    pub student_code: String,
    pub student_name: String,
    pub class_group_name: String,
}

pub type AbsenceRow = AttendanceRow;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AttendanceCounts {
    pub present: u64,
    pub late: u64,
    pub absent: u64,
    pub total: u64,
    pub last_date: Option<NaiveDate>,
}

impl AttendanceCounts {
    pub fn add(&mut self, status: AttendanceStatus, date: NaiveDate) {
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::Late => self.late += 1,
            AttendanceStatus::Absent => self.absent += 1,
        }
        self.total += 1;
        if self.last_date.is_none_or(|d| d < date) {
            self.last_date = Some(date);
        }
    }
}

/// Enrolled student as listed on class sheets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RosterEntry {
    pub student_id: i64,
    pub student_code: String,
    pub first_name: String,
    pub last_name: String,
}

crate::string_enum! {
    pub enum AssessmentType {
        Test => "test",
        Exam => "exam",
        Assignment => "assignment",
        Project => "project",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assessment {
    pub id: i64,
    pub class_group_id: i64,
    pub subject_id: i64,
    pub teacher_id: i64,
    pub title: String,
    pub assessment_type: AssessmentType,
    pub max_score: f64,
    pub weight: f64,
    pub date: NaiveDate,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssessmentDetail {
    #[serde(flatten)]
    pub assessment: Assessment,
    pub class_group_name: String,
    pub subject_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Grade {
    pub id: i64,
    pub assessment_id: i64,
    pub student_id: i64,
    pub score: f64,
    pub comment: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Grade joined with its assessment for student-facing listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GradeRow {
    pub id: i64,
    pub student_id: i64,
    pub student_code: String,
    pub student_name: String,
    pub assessment_id: i64,
    pub assessment_title: String,
    pub assessment_type: AssessmentType,
    pub subject_name: String,
    pub date: NaiveDate,
    pub score: f64,
    pub max_score: f64,
    pub percentage: f64,
    pub comment: String,
}

pub fn percentage(score: f64, max_score: f64) -> f64 {
    if max_score <= 0.0 {
        return 0.0;
    }
    (score / max_score * 1000.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_names() {
        assert_eq!(day_name(0), Some("Monday"));
        assert_eq!(day_name(6), Some("Sunday"));
        assert_eq!(day_name(7), None);
        assert_eq!(day_name(-1), None);
    }

    #[test]
    fn test_attendance_defaults_to_present() {
        assert_eq!(AttendanceStatus::parse_or_present("LATE"), AttendanceStatus::Late);
        assert_eq!(AttendanceStatus::parse_or_present(""), AttendanceStatus::Present);
        assert_eq!(AttendanceStatus::parse_or_present("sick"), AttendanceStatus::Present);
    }

    #[test]
    fn test_attendance_counts() {
        let d1 = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        let mut counts = AttendanceCounts::default();
        counts.add(AttendanceStatus::Present, d2);
        counts.add(AttendanceStatus::Absent, d1);
        counts.add(AttendanceStatus::Late, d1);
        assert_eq!((counts.present, counts.absent, counts.late, counts.total), (1, 1, 1, 3));
        assert_eq!(counts.last_date, Some(d2));
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(45.0, 50.0), 90.0);
        assert_eq!(percentage(1.0, 3.0), 33.3);
        assert_eq!(percentage(10.0, 0.0), 0.0);
    }
}
