use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

crate::string_enum! {
    pub enum StudentStatus {
        Active => "active",
        Graduated => "graduated",
        Left => "left",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Student {
    pub id: i64,
    /// School-assigned code, stored upper-case.
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub admission_date: Option<NaiveDate>,
    pub grade: String,
    pub status: StudentStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Canonical form of a student code.
pub fn normalize_student_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Parent account linked to a student.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuardianSummary {
    pub user_id: i64,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_code_is_case_insensitive() {
        assert_eq!(normalize_student_code("  bb-0042 "), "BB-0042");
        assert_eq!(
            normalize_student_code("bb-0042"),
            normalize_student_code("BB-0042")
        );
    }

    #[test]
    fn test_status_vocabulary() {
        assert_eq!("Graduated".parse::<StudentStatus>(), Ok(StudentStatus::Graduated));
        assert!("expelled".parse::<StudentStatus>().is_err());
    }
}
