use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::academics::entities::EnrollmentOutcome;

crate::string_enum! {
    pub enum ApplicationStatus {
        New => "new",
        Reviewed => "reviewed",
        Accepted => "accepted",
        Rejected => "rejected",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdmissionApplication {
    pub id: i64,
    pub status: ApplicationStatus,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub requested_grade: String,
    pub guardian_name: String,
    pub guardian_phone: String,
    pub guardian_email: String,
    pub guardian_relationship: String,
    pub notes: String,
    pub admitted_student_id: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Everything the admit transaction needs, resolved up front.
#[derive(Debug, Clone)]
pub struct AdmitPlan {
    pub application_id: i64,
    pub student_code: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub grade: String,
    pub admission_date: NaiveDate,
    pub class_group_id: i64,
    pub parent_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct AdmitOutcome {
    pub application: AdmissionApplication,
    pub student_id: i64,
    pub student_created: bool,
    pub enrollment: EnrollmentOutcome,
}

/// How the parent of a bulk-admission row is resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum ParentSpec {
    None,
    Existing(i64),
    Create {
        username: String,
        email: String,
        password_hash: String,
    },
}

/// One parsed, validated row of a bulk admission file.
#[derive(Debug, Clone, PartialEq)]
pub struct AdmissionRow {
    pub row: usize,
    pub student_code: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub grade: String,
    pub class_group: String,
    pub academic_year: String,
    pub parent_username: String,
    pub parent_email: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdmissionRowOutcome {
    pub student_created: bool,
    pub enrollment: Option<EnrollmentOutcome>,
    pub parent_created: bool,
    pub parent_linked: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplicationCounts {
    pub total: u64,
    pub new: u64,
    pub reviewed: u64,
    pub accepted: u64,
    pub rejected: u64,
}

impl ApplicationCounts {
    pub fn add(&mut self, status: ApplicationStatus) {
        self.total += 1;
        match status {
            ApplicationStatus::New => self.new += 1,
            ApplicationStatus::Reviewed => self.reviewed += 1,
            ApplicationStatus::Accepted => self.accepted += 1,
            ApplicationStatus::Rejected => self.rejected += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_vocabulary() {
        assert_eq!("accepted".parse::<ApplicationStatus>(), Ok(ApplicationStatus::Accepted));
        assert!("admitted".parse::<ApplicationStatus>().is_err());
        assert_eq!(ApplicationStatus::ALL.len(), 4);
    }
}
