use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Permission codes checked by the services.
pub mod perms {
    pub const VIEW_STUDENT: &str = "people.view_student";
    pub const ADD_STUDENT: &str = "people.add_student";
    pub const CHANGE_STUDENT: &str = "people.change_student";
    pub const DELETE_STUDENT: &str = "people.delete_student";
    pub const MARK_ATTENDANCE: &str = "academics.mark_attendance";
    pub const ENTER_GRADES: &str = "academics.enter_grades";
    pub const CREATE_INVOICE: &str = "finance.create_invoice";
    pub const RECORD_PAYMENT: &str = "finance.record_payment";
    pub const VERIFY_POP: &str = "finance.verify_pop";
    pub const MANAGE_APPLICATIONS: &str = "registrar.manage_applications";
    pub const VIEW_DASHBOARD: &str = "reports.view_dashboard";

    /// Seeded at startup with display names.
    pub const CATALOGUE: &[(&str, &str)] = &[
        (VIEW_STUDENT, "Can view student"),
        (ADD_STUDENT, "Can add student"),
        (CHANGE_STUDENT, "Can change student"),
        (DELETE_STUDENT, "Can delete student"),
        (MARK_ATTENDANCE, "Can mark attendance"),
        (ENTER_GRADES, "Can enter grades"),
        (CREATE_INVOICE, "Can create invoice"),
        (RECORD_PAYMENT, "Can record payment"),
        (VERIFY_POP, "Can verify proof of payment"),
        (MANAGE_APPLICATIONS, "Can manage applications"),
        (VIEW_DASHBOARD, "Can view dashboard"),
    ];
}

/// Role granted to every teacher account.
pub const TEACHER_ROLE_NAME: &str = "Teacher";
pub const TEACHER_ROLE_PERMISSIONS: &[&str] = &[perms::VIEW_STUDENT];

static PERMISSION_CODE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]*\.[a-z][a-z0-9_]*$").expect("valid regex"));

/// `app.action`, lowercase.
pub fn is_valid_permission_code(code: &str) -> bool {
    PERMISSION_CODE_REGEX.is_match(code)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Permission {
    pub id: i64,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub permissions: Vec<Permission>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoleAssignment {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub role_id: i64,
    pub role_name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_code_format() {
        assert!(is_valid_permission_code(perms::VERIFY_POP));
        assert!(is_valid_permission_code("library.lend_book2"));
        assert!(!is_valid_permission_code("finance"));
        assert!(!is_valid_permission_code("Finance.Verify"));
        assert!(!is_valid_permission_code("a.b.c"));
        assert!(!is_valid_permission_code(".verify"));
    }
}
