use once_cell::sync::Lazy;
use regex::Regex;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("Invalid username regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

static STUDENT_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9/_-]+$").expect("Invalid student code regex"));

pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if username.len() < 3 || username.len() > 32 {
        return Err("Username length must be between 3 and 32 characters");
    }
    if !USERNAME_RE.is_match(username) {
        return Err("Username must contain only letters, numbers, dots, underscores or hyphens");
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

pub fn validate_student_code(code: &str) -> Result<(), &'static str> {
    let code = code.trim();
    if code.is_empty() || code.len() > 32 {
        return Err("Student ID must be between 1 and 32 characters");
    }
    if !STUDENT_CODE_RE.is_match(code) {
        return Err("Student ID must contain only letters, numbers, '/', '_' or '-'");
    }
    Ok(())
}

/// Rejects blank values and values longer than `max` characters.
pub fn validate_required(value: &str, field: &str, max: usize) -> Result<(), String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(format!("{field} is required"));
    }
    if value.chars().count() > max {
        return Err(format!("{field} must be at most {max} characters"));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct PasswordValidationResult {
    pub is_valid: bool,
    pub errors: Vec<&'static str>,
}

impl PasswordValidationResult {
    pub fn error_message(&self) -> String {
        self.errors.join("; ")
    }
}

/// At least 8 characters with upper case, lower case and a digit, and not a
/// well-known weak password.
pub fn validate_password(password: &str) -> PasswordValidationResult {
    let mut errors = Vec::new();

    if password.len() < 8 {
        errors.push("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one digit");
    }

    let weak_passwords = [
        "password",
        "12345678",
        "123456789",
        "qwerty123",
        "admin123",
        "password1",
        "Password1",
        "Qwerty123",
        "Abcd1234",
        "Welcome1",
        "School123",
    ];
    if weak_passwords
        .iter()
        .any(|&weak| password.eq_ignore_ascii_case(weak))
    {
        errors.push("Password is too common, please choose a stronger password");
    }

    PasswordValidationResult {
        is_valid: errors.is_empty(),
        errors,
    }
}

pub fn validate_password_simple(password: &str) -> Result<(), String> {
    let result = validate_password(password);
    if result.is_valid {
        Ok(())
    } else {
        Err(result.error_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usernames() {
        assert!(validate_username("t.moyo").is_ok());
        assert!(validate_username("admin").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
    }

    #[test]
    fn test_emails() {
        assert!(validate_email("parent@example.co.zw").is_ok());
        assert!(validate_email("parent@example").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_student_codes() {
        assert!(validate_student_code("BB-2025/001").is_ok());
        assert!(validate_student_code("   ").is_err());
        assert!(validate_student_code("BB 001").is_err());
    }

    #[test]
    fn test_required() {
        assert!(validate_required("Moyo", "Last name", 10).is_ok());
        assert_eq!(
            validate_required("  ", "Last name", 10),
            Err("Last name is required".to_string())
        );
        assert!(validate_required("abcdefghijk", "Last name", 10).is_err());
    }

    #[test]
    fn test_valid_password() {
        assert!(validate_password("SecureP@ss1").is_valid);
        assert!(validate_password("SecurePass123").is_valid);
    }

    #[test]
    fn test_password_rules() {
        let result = validate_password("Ab1");
        assert!(
            result
                .errors
                .contains(&"Password must be at least 8 characters long")
        );
        assert!(!validate_password("abcd1234").is_valid);
        assert!(!validate_password("ABCD1234").is_valid);
        assert!(!validate_password("AbcdEfgh").is_valid);
        let result = validate_password("Password1");
        assert!(
            result
                .errors
                .contains(&"Password is too common, please choose a stronger password")
        );
    }
}
