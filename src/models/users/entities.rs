use serde::{Deserialize, Serialize};

use crate::utils::jwt::{JwtUtils, TokenPair};

crate::string_enum! {
    /// Account role. Principal and admin form the staff management group.
    pub enum UserRole {
        Principal => "principal",
        Admin => "admin",
        Teacher => "teacher",
        Parent => "parent",
    }
}

impl UserRole {
    pub fn admin_roles() -> &'static [UserRole] {
        &[UserRole::Principal, UserRole::Admin]
    }

    pub fn teacher_roles() -> &'static [UserRole] {
        &[UserRole::Principal, UserRole::Admin, UserRole::Teacher]
    }

    pub fn all_roles() -> &'static [UserRole] {
        UserRole::ALL
    }

    pub fn is_staff_admin(&self) -> bool {
        matches!(self, UserRole::Principal | UserRole::Admin)
    }

    pub fn is_staff(&self) -> bool {
        !matches!(self, UserRole::Parent)
    }

    pub fn label(&self) -> &'static str {
        match self {
            UserRole::Principal => "Principal",
            UserRole::Admin => "Admin",
            UserRole::Teacher => "Teacher",
            UserRole::Parent => "Parent",
        }
    }
}

crate::string_enum! {
    pub enum UserStatus {
        Active => "active",
        Inactive => "inactive",
        Suspended => "suspended",
    }
}

crate::string_enum! {
    pub enum PreferredLanguage {
        English => "en",
        Shona => "sn",
        Ndebele => "nd",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub preferred_language: PreferredLanguage,
    pub staff_code: Option<String>,
    pub terms_accepted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    /// "First Last", falling back to the username when both are blank.
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let name = name.trim();
        if name.is_empty() {
            self.username.clone()
        } else {
            name.to_string()
        }
    }

    pub fn has_accepted_terms(&self) -> bool {
        self.terms_accepted_at.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    pub fn generate_token_pair(
        &self,
        access_token_expiry: chrono::TimeDelta,
        refresh_token_expiry: chrono::TimeDelta,
    ) -> Result<TokenPair, String> {
        JwtUtils::generate_token_pair(
            self.id,
            self.role.as_str(),
            Some(access_token_expiry),
            Some(refresh_token_expiry),
        )
        .map_err(|e| format!("Failed to generate token pair: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 1,
            username: "tmoyo".to_string(),
            email: "tmoyo@example.com".to_string(),
            password_hash: "hash".to_string(),
            role: UserRole::Teacher,
            status: UserStatus::Active,
            first_name: "Tendai".to_string(),
            last_name: "Moyo".to_string(),
            phone: None,
            preferred_language: PreferredLanguage::English,
            staff_code: None,
            terms_accepted_at: None,
            last_login: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_role_groups() {
        assert!(UserRole::Principal.is_staff_admin());
        assert!(UserRole::Admin.is_staff_admin());
        assert!(!UserRole::Teacher.is_staff_admin());
        assert!(UserRole::Teacher.is_staff());
        assert!(!UserRole::Parent.is_staff());
        assert_eq!(UserRole::all_roles().len(), 4);
        assert_eq!("PARENT".parse::<UserRole>(), Ok(UserRole::Parent));
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "teacher");
        assert_eq!(json["preferred_language"], "en");
    }

    #[test]
    fn test_full_name_falls_back_to_username() {
        let mut user = sample_user();
        assert_eq!(user.full_name(), "Tendai Moyo");
        user.first_name.clear();
        user.last_name = "  ".to_string();
        assert_eq!(user.full_name(), "tmoyo");
    }
}
