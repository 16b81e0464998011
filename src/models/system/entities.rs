use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

crate::string_enum! {
    pub enum SettingValueType {
        String => "string",
        Integer => "integer",
        Boolean => "boolean",
        JsonArray => "json_array",
    }
}

/// Settings the service reads at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownSettingKey {
    SchoolName,
    SchoolCountry,
    SchoolTimezone,
    AccessTokenExpiry,
    RefreshTokenExpiry,
    RefreshTokenRememberMeExpiry,
    UploadMaxSize,
    UploadAllowedTypes,
    ReminderDaysOverdue,
}

impl KnownSettingKey {
    pub const ALL: &'static [KnownSettingKey] = &[
        KnownSettingKey::SchoolName,
        KnownSettingKey::SchoolCountry,
        KnownSettingKey::SchoolTimezone,
        KnownSettingKey::AccessTokenExpiry,
        KnownSettingKey::RefreshTokenExpiry,
        KnownSettingKey::RefreshTokenRememberMeExpiry,
        KnownSettingKey::UploadMaxSize,
        KnownSettingKey::UploadAllowedTypes,
        KnownSettingKey::ReminderDaysOverdue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KnownSettingKey::SchoolName => "school.name",
            KnownSettingKey::SchoolCountry => "school.country",
            KnownSettingKey::SchoolTimezone => "school.timezone",
            KnownSettingKey::AccessTokenExpiry => "jwt.access_token_expiry",
            KnownSettingKey::RefreshTokenExpiry => "jwt.refresh_token_expiry",
            KnownSettingKey::RefreshTokenRememberMeExpiry => "jwt.refresh_token_remember_me_expiry",
            KnownSettingKey::UploadMaxSize => "upload.max_size",
            KnownSettingKey::UploadAllowedTypes => "upload.allowed_types",
            KnownSettingKey::ReminderDaysOverdue => "finance.reminder_days_overdue",
        }
    }

    pub fn value_type(&self) -> SettingValueType {
        match self {
            KnownSettingKey::SchoolName
            | KnownSettingKey::SchoolCountry
            | KnownSettingKey::SchoolTimezone => SettingValueType::String,
            KnownSettingKey::UploadAllowedTypes => SettingValueType::JsonArray,
            _ => SettingValueType::Integer,
        }
    }
}

impl std::str::FromStr for KnownSettingKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KnownSettingKey::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("Unknown setting key: {s}"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSetting {
    pub key: String,
    pub value: String,
    pub value_type: SettingValueType,
    pub description: Option<String>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub updated_by: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AcademicYear {
    pub id: i64,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_current: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_keys_round_trip_through_str() {
        for key in KnownSettingKey::ALL {
            assert_eq!(key.as_str().parse::<KnownSettingKey>(), Ok(*key));
        }
        assert!("school.motto".parse::<KnownSettingKey>().is_err());
        assert_eq!(
            KnownSettingKey::ReminderDaysOverdue.value_type(),
            SettingValueType::Integer
        );
    }
}
