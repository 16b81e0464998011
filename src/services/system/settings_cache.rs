//! In-process copy of the database-backed school settings.
//!
//! Loaded once at startup and refreshed key by key whenever an administrator
//! saves a setting. Readers fall back to the static configuration when a key
//! is missing or malformed.

use std::collections::HashMap;
use std::sync::OnceLock;
use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::models::system::entities::KnownSettingKey;

static DYNAMIC_CONFIG: OnceLock<RwLock<DynamicConfigCache>> = OnceLock::new();

const DEFAULT_SCHOOL_NAME: &str = "BusyBee School";
const DEFAULT_REMINDER_DAYS: i64 = 15;

#[derive(Debug, Default)]
struct DynamicConfigCache {
    settings: HashMap<String, String>,
    initialized: bool,
}

pub struct DynamicConfig;

impl DynamicConfig {
    /// Replaces the whole cache with `settings`.
    pub async fn init(settings: Vec<(String, String)>) {
        let cache = DYNAMIC_CONFIG.get_or_init(|| RwLock::new(DynamicConfigCache::default()));

        let mut guard = cache.write().await;
        guard.settings = settings.into_iter().collect();
        guard.initialized = true;

        tracing::info!("Loaded {} school settings", guard.settings.len());
    }

    pub async fn update(key: &str, value: &str) {
        let cache = DYNAMIC_CONFIG.get_or_init(|| RwLock::new(DynamicConfigCache::default()));
        let mut guard = cache.write().await;
        guard.settings.insert(key.to_string(), value.to_string());
        tracing::debug!("Setting refreshed: {} = {}", key, value);
    }

    async fn get_string(key: KnownSettingKey) -> Option<String> {
        let cache = DYNAMIC_CONFIG.get()?;
        let guard = cache.read().await;
        guard
            .settings
            .get(key.as_str())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    async fn get_i64(key: KnownSettingKey) -> Option<i64> {
        Self::get_string(key).await.and_then(|v| v.parse().ok())
    }

    async fn get_json_array(key: KnownSettingKey) -> Option<Vec<String>> {
        Self::get_string(key)
            .await
            .and_then(|v| serde_json::from_str(&v).ok())
    }

    pub async fn school_name() -> String {
        Self::get_string(KnownSettingKey::SchoolName)
            .await
            .unwrap_or_else(|| DEFAULT_SCHOOL_NAME.to_string())
    }

    pub async fn school_country() -> String {
        Self::get_string(KnownSettingKey::SchoolCountry)
            .await
            .unwrap_or_default()
    }

    pub async fn school_timezone() -> String {
        Self::get_string(KnownSettingKey::SchoolTimezone)
            .await
            .unwrap_or_default()
    }

    /// Minutes.
    pub async fn access_token_expiry() -> i64 {
        Self::get_i64(KnownSettingKey::AccessTokenExpiry)
            .await
            .unwrap_or_else(|| AppConfig::get().jwt.access_token_expiry)
    }

    /// Days.
    pub async fn refresh_token_expiry() -> i64 {
        Self::get_i64(KnownSettingKey::RefreshTokenExpiry)
            .await
            .unwrap_or_else(|| AppConfig::get().jwt.refresh_token_expiry)
    }

    /// Days.
    pub async fn refresh_token_remember_me_expiry() -> i64 {
        Self::get_i64(KnownSettingKey::RefreshTokenRememberMeExpiry)
            .await
            .unwrap_or_else(|| AppConfig::get().jwt.refresh_token_remember_me_expiry)
    }

    /// Bytes.
    pub async fn upload_max_size() -> usize {
        Self::get_i64(KnownSettingKey::UploadMaxSize)
            .await
            .and_then(|v| usize::try_from(v).ok())
            .unwrap_or_else(|| AppConfig::get().upload.max_size)
    }

    /// Lower-cased extensions with their leading dot.
    pub async fn upload_allowed_types() -> Vec<String> {
        Self::get_json_array(KnownSettingKey::UploadAllowedTypes)
            .await
            .unwrap_or_else(|| AppConfig::get().upload.allowed_types.clone())
            .into_iter()
            .map(|t| t.trim().to_lowercase())
            .collect()
    }

    pub async fn reminder_days_overdue() -> i64 {
        Self::get_i64(KnownSettingKey::ReminderDaysOverdue)
            .await
            .filter(|d| *d >= 0)
            .unwrap_or(DEFAULT_REMINDER_DAYS)
    }

    pub async fn is_initialized() -> bool {
        match DYNAMIC_CONFIG.get() {
            Some(cache) => cache.read().await.initialized,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The cache is process-wide, so every assertion lives in one test.
    #[tokio::test]
    async fn test_values_and_fallbacks() {
        DynamicConfig::init(vec![
            ("school.name".to_string(), "Hillside Primary".to_string()),
            ("finance.reminder_days_overdue".to_string(), "oops".to_string()),
            ("upload.allowed_types".to_string(), r#"[".PDF", ".png"]"#.to_string()),
        ])
        .await;
        assert!(DynamicConfig::is_initialized().await);
        assert_eq!(DynamicConfig::school_name().await, "Hillside Primary");
        assert_eq!(DynamicConfig::reminder_days_overdue().await, 15);
        assert_eq!(
            DynamicConfig::upload_allowed_types().await,
            vec![".pdf".to_string(), ".png".to_string()]
        );

        DynamicConfig::update("finance.reminder_days_overdue", "30").await;
        assert_eq!(DynamicConfig::reminder_days_overdue().await, 30);
    }
}
