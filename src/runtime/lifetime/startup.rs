use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::{MokaCacheWrapper, ObjectCache};
use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::rbac::entities::{TEACHER_ROLE_NAME, TEACHER_ROLE_PERMISSIONS, perms};
use crate::models::users::entities::{PreferredLanguage, UserRole};
use crate::models::users::requests::NewUser;
use crate::services::system::DynamicConfig;
use crate::storage::Storage;
use crate::utils::password::hash_password;
use crate::utils::random_code::generate_password;

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
}

fn create_cache() -> Arc<dyn ObjectCache> {
    let cache = MokaCacheWrapper::new(&AppConfig::get().cache);
    Arc::new(cache)
}

/// Loads the settings table into the dynamic config; falls back to the file
/// config when the table cannot be read.
async fn init_dynamic_config(storage: &Arc<dyn Storage>) {
    match storage.list_all_settings().await {
        Ok(settings) => {
            let settings_vec: Vec<(String, String)> =
                settings.into_iter().map(|s| (s.key, s.value)).collect();
            DynamicConfig::init(settings_vec).await;
        }
        Err(e) => {
            warn!(
                "Failed to load dynamic config from database: {}, using defaults",
                e
            );
            DynamicConfig::init(vec![]).await;
        }
    }
}

/// Permission catalogue plus the `Teacher` role.
pub async fn seed_rbac(storage: &dyn Storage) -> Result<()> {
    for (code, name) in perms::CATALOGUE {
        storage.ensure_permission(code, name).await?;
    }

    if storage.get_role_by_name(TEACHER_ROLE_NAME).await?.is_none() {
        let codes: Vec<String> = TEACHER_ROLE_PERMISSIONS
            .iter()
            .map(|c| c.to_string())
            .collect();
        storage
            .create_role(TEACHER_ROLE_NAME, "Default permissions for teaching staff", &codes)
            .await?;
        info!("Created role '{}'", TEACHER_ROLE_NAME);
    }
    Ok(())
}

/// Creates the principal account `admin` when no user exists yet.
async fn seed_admin(storage: &Arc<dyn Storage>) {
    match storage.count_users().await {
        Ok(count) if count > 0 => {
            debug!(
                "Database already has {} user(s), skipping admin seed",
                count
            );
            return;
        }
        Ok(_) => {
            info!("No users found in database, creating default admin account...");
        }
        Err(e) => {
            warn!("Failed to count users: {}, skipping admin seed", e);
            return;
        }
    }

    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
        let pwd = generate_password();
        warn!("==========================================================");
        warn!("  ADMIN PASSWORD NOT SET - USING GENERATED PASSWORD");
        warn!("  Generated admin password: {}", pwd);
        warn!("  Please save this password or set ADMIN_PASSWORD env var");
        warn!("==========================================================");
        pwd
    });

    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            warn!("Failed to hash admin password: {}, skipping admin seed", e);
            return;
        }
    };

    let admin = NewUser {
        username: "admin".to_string(),
        email: "admin@localhost".to_string(),
        password_hash,
        role: UserRole::Principal,
        first_name: "School".to_string(),
        last_name: "Administrator".to_string(),
        phone: None,
        preferred_language: PreferredLanguage::English,
        staff_code: None,
    };

    match storage.create_user(admin).await {
        Ok(user) => {
            info!(
                "Default admin account created successfully (ID: {}, username: {})",
                user.id, user.username
            );
        }
        Err(e) => {
            warn!("Failed to create admin account: {}", e);
        }
    }
}

/// Storage, dynamic settings, seed data and the object cache.
pub async fn prepare_server_startup() -> StartupContext {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let storage = crate::storage::create_storage()
        .await
        .expect("Failed to create storage backend");
    warn!("Storage backend initialized and migrations completed");

    init_dynamic_config(&storage).await;

    if let Err(e) = seed_rbac(storage.as_ref()).await {
        warn!("Failed to seed permissions: {}", e);
    }
    seed_admin(&storage).await;

    let cache = create_cache();
    warn!("Cache backend initialized");

    StartupContext { storage, cache }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::SeaOrmStorage;

    #[tokio::test]
    async fn test_seed_rbac_is_idempotent() {
        let storage = SeaOrmStorage::new_in_memory().await;
        seed_rbac(&storage).await.unwrap();
        seed_rbac(&storage).await.unwrap();

        let permissions = storage.list_permissions().await.unwrap();
        assert_eq!(permissions.len(), perms::CATALOGUE.len());

        let roles = storage.list_roles().await.unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].name, TEACHER_ROLE_NAME);
    }
}
