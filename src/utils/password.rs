use crate::config::AppConfig;
use crate::errors::BusyBeeError;
use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};

/// Argon2id hash using the configured cost parameters.
pub fn hash_password(password: &str) -> Result<String, BusyBeeError> {
    let config = AppConfig::get();
    let params = Params::new(
        config.argon2.memory_cost,
        config.argon2.time_cost,
        config.argon2.parallelism,
        None,
    )
    .map_err(|e| BusyBeeError::validation(format!("Invalid argon2 parameters: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| BusyBeeError::validation(format!("Password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(_) => false,
    }
}

/// Hashes on the blocking pool so bulk imports don't stall the executor.
pub async fn hash_password_blocking(password: String) -> Result<String, BusyBeeError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| BusyBeeError::validation(format!("Password hashing task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Str0ngPass").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("Str0ngPass", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("Str0ngPass", "not-a-hash"));
    }
}
