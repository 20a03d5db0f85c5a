use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::AppError;

/// Salted Argon2id hash of `password` as a PHC string, the format expected
/// in ADMIN_PASSWORD_HASH.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("failed to hash password: {}", e)))
}

// Rejects anything that is not a PHC string, at startup rather than at first login
pub fn check_password_hash(phc: &str) -> Result<(), AppError> {
    PasswordHash::new(phc.trim()).map(|_| ()).map_err(|e| {
        AppError::Config(format!(
            "ADMIN_PASSWORD_HASH is not a PHC hash string ({}); generate one with `quill-blog hash-password`",
            e
        ))
    })
}

/// Checks `password` against the stored PHC hash on the blocking pool.
/// A hash that cannot be parsed never matches.
pub async fn verify_password(password: String, phc: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || {
        let parsed = match PasswordHash::new(phc.trim()) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::error!(error = %e, "stored admin password hash is malformed");
                return false;
            }
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
    .await
    .map_err(|e| AppError::Internal(format!("password verification task failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_are_salted_phc_strings() {
        let first = hash_password("password").unwrap();
        let second = hash_password("password").unwrap();
        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, second);
        assert!(check_password_hash(&first).is_ok());
    }

    #[test]
    fn non_phc_hash_is_a_config_error() {
        let digest = "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8";
        assert!(matches!(check_password_hash(digest), Err(AppError::Config(_))));
        assert!(matches!(check_password_hash(""), Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn verify_accepts_only_the_matching_password() {
        let hash = hash_password("password").unwrap();
        assert!(verify_password("password".into(), hash.clone()).await.unwrap());
        assert!(!verify_password("Password".into(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn malformed_hash_never_matches() {
        assert!(!verify_password("password".into(), "abc".into()).await.unwrap());
        assert!(!verify_password("password".into(), String::new()).await.unwrap());
    }
}
