//! Password hashing using bcrypt
//!
//! bcrypt is intentionally CPU-intensive, so the async variants move the
//! work onto the blocking thread pool.

use anyhow::Result;

/// bcrypt work factor
pub const BCRYPT_COST: u32 = 10;

/// Password hashing service
pub struct PasswordService;

impl PasswordService {
    /// Hash a password with a fresh random salt (blocking)
    pub fn hash(password: &str) -> Result<String> {
        bcrypt::hash(password, BCRYPT_COST)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
    }

    /// Hash a password on the blocking thread pool
    pub async fn hash_async(password: String) -> Result<String> {
        tokio::task::spawn_blocking(move || Self::hash(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Check a password against a stored hash (blocking)
    ///
    /// A mismatch is `Ok(false)`; only a corrupt stored hash is an error.
    pub fn verify(password: &str, hash: &str) -> Result<bool> {
        bcrypt::verify(password, hash).map_err(|e| anyhow::anyhow!("Invalid hash format: {}", e))
    }

    /// Check a password on the blocking thread pool
    pub async fn verify_async(password: String, hash: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || Self::verify(&password, &hash))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = PasswordService::hash("pw123").unwrap();

        assert!(hash.starts_with("$2b$10$"));
        assert!(PasswordService::verify("pw123", &hash).unwrap());
        assert!(!PasswordService::verify("pw124", &hash).unwrap());
    }

    #[test]
    fn test_different_hashes_for_same_password() {
        let hash1 = PasswordService::hash("test_password").unwrap();
        let hash2 = PasswordService::hash("test_password").unwrap();

        // Random salt
        assert_ne!(hash1, hash2);
        assert!(PasswordService::verify("test_password", &hash1).unwrap());
        assert!(PasswordService::verify("test_password", &hash2).unwrap());
    }

    #[test]
    fn test_corrupt_hash_is_error() {
        assert!(PasswordService::verify("pw123", "not-a-bcrypt-hash").is_err());
    }

    #[tokio::test]
    async fn test_async_hash_and_verify() {
        let hash = PasswordService::hash_async("async_pw".to_string()).await.unwrap();

        assert!(PasswordService::verify_async("async_pw".to_string(), hash.clone()).await.unwrap());
        assert!(!PasswordService::verify_async("wrong".to_string(), hash).await.unwrap());
    }
}
