//! Password hashing
//!
//! bcrypt is deliberately slow, so both directions run on the blocking pool.

use tokio::sync::OnceCell;

use crate::error::{Error, Result};

/// Hash checked when a login names no known user
static DECOY_HASH: OnceCell<String> = OnceCell::const_new();

/// Hash a plain-text password with the given bcrypt cost
pub async fn hash_password(password: String, cost: u32) -> Result<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| Error::Other(format!("Password hashing task failed: {}", e)))?
        .map_err(Error::from)
}

/// Check a plain-text password against a stored bcrypt hash.
/// A malformed stored hash counts as a mismatch.
pub async fn verify_password(password: String, hash: String) -> Result<bool> {
    let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| Error::Other(format!("Password verification task failed: {}", e)))?;

    match outcome {
        Ok(matches) => Ok(matches),
        Err(e) => {
            tracing::warn!("Stored password hash could not be checked: {}", e);
            Ok(false)
        }
    }
}

/// Run a full bcrypt check against a throwaway hash and report a mismatch.
/// Unknown emails then cost the same as wrong passwords.
pub async fn verify_decoy(password: String, cost: u32) -> Result<bool> {
    let hash = DECOY_HASH
        .get_or_try_init(|| hash_password("decoy-password".to_string(), cost))
        .await?;
    verify_password(password, hash.clone()).await?;
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum cost keeps the tests fast
    const TEST_COST: u32 = 4;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hash = hash_password("joepassword".to_string(), TEST_COST)
            .await
            .unwrap();
        assert_ne!(hash, "joepassword");
        assert!(verify_password("joepassword".to_string(), hash.clone())
            .await
            .unwrap());
        assert!(!verify_password("wrong".to_string(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_is_mismatch() {
        let result = verify_password("joepassword".to_string(), "not-a-hash".to_string()).await;
        assert!(!result.unwrap());
    }

    #[tokio::test]
    async fn test_invalid_cost_is_error() {
        assert!(hash_password("joepassword".to_string(), 1).await.is_err());
    }

    #[tokio::test]
    async fn test_decoy_never_matches() {
        assert!(!verify_decoy("joepassword".to_string(), TEST_COST).await.unwrap());
        assert!(!verify_decoy("decoy-password".to_string(), TEST_COST).await.unwrap());
        assert!(DECOY_HASH.get().is_some());
    }
}
