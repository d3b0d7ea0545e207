use crate::error::BlogResult;

use anyhow::Context;
use argon2::password_hash::SaltString;
use argon2::Argon2;
use entrait::entrait_export as entrait;

/// Warning: This should not implement Debug in production
#[derive(Clone, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct CleartextPassword(pub String);

impl<S: Into<String>> From<S> for CleartextPassword {
    fn from(s: S) -> Self {
        Self(s.into())
    }
}

impl AsRef<str> for CleartextPassword {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PasswordHash(pub String);

impl<S: Into<String>> From<S> for PasswordHash {
    fn from(s: S) -> Self {
        Self(s.into())
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

#[entrait(pub HashPassword, no_deps, mock_api=HashPasswordMock)]
async fn hash_password(password: CleartextPassword) -> BlogResult<PasswordHash> {
    // Argon2 hashing is designed to be computationally intensive,
    // so we need to do this on a blocking thread.
    tokio::task::spawn_blocking(move || -> BlogResult<PasswordHash> {
        let salt = SaltString::generate(rand::thread_rng());
        Ok(
            argon2::PasswordHash::generate(Argon2::default(), password.0, &salt)
                .map_err(|e| anyhow::anyhow!("failed to generate password hash: {}", e))?
                .to_string()
                .into(),
        )
    })
    .await
    .context("panic when generating password hash")?
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::PasswordVerifier;

    #[tokio::test]
    async fn password_hashing_should_salt_and_verify() {
        let password = CleartextPassword("v3rys3cr3t".to_string());
        let app = entrait::Impl::new(());
        let hash = app.hash_password(password.clone()).await.unwrap();
        let other_hash = app.hash_password(password.clone()).await.unwrap();

        assert!(hash.as_ref().starts_with("$argon2"));
        assert_ne!(hash, other_hash);

        let parsed = argon2::PasswordHash::new(hash.as_ref()).unwrap();
        assert!(Argon2::default()
            .verify_password(password.as_ref().as_bytes(), &parsed)
            .is_ok());
        assert!(Argon2::default()
            .verify_password(b"wrong_password", &parsed)
            .is_err());
    }
}
