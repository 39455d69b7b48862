//! Admin secret verification and backend access-token storage.

use keyring::Entry;
use sha2::{Digest, Sha256};
use thiserror::Error;

const KEYRING_SERVICE_NAME: &str = "Memorial";
const ACCESS_TOKEN_USER: &str = "access_token";

pub const ADMIN_SECRET_ENV: &str = "MEMORIAL_ADMIN_SECRET";
pub const ACCESS_TOKEN_ENV: &str = "MEMORIAL_ACCESS_TOKEN";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid admin secret digest: {0}")]
    InvalidDigest(String),
    #[error("Keyring Error: {0}")]
    Keyring(String),
    #[error("Token file error: {0}")]
    TokenFile(String),
}

/// Lowercase hex SHA-256 of `secret`.
pub fn digest_hex(secret: &str) -> String {
    format!("{:x}", Sha256::digest(secret.as_bytes()))
}

/// Holds only the digest of the admin secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminGate {
    digest: String,
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate").finish_non_exhaustive()
    }
}

impl AdminGate {
    pub fn from_secret(secret: &str) -> Self {
        AdminGate {
            digest: digest_hex(secret),
        }
    }

    pub fn from_digest(digest: &str) -> Result<Self, AuthError> {
        let digest = digest.trim().to_ascii_lowercase();
        if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AuthError::InvalidDigest(
                "expected 64 hexadecimal characters".into(),
            ));
        }
        Ok(AdminGate { digest })
    }

    /// Environment secret first, then the configured digest.
    ///
    /// `None` means no secret was deployed and admin mode stays unavailable.
    pub fn resolve(configured_digest: Option<&str>) -> Result<Option<Self>, AuthError> {
        match std::env::var(ADMIN_SECRET_ENV) {
            Ok(secret) if !secret.is_empty() => return Ok(Some(Self::from_secret(&secret))),
            _ => {}
        }
        match configured_digest {
            Some(d) if !d.trim().is_empty() => Self::from_digest(d).map(Some),
            _ => {
                tracing::warn!("No admin secret configured; admin mode is disabled");
                Ok(None)
            }
        }
    }

    pub fn verify(&self, input: &str) -> bool {
        let candidate = digest_hex(input);
        // Constant time over the whole digest.
        candidate.len() == self.digest.len()
            && candidate
                .bytes()
                .zip(self.digest.bytes())
                .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                == 0
    }
}

fn keyring_entry() -> Result<Entry, AuthError> {
    Entry::new(KEYRING_SERVICE_NAME, ACCESS_TOKEN_USER).map_err(|e| AuthError::Keyring(e.to_string()))
}

/// Backend access token from the environment, then the system keyring.
pub fn get_access_token() -> Result<Option<String>, AuthError> {
    if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV) {
        if !token.is_empty() {
            return Ok(Some(token));
        }
    }

    let from_keyring = keyring_entry().and_then(|entry| match entry.get_password() {
        Ok(token) => Ok(Some(token)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(AuthError::Keyring(e.to_string())),
    });
    fallback_token(from_keyring)
}

#[cfg(feature = "file-store")]
fn fallback_token(from_keyring: Result<Option<String>, AuthError>) -> Result<Option<String>, AuthError> {
    match from_keyring {
        Ok(Some(token)) => Ok(Some(token)),
        Ok(None) => file_store::load(),
        Err(e) => {
            tracing::warn!(error = %e, "Keyring unavailable, reading token file");
            file_store::load()
        }
    }
}

#[cfg(not(feature = "file-store"))]
fn fallback_token(from_keyring: Result<Option<String>, AuthError>) -> Result<Option<String>, AuthError> {
    from_keyring
}

pub fn store_access_token(token: &str) -> Result<(), AuthError> {
    let stored = keyring_entry().and_then(|entry| {
        entry
            .set_password(token)
            .map_err(|e| AuthError::Keyring(e.to_string()))
    });

    #[cfg(feature = "file-store")]
    {
        if let Err(e) = &stored {
            tracing::warn!(error = %e, "Keyring unavailable, writing token file");
            return file_store::save(token);
        }
    }

    stored?;
    tracing::info!("Access token stored in keyring");
    Ok(())
}

#[cfg(feature = "file-store")]
mod file_store {
    use super::AuthError;
    use serde::{Deserialize, Serialize};
    use std::path::PathBuf;

    #[derive(Serialize, Deserialize)]
    struct TokenFile {
        access_token: String,
    }

    fn path() -> Result<PathBuf, AuthError> {
        dirs::home_dir()
            .map(|home| home.join(".memorial").join("tokens.json"))
            .ok_or_else(|| AuthError::TokenFile("No home directory".into()))
    }

    pub(super) fn load() -> Result<Option<String>, AuthError> {
        let path = path()?;
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path)
            .map_err(|e| AuthError::TokenFile(format!("{}: {}", path.display(), e)))?;
        let file: TokenFile =
            serde_json::from_str(&text).map_err(|e| AuthError::TokenFile(e.to_string()))?;
        Ok(Some(file.access_token))
    }

    pub(super) fn save(token: &str) -> Result<(), AuthError> {
        let path = path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AuthError::TokenFile(e.to_string()))?;
        }
        let text = serde_json::to_string(&TokenFile {
            access_token: token.to_string(),
        })
        .map_err(|e| AuthError::TokenFile(e.to_string()))?;
        std::fs::write(&path, text)
            .map_err(|e| AuthError::TokenFile(format!("{}: {}", path.display(), e)))
    }
}
