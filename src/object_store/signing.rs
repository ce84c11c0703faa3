//! HMAC-signed download links for blobs served by this process.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use ring::hmac;
use ring::rand::{SecureRandom, SystemRandom};
use thiserror::Error;

use super::{encode_path, DownloadUrl};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Download link has expired")]
    Expired,
    #[error("Download link signature is invalid")]
    Invalid,
}

/// Signs and verifies `{base_url}/blobs/{key}?expires=..&signature=..` links.
pub struct UrlSigner {
    base_url: String,
    key: hmac::Key,
}

impl UrlSigner {
    pub fn new(base_url: &str, secret: &[u8]) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            key: hmac::Key::new(hmac::HMAC_SHA256, secret),
        }
    }

    /// Generate a fresh 32-byte secret for processes without a configured one.
    pub fn random_secret() -> Result<Vec<u8>, anyhow::Error> {
        let mut secret = vec![0u8; 32];
        SystemRandom::new()
            .fill(&mut secret)
            .map_err(|_| anyhow::anyhow!("Failed to generate download signing secret"))?;
        Ok(secret)
    }

    pub fn sign(&self, object_key: &str, expires_in: Duration, now: DateTime<Utc>) -> DownloadUrl {
        let expires_at = now + chrono::Duration::seconds(expires_in.as_secs() as i64);
        let expires = expires_at.timestamp();
        let tag = hmac::sign(&self.key, signing_input(object_key, expires).as_bytes());

        DownloadUrl {
            url: format!(
                "{}/blobs/{}?expires={expires}&signature={}",
                self.base_url,
                encode_path(object_key),
                hex::encode(tag.as_ref())
            ),
            expires_at: Utc.timestamp_opt(expires, 0).single().unwrap_or(expires_at),
        }
    }

    pub fn verify(
        &self,
        object_key: &str,
        expires: i64,
        signature: &str,
        now: DateTime<Utc>,
    ) -> Result<(), SignatureError> {
        let tag = hex::decode(signature).map_err(|_| SignatureError::Invalid)?;
        hmac::verify(&self.key, signing_input(object_key, expires).as_bytes(), &tag)
            .map_err(|_| SignatureError::Invalid)?;

        if now.timestamp() > expires {
            return Err(SignatureError::Expired);
        }
        Ok(())
    }
}

fn signing_input(object_key: &str, expires: i64) -> String {
    format!("{object_key}\n{expires}")
}
