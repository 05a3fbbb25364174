use crate::crypto::Cipher;
use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Remembered login, sealed with the raw device fingerprint.
///
/// The JSON field names match what the browser build of the gate writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(rename = "passcode")]
    pub passcode_digest: String,
    #[serde(rename = "fingerprint")]
    pub fingerprint_digest: String,
}

impl Credential {
    pub fn new(passcode_digest: impl Into<String>, fingerprint_digest: impl Into<String>) -> Self {
        Self {
            passcode_digest: passcode_digest.into(),
            fingerprint_digest: fingerprint_digest.into(),
        }
    }

    /// Serialize and encrypt with `visitor_id` as the passphrase.
    ///
    /// # Errors
    /// Returns an error if serialization or encryption fails.
    pub fn seal(&self, cipher: &dyn Cipher, visitor_id: &SecretString) -> Result<String> {
        let json = serde_json::to_string(self)?;
        cipher
            .encrypt(&json, visitor_id.expose_secret())
            .context("failed to seal credential")
    }

    /// Decrypt and parse a sealed credential.
    ///
    /// # Errors
    /// Returns an error if the envelope cannot be opened or is not a credential.
    pub fn open(cipher: &dyn Cipher, sealed: &str, visitor_id: &SecretString) -> Result<Self> {
        let json = cipher
            .decrypt(sealed, visitor_id.expose_secret())
            .context("failed to open credential")?;
        serde_json::from_str(&json).context("sealed value is not a credential")
    }
}
