//! Device fingerprint providers.
//!
//! Acquisition is two-step, like browser fingerprinting libraries: load a
//! provider instance ([`FingerprintProvider::load`]), then ask it for the
//! fingerprint ([`FingerprintAgent::get`]). Both steps are async and may
//! suspend indefinitely; callers add no timeout.

mod device;

pub use self::device::DeviceFingerprint;

use anyhow::Result;
use secrecy::SecretString;
use std::future::Future;

/// Opaque, stable identifier of the current device.
///
/// The raw visitor id doubles as key material for remembered credentials, so
/// it stays wrapped and is only exposed where it is used.
#[derive(Debug, Clone)]
pub struct Fingerprint {
    visitor_id: SecretString,
}

impl Fingerprint {
    pub fn new(visitor_id: impl Into<String>) -> Self {
        Self {
            visitor_id: SecretString::from(visitor_id.into()),
        }
    }

    #[must_use]
    pub const fn visitor_id(&self) -> &SecretString {
        &self.visitor_id
    }
}

/// A loaded provider instance.
pub trait FingerprintAgent: Send + Sync {
    fn get(&self) -> impl Future<Output = Result<Fingerprint>> + Send;
}

/// Entry point of a fingerprint library.
pub trait FingerprintProvider: Send + Sync {
    type Agent: FingerprintAgent;

    fn load(&self) -> impl Future<Output = Result<Self::Agent>> + Send;
}

/// Always reports the same visitor id.
///
/// Used to pin the identity of a device, or to pretend to be another one.
#[derive(Debug, Clone)]
pub struct StaticFingerprint {
    visitor_id: String,
}

impl StaticFingerprint {
    pub fn new(visitor_id: impl Into<String>) -> Self {
        Self {
            visitor_id: visitor_id.into(),
        }
    }
}

impl FingerprintProvider for StaticFingerprint {
    type Agent = Self;

    async fn load(&self) -> Result<Self::Agent> {
        Ok(self.clone())
    }
}

impl FingerprintAgent for StaticFingerprint {
    async fn get(&self) -> Result<Fingerprint> {
        Ok(Fingerprint::new(self.visitor_id.clone()))
    }
}

/// Load a provider and fetch the fingerprint in one go.
///
/// # Errors
/// Returns whatever the provider reports when loading or fingerprinting fails.
pub async fn acquire<P: FingerprintProvider>(provider: &P) -> Result<Fingerprint> {
    let agent = provider.load().await?;
    agent.get().await
}
