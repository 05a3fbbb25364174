use super::{Fingerprint, FingerprintAgent, FingerprintProvider};
use crate::crypto::{Hasher, Md5Hasher};
use anyhow::{anyhow, Result};
use std::{env::consts, path::PathBuf};
use tracing::{debug, instrument};

const MACHINE_ID_PATHS: [&str; 2] = ["/etc/machine-id", "/var/lib/dbus/machine-id"];

/// Fingerprint of the machine the process runs on.
///
/// Built from the hostname, the systemd/dbus machine id when one is readable,
/// and the OS/architecture pair. The components are digested into the visitor
/// id so the machine id itself never leaves this module.
#[derive(Debug, Clone)]
pub struct DeviceFingerprint {
    machine_id_paths: Vec<PathBuf>,
}

impl Default for DeviceFingerprint {
    fn default() -> Self {
        Self {
            machine_id_paths: MACHINE_ID_PATHS.iter().map(PathBuf::from).collect(),
        }
    }
}

impl DeviceFingerprint {
    /// Read the machine id from `paths` instead of the system locations.
    #[must_use]
    pub fn with_machine_id_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            machine_id_paths: paths,
        }
    }

    async fn machine_id(&self) -> Option<String> {
        for path in &self.machine_id_paths {
            if let Ok(raw) = tokio::fs::read_to_string(path).await {
                let id = raw.trim();
                if !id.is_empty() {
                    debug!("machine id read from {}", path.display());
                    return Some(id.to_string());
                }
            }
        }
        None
    }
}

/// Components collected by [`DeviceFingerprint::load`].
#[derive(Debug, Clone)]
pub struct DeviceAgent {
    components: Vec<String>,
}

impl FingerprintProvider for DeviceFingerprint {
    type Agent = DeviceAgent;

    #[instrument(skip_all)]
    async fn load(&self) -> Result<Self::Agent> {
        let mut components = Vec::with_capacity(3);

        if let Ok(hostname) = hostname::get() {
            components.push(hostname.to_string_lossy().to_string());
        }

        if let Some(machine_id) = self.machine_id().await {
            components.push(machine_id);
        }

        components.push(format!("{}:{}", consts::OS, consts::ARCH));

        debug!(components = components.len(), "device fingerprint loaded");

        Ok(DeviceAgent { components })
    }
}

impl FingerprintAgent for DeviceAgent {
    async fn get(&self) -> Result<Fingerprint> {
        if self.components.is_empty() {
            return Err(anyhow!("no device fingerprint components available"));
        }

        let joined = self.components.join("|");
        Ok(Fingerprint::new(Md5Hasher.digest(joined.as_bytes())))
    }
}
