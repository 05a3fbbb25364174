use super::{SessionTier, Storage};
use anyhow::{anyhow, Result};
use std::{collections::HashMap, sync::Mutex};

#[derive(Debug, Default)]
struct Tiers {
    session: SessionTier,
    durable: HashMap<String, String>,
}

/// Both tiers in memory.
///
/// [`MemoryStorage::end_session`] drops the session tier and keeps the
/// durable one, which is what a restart looks like to the gate.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    tiers: Mutex<Tiers>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every session-scoped entry.
    pub fn end_session(&self) {
        if let Ok(mut tiers) = self.tiers.lock() {
            tiers.session.clear();
        }
    }

    /// Durable value under `key`, ignoring the session tier.
    #[must_use]
    pub fn durable(&self, key: &str) -> Option<String> {
        self.tiers
            .lock()
            .ok()
            .and_then(|tiers| tiers.durable.get(key).cloned())
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str, default: &str) -> Result<String> {
        let tiers = self
            .tiers
            .lock()
            .map_err(|_| anyhow!("storage lock poisoned"))?;

        Ok(tiers
            .session
            .get(key)
            .or_else(|| tiers.durable.get(key).cloned())
            .unwrap_or_else(|| default.to_string()))
    }

    fn set(&self, key: &str, value: &str, durable: bool) -> Result<()> {
        let mut tiers = self
            .tiers
            .lock()
            .map_err(|_| anyhow!("storage lock poisoned"))?;

        if durable {
            tiers.session.remove(key);
            tiers.durable.insert(key.to_string(), value.to_string());
        } else {
            tiers.durable.remove(key);
            tiers.session.insert(key, value);
        }

        Ok(())
    }
}
