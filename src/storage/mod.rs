//! Key-value persistence with two lifetimes.
//!
//! Every slot holds a string. Writes pick a tier:
//! - durable: survives restarts
//! - session: lives as long as the store instance
//!
//! A key lives in one tier at a time. Writing it in one tier drops it from
//! the other, and reads look at the session tier first.

mod file;
mod memory;

pub use self::file::FileStorage;
pub use self::memory::MemoryStorage;

use anyhow::Result;
use std::collections::HashMap;

pub trait Storage: Send + Sync {
    /// Value stored under `key`, or `default` when there is none.
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str, default: &str) -> Result<String>;

    /// Store `value` under `key` in the durable or the session tier.
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be written.
    fn set(&self, key: &str, value: &str, durable: bool) -> Result<()>;
}

#[derive(Debug, Default)]
struct SessionTier {
    entries: HashMap<String, String>,
}

impl SessionTier {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn insert(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}
