use super::{SessionTier, Storage};
use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use std::{
    collections::BTreeMap,
    fs::{self, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::{debug, instrument, warn};

pub const STORAGE_FILE: &str = "storage.json";

/// Durable tier in a JSON file, session tier in memory.
///
/// The file is a flat object of string values. Writes go to a temporary file
/// that is renamed over the old one; on Unix the file is readable by the
/// owner only.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    session: Mutex<SessionTier>,
}

impl FileStorage {
    /// Open (and create if needed) the store inside `dir`.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create state directory {}", dir.display()))?;

        Ok(Self {
            path: dir.join(STORAGE_FILE),
            session: Mutex::default(),
        })
    }

    /// Platform data directory for passgate state.
    ///
    /// # Errors
    /// Returns an error if no home directory can be determined.
    pub fn default_dir() -> Result<PathBuf> {
        ProjectDirs::from("dev", "permesi", "passgate")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .context("could not determine a home directory for passgate state")
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read {}", self.path.display()))
            }
        };

        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", self.path.display()))
    }

    fn store(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let body = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options
            .open(&tmp)
            .with_context(|| format!("failed to open {}", tmp.display()))?;
        file.write_all(&body)?;
        file.sync_all()?;

        fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str, default: &str) -> Result<String> {
        let session = self
            .session
            .lock()
            .map_err(|_| anyhow!("session lock poisoned"))?;
        if let Some(value) = session.get(key) {
            return Ok(value);
        }
        drop(session);

        Ok(self
            .load()?
            .remove(key)
            .unwrap_or_else(|| default.to_string()))
    }

    #[instrument(skip(self, value), fields(path = %self.path.display()))]
    fn set(&self, key: &str, value: &str, durable: bool) -> Result<()> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("session lock poisoned"))?;

        // a broken file is replaced rather than blocking every later write
        let (mut entries, discarded) = match self.load() {
            Ok(entries) => (entries, false),
            Err(err) => {
                warn!("discarding unreadable storage file: {err:#}");
                (BTreeMap::new(), true)
            }
        };

        if durable {
            session.remove(key);
            entries.insert(key.to_string(), value.to_string());
            self.store(&entries)?;
        } else {
            session.insert(key, value);
            if entries.remove(key).is_some() || discarded {
                self.store(&entries)?;
            }
        }

        debug!(durable, "storage slot written");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_durable_value_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let storage = FileStorage::open(dir.path()).unwrap();
        storage.set("passcode", "sealed", true).unwrap();

        let reopened = FileStorage::open(dir.path()).unwrap();
        assert_eq!(reopened.get("passcode", "").unwrap(), "sealed");
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_session_value_is_not_written_to_disk() {
        let dir = tempfile::tempdir().unwrap();

        let storage = FileStorage::open(dir.path()).unwrap();
        storage.set("passcode", "sealed", false).unwrap();
        assert_eq!(storage.get("passcode", "").unwrap(), "sealed");

        let reopened = FileStorage::open(dir.path()).unwrap();
        assert_eq!(reopened.get("passcode", "none").unwrap(), "none");
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_session_write_removes_durable_value() {
        let dir = tempfile::tempdir().unwrap();

        let storage = FileStorage::open(dir.path()).unwrap();
        storage.set("passcode", "sealed", true).unwrap();
        storage.set("passcode", "", false).unwrap();

        let reopened = FileStorage::open(dir.path()).unwrap();
        assert_eq!(reopened.get("passcode", "none").unwrap(), "none");
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_other_keys_are_preserved() {
        let dir = tempfile::tempdir().unwrap();

        let storage = FileStorage::open(dir.path()).unwrap();
        storage.set("theme", "dark", true).unwrap();
        storage.set("passcode", "sealed", true).unwrap();
        storage.set("passcode", "", false).unwrap();

        assert_eq!(storage.get("theme", "").unwrap(), "dark");
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_corrupt_file_fails_reads_and_is_replaced_on_write() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(STORAGE_FILE), "{not json").unwrap();

        let storage = FileStorage::open(dir.path()).unwrap();
        assert!(storage.get("passcode", "").is_err());

        storage.set("passcode", "sealed", true).unwrap();
        assert_eq!(storage.get("passcode", "").unwrap(), "sealed");
    }

    #[cfg(unix)]
    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        storage.set("passcode", "sealed", true).unwrap();

        let mode = fs::metadata(storage.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
