use crate::{cli::commands::state, gate};
use anyhow::{Context, Result};
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub state: state::Options,
}

/// Drop the remembered login of this device.
/// # Errors
/// Returns an error if the state directory cannot be opened or written.
pub fn execute(args: Args) -> Result<()> {
    let storage = args.state.open_storage()?;

    gate::clear_credential(&storage, gate::STORAGE_KEY)
        .context("failed to clear remembered login")?;

    info!(path = %storage.path().display(), "remembered login cleared");
    eprintln!("Remembered login removed");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStorage, Storage};

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_forget_clears_durable_credential() {
        let dir = tempfile::tempdir().unwrap();
        FileStorage::open(dir.path())
            .unwrap()
            .set(gate::STORAGE_KEY, "sealed", true)
            .unwrap();

        execute(Args {
            state: state::Options {
                state_dir: Some(dir.path().to_path_buf()),
                fingerprint: None,
            },
        })
        .unwrap();

        let reopened = FileStorage::open(dir.path()).unwrap();
        assert_eq!(reopened.get(gate::STORAGE_KEY, "").unwrap(), "");
    }
}
