use crate::storage::FileStorage;
use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;
use std::path::PathBuf;

pub const ARG_STATE_DIR: &str = "state-dir";
pub const ARG_FINGERPRINT: &str = "fingerprint";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_STATE_DIR)
                .long(ARG_STATE_DIR)
                .help("Directory holding the remembered login (default: platform data directory)")
                .env("PASSGATE_STATE_DIR")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(ARG_FINGERPRINT)
                .long(ARG_FINGERPRINT)
                .help("Use this device identifier instead of the machine fingerprint")
                .env("PASSGATE_FINGERPRINT")
                .hide_env_values(true)
                .global(true),
        )
}

#[derive(Debug, Clone)]
pub struct Options {
    pub state_dir: Option<PathBuf>,
    pub fingerprint: Option<SecretString>,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        Self {
            state_dir: matches.get_one::<PathBuf>(ARG_STATE_DIR).cloned(),
            fingerprint: matches
                .get_one::<String>(ARG_FINGERPRINT)
                .map(|id| SecretString::from(id.clone())),
        }
    }

    /// Open the file store in the configured or default state directory.
    ///
    /// # Errors
    /// Returns an error if no directory can be determined or created.
    pub fn open_storage(&self) -> Result<FileStorage> {
        let dir = match &self.state_dir {
            Some(dir) => dir.clone(),
            None => FileStorage::default_dir()?,
        };
        FileStorage::open(&dir)
    }
}
