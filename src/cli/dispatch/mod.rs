//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the [`Action`] the binary executes.

use crate::cli::actions::{digest, fingerprint, forget, unlock, Action};
use crate::cli::commands::{
    gate, state, ARG_EXEC, ARG_PASSCODE, CMD_DIGEST, CMD_FINGERPRINT, CMD_FORGET, CMD_UNLOCK,
};
use anyhow::{anyhow, Result};
use secrecy::SecretString;

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if the subcommand is missing or its arguments are inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let state = state::Options::parse(matches);

    match matches.subcommand() {
        Some((CMD_UNLOCK, sub_m)) => Ok(Action::Unlock(unlock::Args {
            gate: gate::Options::parse(sub_m)?,
            state,
            exec: sub_m
                .get_many::<String>(ARG_EXEC)
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
        })),
        Some((CMD_DIGEST, sub_m)) => Ok(Action::Digest(digest::Args {
            passcode: sub_m
                .get_one::<String>(ARG_PASSCODE)
                .map(|passcode| SecretString::from(passcode.clone())),
        })),
        Some((CMD_FORGET, _)) => Ok(Action::Forget(forget::Args { state })),
        Some((CMD_FINGERPRINT, _)) => Ok(Action::Fingerprint(fingerprint::Args { state })),
        Some((name, _)) => Err(anyhow!("unknown subcommand: {name}")),
        None => Err(anyhow!("missing subcommand")),
    }
}
