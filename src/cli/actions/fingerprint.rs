use crate::{
    cli::commands::state,
    crypto::{Hasher, Md5Hasher},
    fingerprint::{self, DeviceFingerprint, StaticFingerprint},
};
use anyhow::{Context, Result};
use secrecy::ExposeSecret;

#[derive(Debug)]
pub struct Args {
    pub state: state::Options,
}

/// Print the digest a remembered login on this device is bound to.
/// # Errors
/// Returns an error if the fingerprint cannot be obtained.
pub async fn execute(args: Args) -> Result<()> {
    let fingerprint = match &args.state.fingerprint {
        Some(id) => fingerprint::acquire(&StaticFingerprint::new(id.expose_secret())).await,
        None => fingerprint::acquire(&DeviceFingerprint::default()).await,
    }
    .context("failed to obtain device fingerprint")?;

    println!(
        "{}",
        Md5Hasher.digest(fingerprint.visitor_id().expose_secret().as_bytes())
    );

    Ok(())
}
