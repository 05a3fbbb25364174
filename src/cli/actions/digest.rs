use crate::{
    cli::prompt,
    crypto::{Hasher, Md5Hasher},
};
use anyhow::{anyhow, Result};
use secrecy::{ExposeSecret, SecretString};

#[derive(Debug)]
pub struct Args {
    pub passcode: Option<SecretString>,
}

/// Print the digest to put in the allow-list for a passcode.
/// # Errors
/// Returns an error if the passcode is empty or cannot be read.
pub async fn execute(args: Args) -> Result<()> {
    let passcode = match args.passcode {
        Some(passcode) => passcode,
        None => prompt::read_new_passcode().await?,
    };

    if passcode.expose_secret().is_empty() {
        return Err(anyhow!("passcode cannot be empty"));
    }

    println!("{}", Md5Hasher.digest(passcode.expose_secret().as_bytes()));

    Ok(())
}
