//! Terminal rendition of the login form.

use crate::gate::FormState;
use anyhow::{anyhow, Context, Result};
use dialoguer::{Confirm, Password};
use secrecy::SecretString;
use std::fmt::Write as _;

pub const HEADING: &str = "Enter passcode to continue";
pub const NOTICE: &str = "You are accessing a protected resource. Enter the passcode to continue.";

/// Header block: logo and title, then the heading and the notice.
#[must_use]
pub fn header(logo: Option<&str>, title: &str) -> String {
    let mut out = String::from("\n");
    match logo {
        Some(logo) => {
            let _ = writeln!(out, "{logo}  {title}");
        }
        None => {
            let _ = writeln!(out, "{title}");
        }
    }
    let _ = write!(out, "\n{HEADING}\n{NOTICE}\n\n");
    out
}

/// Passcode field plus the remember toggle.
///
/// The toggle is asked once and then keeps its value across attempts, like
/// a checkbox that stays ticked while the user retypes the passcode.
#[derive(Debug, Default)]
pub struct TerminalForm {
    remember: Option<bool>,
}

impl TerminalForm {
    /// Read the next submission; Enter submits.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be read.
    pub async fn read(&mut self) -> Result<FormState> {
        let ask_remember = self.remember.is_none();

        let (passcode, remember) = tokio::task::spawn_blocking(move || -> Result<_> {
            let passcode = Password::new()
                .with_prompt("Passcode")
                .allow_empty_password(true)
                .interact()
                .context("failed to read passcode")?;

            let remember = if ask_remember {
                Some(
                    Confirm::new()
                        .with_prompt("Sign in automatically on this device")
                        .default(true)
                        .interact()
                        .context("failed to read remember choice")?,
                )
            } else {
                None
            };

            Ok((passcode, remember))
        })
        .await
        .map_err(|e| anyhow!("prompt task failed: {e}"))??;

        if remember.is_some() {
            self.remember = remember;
        }

        Ok(FormState::new(passcode, self.remember.unwrap_or(true)))
    }
}

/// Prompt twice for a passcode that is about to be added to an allow-list.
///
/// # Errors
/// Returns an error if the terminal cannot be read.
pub async fn read_new_passcode() -> Result<SecretString> {
    let passcode = tokio::task::spawn_blocking(|| {
        Password::new()
            .with_prompt("Passcode")
            .with_confirmation("Repeat passcode", "Passcodes do not match")
            .interact()
            .context("failed to read passcode")
    })
    .await
    .map_err(|e| anyhow!("prompt task failed: {e}"))??;

    Ok(SecretString::from(passcode))
}
