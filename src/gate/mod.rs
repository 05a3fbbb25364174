//! The passcode gate.
//!
//! Two flows unlock it:
//! - [`PasscodeGate::submit`]: the user types a passcode, optionally asking the
//!   device to remember it
//! - [`PasscodeGate::silent_login`]: run once when the gate is shown, it opens
//!   a remembered credential with the current device fingerprint
//!
//! Either flow ends by handing control to the host through the
//! `on_passcode_correct` callback. The callback fires at most once per gate,
//! even when both flows succeed concurrently.
//!
//! The remembered credential is encrypted with the raw fingerprint while the
//! fingerprint digest inside it is what gets compared. Using one secret both
//! as key material and as an identity check is kept for compatibility with
//! credentials written by the browser build.

mod allowlist;
mod credential;
mod form;

pub use self::allowlist::AllowList;
pub use self::credential::Credential;
pub use self::form::FormState;

use crate::{
    crypto::{Cipher, Hasher, Md5Hasher, RabbitCipher},
    fingerprint::{self, Fingerprint, FingerprintProvider},
    notify::Notifier,
    storage::Storage,
};
use anyhow::{Context, Result};
use secrecy::ExposeSecret;
use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tracing::{debug, info, instrument, warn};

/// Storage slot of the remembered credential.
pub const STORAGE_KEY: &str = "passcode";

/// Pause between the success notice and the callback, so the notice is seen.
pub const REDIRECT_DELAY: Duration = Duration::from_millis(500);

/// Everything the gate tells the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    PasscodeEmpty,
    PasscodeIncorrect,
    LoginSucceeded,
    AutoLoginSucceeded,
}

impl Notice {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::PasscodeEmpty => "Passcode cannot be empty",
            Self::PasscodeIncorrect => "Incorrect passcode",
            Self::LoginSucceeded => "Login succeeded, redirecting",
            Self::AutoLoginSucceeded => "Automatic login succeeded",
        }
    }

    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::PasscodeEmpty | Self::PasscodeIncorrect)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.message())
    }
}

/// Result of a manual login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Empty,
    Incorrect,
    Unlocked { remembered: bool },
}

/// Result of the silent login check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SilentOutcome {
    /// A remembered credential was valid for this device.
    Restored,
    /// Nothing usable was stored; the slot has been cleared.
    Cleared,
}

type Callback = Box<dyn Fn() + Send + Sync>;

pub struct PasscodeGate<P> {
    logo: Option<String>,
    title: String,
    passcodes: AllowList,
    on_passcode_correct: Callback,
    fingerprint: P,
    hasher: Arc<dyn Hasher>,
    cipher: Arc<dyn Cipher>,
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn Notifier>,
    storage_key: String,
    redirect_delay: Duration,
    unlocked: AtomicBool,
}

impl<P> fmt::Debug for PasscodeGate<P> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("PasscodeGate")
            .field("title", &self.title)
            .field("logo", &self.logo)
            .field("passcodes", &self.passcodes.len())
            .field("storage_key", &self.storage_key)
            .field("unlocked", &self.is_unlocked())
            .finish_non_exhaustive()
    }
}

impl<P> PasscodeGate<P> {
    /// Whether the callback has fired.
    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        self.unlocked.load(Ordering::SeqCst)
    }
}

impl<P: FingerprintProvider> PasscodeGate<P> {
    /// Gate with the MD5 hasher, the Rabbit cipher and the default slot.
    pub fn new(
        passcodes: AllowList,
        fingerprint: P,
        storage: Arc<dyn Storage>,
        notifier: Arc<dyn Notifier>,
        on_passcode_correct: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            logo: None,
            title: String::new(),
            passcodes,
            on_passcode_correct: Box::new(on_passcode_correct),
            fingerprint,
            hasher: Arc::new(Md5Hasher),
            cipher: Arc::new(RabbitCipher),
            storage,
            notifier,
            storage_key: STORAGE_KEY.to_string(),
            redirect_delay: REDIRECT_DELAY,
            unlocked: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_logo(mut self, logo: Option<String>) -> Self {
        self.logo = logo;
        self
    }

    #[must_use]
    pub fn with_hasher(mut self, hasher: Arc<dyn Hasher>) -> Self {
        self.hasher = hasher;
        self
    }

    #[must_use]
    pub fn with_cipher(mut self, cipher: Arc<dyn Cipher>) -> Self {
        self.cipher = cipher;
        self
    }

    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    #[must_use]
    pub const fn with_redirect_delay(mut self, delay: Duration) -> Self {
        self.redirect_delay = delay;
        self
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn logo(&self) -> Option<&str> {
        self.logo.as_deref()
    }

    /// Manual login.
    ///
    /// # Errors
    /// Returns an error if the device fingerprint cannot be obtained or the
    /// remembered credential cannot be written. Both only happen with
    /// `remember` checked.
    #[instrument(skip_all, fields(remember = form.remember))]
    pub async fn submit(&self, form: &FormState) -> Result<SubmitOutcome> {
        let passcode = form.passcode.expose_secret();
        if passcode.is_empty() {
            self.notify(Notice::PasscodeEmpty);
            return Ok(SubmitOutcome::Empty);
        }

        let digest = self.hasher.digest(passcode.as_bytes()).to_lowercase();
        if !self.passcodes.contains(&digest) {
            debug!("passcode digest is not in the allow-list");
            self.notify(Notice::PasscodeIncorrect);
            return Ok(SubmitOutcome::Incorrect);
        }

        if form.remember {
            self.remember(&digest).await?;
        }

        self.notify(Notice::LoginSucceeded);
        tokio::time::sleep(self.redirect_delay).await;
        self.fire();

        Ok(SubmitOutcome::Unlocked {
            remembered: form.remember,
        })
    }

    /// Silent login from a remembered credential.
    ///
    /// Never fails: anything that keeps the credential from validating
    /// (missing, undecryptable, foreign device, unknown passcode, provider
    /// error) counts as logged out and clears the slot.
    #[instrument(skip_all)]
    pub async fn silent_login(&self) -> SilentOutcome {
        match self.check_remembered().await {
            Ok(true) => {
                info!("remembered credential accepted");
                self.notify(Notice::AutoLoginSucceeded);
                self.fire();
                return SilentOutcome::Restored;
            }
            Ok(false) => debug!("no valid remembered credential"),
            Err(err) => debug!("remembered credential rejected: {err:#}"),
        }

        if let Err(err) = clear_credential(self.storage.as_ref(), &self.storage_key) {
            warn!("failed to clear remembered credential: {err:#}");
        }

        SilentOutcome::Cleared
    }

    async fn remember(&self, passcode_digest: &str) -> Result<()> {
        let fingerprint = self.fingerprint().await?;
        let credential = Credential::new(passcode_digest, self.fingerprint_digest(&fingerprint));
        let sealed = credential.seal(self.cipher.as_ref(), fingerprint.visitor_id())?;

        self.storage
            .set(&self.storage_key, &sealed, true)
            .context("failed to store remembered credential")?;

        debug!("credential remembered");

        Ok(())
    }

    async fn check_remembered(&self) -> Result<bool> {
        let sealed = self
            .storage
            .get(&self.storage_key, "")?
            .replace('"', "");
        if sealed.is_empty() {
            return Ok(false);
        }

        let fingerprint = self.fingerprint().await?;
        let credential = Credential::open(self.cipher.as_ref(), &sealed, fingerprint.visitor_id())?;

        Ok(self.passcodes.contains(&credential.passcode_digest)
            && credential.fingerprint_digest == self.fingerprint_digest(&fingerprint))
    }

    async fn fingerprint(&self) -> Result<Fingerprint> {
        fingerprint::acquire(&self.fingerprint)
            .await
            .context("failed to obtain device fingerprint")
    }

    fn fingerprint_digest(&self, fingerprint: &Fingerprint) -> String {
        self.hasher
            .digest(fingerprint.visitor_id().expose_secret().as_bytes())
    }

    fn notify(&self, notice: Notice) {
        self.notifier.notify(notice.message(), notice.is_error());
    }

    fn fire(&self) {
        if self.unlocked.swap(true, Ordering::SeqCst) {
            debug!("gate already unlocked, callback not repeated");
            return;
        }
        (self.on_passcode_correct)();
    }
}

/// Empty the credential slot.
///
/// The empty value is session-scoped, which also drops any durable copy.
///
/// # Errors
/// Returns an error if the store cannot be written.
pub fn clear_credential(storage: &dyn Storage, key: &str) -> Result<()> {
    storage.set(key, "", false)
}
