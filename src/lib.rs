//! # Passgate
//!
//! A passcode gate: one form that accepts a shared secret, checks its digest
//! against a fixed allow-list, and can remember a successful login on the
//! current device.
//!
//! ## Remembered logins
//!
//! With "remember" checked, the gate stores a credential holding the passcode
//! digest and the device fingerprint digest, encrypted with the raw device
//! fingerprint. On the next start the credential is opened with the current
//! fingerprint and accepted only if both digests still check out. Anything
//! else (no credential, another device, a corrupted value) silently counts as
//! logged out and the slot is cleared.
//!
//! There is no server-side verification, no lockout and no rate limiting:
//! the gate keeps honest users out of the way, it does not resist brute force.
//!
//! Collaborators are injected through traits:
//! - [`crypto::Hasher`] / [`crypto::Cipher`] - digest and passphrase cipher
//! - [`fingerprint::FingerprintProvider`] - device identity
//! - [`storage::Storage`] - durable and session-scoped key-value slots
//! - [`notify::Notifier`] - user-facing notices

pub mod cli;
pub mod crypto;
pub mod fingerprint;
pub mod gate;
pub mod notify;
pub mod storage;

pub use gate::{AllowList, FormState, PasscodeGate, SilentOutcome, SubmitOutcome};

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
