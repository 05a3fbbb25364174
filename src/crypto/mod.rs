//! One-way digests and the passphrase cipher used for remembered logins.
//!
//! Both primitives sit behind narrow traits so the gate never depends on a
//! concrete algorithm:
//! - [`Hasher`] turns a passcode or a device fingerprint into a comparable digest
//! - [`Cipher`] seals and opens the remembered credential with a passphrase
//!
//! The defaults ([`Md5Hasher`], [`RabbitCipher`]) produce the same digests and
//! envelopes as the `crypto-js` calls `MD5(value).toString()` and
//! `Rabbit.encrypt(message, passphrase).toString()`, so credentials written by
//! the browser build of the gate keep opening.

mod envelope;
mod kdf;

pub use self::envelope::RabbitCipher;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid base64 encoding")]
    Base64,
    #[error("ciphertext is too short")]
    Truncated,
    #[error("missing salted envelope header")]
    MissingSalt,
    #[error("invalid key or iv length")]
    KeyLength,
    #[error("plaintext is not valid utf-8")]
    Utf8,
}

/// One-way digest used for every comparison the gate makes.
pub trait Hasher: Send + Sync {
    /// Digest `input`, hex encoded.
    fn digest(&self, input: &[u8]) -> String;
}

/// Symmetric encryption keyed by a passphrase.
pub trait Cipher: Send + Sync {
    /// Encrypt `plaintext`, returning a printable envelope.
    ///
    /// # Errors
    /// Returns an error if the key schedule cannot be built.
    fn encrypt(&self, plaintext: &str, passphrase: &str) -> Result<String, Error>;

    /// Open an envelope produced by [`Cipher::encrypt`].
    ///
    /// A wrong passphrase is not guaranteed to fail here; callers must
    /// validate what they get back.
    ///
    /// # Errors
    /// Returns an error if the envelope is malformed or the plaintext is not UTF-8.
    fn decrypt(&self, ciphertext: &str, passphrase: &str) -> Result<String, Error>;
}

/// MD5, lowercase hex.
#[derive(Debug, Clone, Copy, Default)]
pub struct Md5Hasher;

impl Hasher for Md5Hasher {
    fn digest(&self, input: &[u8]) -> String {
        format!("{:x}", md5::compute(input))
    }
}
