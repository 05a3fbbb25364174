use super::{kdf::evp_bytes_to_key, Cipher, Error};
use base64ct::{Base64, Encoding};
use rabbit::{
    cipher::{KeyIvInit, StreamCipher},
    Rabbit,
};
use rand::{rngs::OsRng, RngCore};

const SALTED_MAGIC: &[u8; 8] = b"Salted__";
const SALT_LEN: usize = 8;
const HEADER_LEN: usize = SALTED_MAGIC.len() + SALT_LEN;
const KEY_LEN: usize = 16;
const IV_LEN: usize = 8;

/// Rabbit stream cipher in the OpenSSL salted envelope:
/// `base64("Salted__" || salt || ciphertext)`.
///
/// Stream ciphers carry no authentication tag, so decrypting with the wrong
/// passphrase usually "succeeds" and yields noise. The gate relies on the
/// UTF-8, JSON and digest checks that follow to reject it.
#[derive(Debug, Clone, Copy, Default)]
pub struct RabbitCipher;

impl RabbitCipher {
    fn apply_keystream(passphrase: &str, salt: &[u8], buffer: &mut [u8]) -> Result<(), Error> {
        let (key, iv) = evp_bytes_to_key(passphrase.as_bytes(), salt, KEY_LEN, IV_LEN);
        let mut cipher = Rabbit::new_from_slices(&key, &iv).map_err(|_| Error::KeyLength)?;
        cipher.apply_keystream(buffer);
        Ok(())
    }

    fn seal(plaintext: &str, passphrase: &str, salt: [u8; SALT_LEN]) -> Result<String, Error> {
        let mut body = plaintext.as_bytes().to_vec();
        Self::apply_keystream(passphrase, &salt, &mut body)?;

        let mut envelope = Vec::with_capacity(HEADER_LEN + body.len());
        envelope.extend_from_slice(SALTED_MAGIC);
        envelope.extend_from_slice(&salt);
        envelope.extend_from_slice(&body);

        Ok(Base64::encode_string(&envelope))
    }
}

impl Cipher for RabbitCipher {
    fn encrypt(&self, plaintext: &str, passphrase: &str) -> Result<String, Error> {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        Self::seal(plaintext, passphrase, salt)
    }

    fn decrypt(&self, ciphertext: &str, passphrase: &str) -> Result<String, Error> {
        let raw = Base64::decode_vec(ciphertext.trim()).map_err(|_| Error::Base64)?;
        if raw.len() < HEADER_LEN {
            return Err(Error::Truncated);
        }

        let (header, body) = raw.split_at(HEADER_LEN);
        let (magic, salt) = header.split_at(SALTED_MAGIC.len());
        if magic != SALTED_MAGIC {
            return Err(Error::MissingSalt);
        }

        let mut plaintext = body.to_vec();
        Self::apply_keystream(passphrase, salt, &mut plaintext)?;

        String::from_utf8(plaintext).map_err(|_| Error::Utf8)
    }
}
