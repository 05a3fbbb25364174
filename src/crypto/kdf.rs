/// OpenSSL `EVP_BytesToKey` with MD5 and a single iteration.
///
/// `D_i = MD5(D_{i-1} || passphrase || salt)`, concatenated until there are
/// enough bytes for the key followed by the iv.
pub(crate) fn evp_bytes_to_key(
    passphrase: &[u8],
    salt: &[u8],
    key_len: usize,
    iv_len: usize,
) -> (Vec<u8>, Vec<u8>) {
    let wanted = key_len + iv_len;
    let mut derived = Vec::with_capacity(wanted + 16);
    let mut previous: Option<md5::Digest> = None;

    while derived.len() < wanted {
        let mut context = md5::Context::new();
        if let Some(block) = previous {
            context.consume(block.0);
        }
        context.consume(passphrase);
        context.consume(salt);

        let block = context.compute();
        derived.extend_from_slice(&block.0);
        previous = Some(block);
    }

    derived.truncate(wanted);
    let iv = derived.split_off(key_len);

    (derived, iv)
}
