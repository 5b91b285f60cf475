//! The challenge payload: `IV || AES-CBC(PKCS#7(plaintext))`.

use crate::{
    encrypt::{
        aes::{Aes, AesCbc},
        cipher::{pkcs7_pad_len, strip_pkcs7_padding, CipherCore, CipherMode},
    },
    error::{Error, Result},
    random::iv::{IvSource, IV_LEN},
};

pub const BLOCK_SIZE: usize = Aes::BYTES;

/// Length of the plaintext after PKCS#7 padding.
pub fn padded_len(len: usize) -> usize {
    len + pkcs7_pad_len(len, BLOCK_SIZE)
}

/// Length of the full payload for a plaintext of `len` bytes.
pub fn payload_len(len: usize) -> usize {
    IV_LEN + padded_len(len)
}

/// Encrypts `plaintext` under `key` with a fresh IV from `ivs`.
///
/// A key AES does not accept fails with [`Error::KeySize`] before any IV is drawn.
pub fn encrypt(key: &[u8], plaintext: &[u8], ivs: &mut impl IvSource) -> Result<Vec<u8>> {
    let core = Aes::init(key)?;

    let mut payload = Vec::with_capacity(payload_len(plaintext.len()));
    let iv = ivs.generate_iv();
    payload.extend_from_slice(&iv);

    let mut cbc = AesCbc::with_core(core, &iv, CipherMode::Encrypt);
    cbc.update(plaintext, &mut payload)?;
    cbc.end(&mut payload)?;

    log::debug!(
        "encrypted {} bytes into {} byte payload",
        plaintext.len(),
        payload.len()
    );
    debug_assert_eq!(payload.len(), payload_len(plaintext.len()));
    Ok(payload)
}

/// Splits a payload into its IV prefix and the ciphertext body.
pub fn split(payload: &[u8]) -> Result<(&[u8], &[u8])> {
    if payload.len() < IV_LEN + BLOCK_SIZE {
        return Err(Error::Truncated(payload.len()));
    }
    let (iv, body) = payload.split_at(IV_LEN);
    if body.len() % BLOCK_SIZE != 0 {
        return Err(Error::BlockAlignment(body.len()));
    }
    Ok((iv, body))
}

/// Decrypts the ciphertext body with the given IV and strips the padding.
pub fn decrypt_body(key: &[u8], iv: &[u8], body: &[u8]) -> Result<Vec<u8>> {
    let mut padded = Vec::with_capacity(body.len());
    let mut cbc = AesCbc::init(key, iv, CipherMode::Decrypt)?;
    cbc.update(body, &mut padded)?;
    cbc.end(&mut padded)?;

    let len = strip_pkcs7_padding(&padded, BLOCK_SIZE)?.len();
    padded.truncate(len);
    Ok(padded)
}

/// Inverse of [`encrypt`], takes the IV from the payload itself.
pub fn decrypt(key: &[u8], payload: &[u8]) -> Result<Vec<u8>> {
    let (iv, body) = split(payload)?;
    decrypt_body(key, iv, body)
}
