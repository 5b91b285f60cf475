use std::io;

use thiserror::Error;

/// Errors of the challenge encryptor and its solver.
#[derive(Error, Debug)]
pub enum Error {
    /// AES only takes 16, 24 or 32 byte keys.
    #[error("invalid key size {0}, expected 16, 24 or 32 bytes")]
    KeySize(usize),

    #[error("openssl: {0}")]
    Crypto(#[from] openssl::error::ErrorStack),

    /// Payload can't even hold the IV and a single block.
    #[error("payload of {0} bytes is too short for an IV and one block")]
    Truncated(usize),

    #[error("ciphertext of {0} bytes is not block aligned")]
    BlockAlignment(usize),

    /// More than one candidate IV passed the plaintext check.
    #[error("{0} candidate IVs match, the known plaintext is too short to pick one")]
    AmbiguousIv(usize),

    #[error("invalid PKCS#7 padding")]
    Padding,

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
