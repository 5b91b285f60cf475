use std::path::PathBuf;

use crate::{
    error::Result,
    payload,
    random::iv::IvSource,
    store::{FileSink, PayloadSink},
};

/// Key shared by the encryptor and the solver.
pub const DEFAULT_KEY: &[u8; 16] = b"1337133713371337";

pub const DEFAULT_OUTPUT: &str = "encrypted.bin";

/// Everything the challenge binary has baked in.
#[derive(Clone, Debug)]
pub struct ChallengeConfig {
    pub key: Vec<u8>,
    pub output: PathBuf,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            key: DEFAULT_KEY.to_vec(),
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

impl ChallengeConfig {
    pub fn sink(&self) -> FileSink {
        FileSink::new(&self.output)
    }

    /// Encrypts `plaintext` and hands the payload to `sink`.
    ///
    /// Nothing reaches the sink unless encryption succeeded.
    pub fn seal(
        &self,
        plaintext: &[u8],
        ivs: &mut impl IvSource,
        sink: &mut impl PayloadSink,
    ) -> Result<Vec<u8>> {
        let payload = payload::encrypt(&self.key, plaintext, ivs)?;
        sink.write(&payload)?;
        log::trace!("payload {}", hex::encode(&payload));
        Ok(payload)
    }

    /// Reads the payload written by [`ChallengeConfig::seal`] and decrypts it.
    pub fn open(&self, payload: &[u8]) -> Result<Vec<u8>> {
        payload::decrypt(&self.key, payload)
    }
}
