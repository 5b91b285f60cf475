use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::Parser;
use tools::{
    attack::{known_prefix, recover_plaintext},
    challenge::{ChallengeConfig, DEFAULT_OUTPUT},
    logger::setup_logger,
    payload,
    store::read_payload,
};

/// Decrypts a payload written by sneaky-encrypt
#[derive(Parser, Debug)]
#[command(name = "sneaky-solve")]
struct Cli {
    /// Payload file, IV followed by the ciphertext
    #[arg(default_value = DEFAULT_OUTPUT)]
    file: PathBuf,

    /// Ignore the stored IV and brute force it from a known plaintext prefix
    #[arg(long, value_name = "TEXT")]
    known_prefix: Option<String>,
}

fn main() {
    setup_logger();

    if let Err(e) = try_main() {
        log::error!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn try_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ChallengeConfig::default();

    let data = read_payload(&cli.file)
        .with_context(|| format!("reading {}", cli.file.display()))?;

    let plaintext = match cli.known_prefix {
        None => config.open(&data).context("decryption failed")?,
        Some(prefix) => {
            let (stored, body) = payload::split(&data)?;
            let (iv, plaintext) =
                recover_plaintext(&config.key, body, known_prefix(prefix.as_bytes()))?
                    .ok_or_else(|| anyhow!("no weak IV turns the first block into {prefix:?}"))?;

            println!("iv : {}", String::from_utf8_lossy(&iv));
            if iv[..] != *stored {
                log::warn!("recovered IV differs from the one stored in the file");
            }
            plaintext
        }
    };

    println!("flag : {}", String::from_utf8_lossy(&plaintext));
    Ok(())
}
