use std::{ffi::OsString, process::ExitCode};

use anyhow::Context;
use clap::Parser;
use tools::{challenge::ChallengeConfig, logger::setup_logger, random::iv::DigitIv};

/// Encrypts the input with AES-CBC and writes `IV || ciphertext` to encrypted.bin
#[derive(Parser, Debug)]
#[command(name = "sneaky-encrypt", override_usage = "sneaky-encrypt <Input>")]
struct Cli {
    /// Text to encrypt
    #[arg(value_name = "Input", allow_hyphen_values = true)]
    input: OsString,
}

fn main() -> ExitCode {
    setup_logger();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // usage goes to stdout, --help and --version are not failures
        Err(e) if e.use_stderr() => {
            println!("{}", e.render());
            return ExitCode::FAILURE;
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
    };

    if let Err(e) = try_main(cli) {
        log::error!("Error: {e:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn try_main(cli: Cli) -> anyhow::Result<()> {
    let config = ChallengeConfig::default();
    let mut ivs = DigitIv::from_time();

    config
        .seal(cli.input.as_encoded_bytes(), &mut ivs, &mut config.sink())
        .with_context(|| format!("encrypting into {}", config.output.display()))?;

    Ok(())
}
