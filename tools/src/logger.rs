use env_logger::{Builder, Env};

/// Sets up `env_logger` for the binaries. `RUST_LOG` overrides the default `warn`.
pub fn setup_logger() {
    let env = Env::default().default_filter_or("warn");

    if let Err(e) = Builder::from_env(env).format_timestamp(None).try_init() {
        eprintln!("Logger initialization failed: {e}");
    }
}
