//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system.
///
/// `default_level` is used unless `RUST_LOG` is set. Calling this more than
/// once is harmless: later calls leave the first logger in place.
pub fn init(default_level: &str) {
    let env = env_logger::Env::default().default_filter_or(default_level);
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("logger already initialized, keeping existing configuration");
    }
}
