//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system
///
/// Honors `RUST_LOG`; defaults to `info` when it is unset. Safe to call
/// more than once, later calls are ignored.
pub fn init() {
    if let Err(e) =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init()
    {
        log::debug!("Logger already initialized: {}", e);
    }
}
