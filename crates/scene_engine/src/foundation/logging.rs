//! Logging setup for binaries built on the engine

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system.
///
/// Defaults to `info` unless `RUST_LOG` says otherwise. Calling it twice is
/// harmless; the second call is ignored.
pub fn init() {
    init_with_default("info");
}

/// Initialize the logging system with a custom default filter
pub fn init_with_default(default_filter: &str) {
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();
}
