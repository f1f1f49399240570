//! Public SDK surface for Parley.
//!
//! This crate re-exports the config, core and server crates and provides a
//! small initialization helper to keep binary setup consistent.

/// Re-export for convenience.
pub use parley_rs_config as config;
pub use parley_rs_core as core;
/// Re-export for convenience.
pub use parley_rs_server as server;

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// Respects `RUST_LOG` and defaults to `info`. This is a no-op without the
/// feature.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .format_timestamp_millis()
            .try_init();
    }
}
