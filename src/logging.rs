//! Logging setup.
//!
//! The library only emits through the `log` facade. Hosts that do not install
//! their own logger can call [`init_logging`] to get `env_logger` output
//! (filtered by `RUST_LOG`, defaulting to `chartlet=info`).

/// Install `env_logger` when the `debug` feature is enabled. Safe to call
/// more than once; later calls are ignored.
pub fn init_logging() {
    #[cfg(feature = "debug")]
    {
        let env = env_logger::Env::default().default_filter_or("chartlet=info");
        if env_logger::Builder::from_env(env).try_init().is_ok() {
            log::debug!("env_logger installed");
        }
    }
}
