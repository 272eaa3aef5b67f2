//! Logging setup.
//!
//! Every crate in the workspace logs through `tracing` macros and never
//! installs a subscriber itself. Binaries call [`init_tracing`] once at
//! startup.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info";

/// Installs a formatted stdout subscriber filtered by `RUST_LOG`.
///
/// `RUST_LOG=tokenward_session=debug` shows sweeps; the default `info`
/// shows logins and logouts. Calling this more than once is harmless:
/// only the first call installs anything.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
