//! Logging setup.

use tracing_subscriber::EnvFilter;

use crate::CardroomError;

/// Installs a global `tracing` subscriber writing formatted events to
/// stdout.
///
/// `RUST_LOG` wins when set and valid; otherwise `default_directive`
/// (for example `"info"` or `"cardroom_roster=debug"`) is used. Fails if
/// a global subscriber is already installed.
pub fn init_tracing(default_directive: &str) -> Result<(), CardroomError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive).map_err(|e| {
            CardroomError::Telemetry(format!("bad filter {default_directive:?}: {e}"))
        })?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| CardroomError::Telemetry(e.to_string()))
}
