//! Unified error type for the cardroom client.

use cardroom_protocol::ProtocolError;
use cardroom_transport::TransportError;

/// Top-level error that wraps the member crates' errors.
///
/// Roster and deck operations never return it; they report through a
/// diagnostics sink instead. It covers setup: configuration, telemetry,
/// and any direct use of the transport or codec.
#[derive(Debug, thiserror::Error)]
pub enum CardroomError {
    /// A transport-level error (HTTP status, network, push channel).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A configuration value could not be used.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The tracing subscriber could not be installed.
    #[error("telemetry setup failed: {0}")]
    Telemetry(String),
}
