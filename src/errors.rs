// Error types shared by the core and its adapters

use thiserror::Error;

/// Failures surfaced by the telemetry core.
///
/// None of these are fatal to the process: the session reports them as a
/// user-visible notice and degrades to its last stable state.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Credentials or session token rejected by the platform.
    #[error("unauthorized: {0}")]
    Auth(String),

    /// Login or bulk fetch could not reach the platform, or the platform
    /// answered with a non-auth failure.
    #[error("transport: {0}")]
    Transport(String),

    /// Live channel handshake, subscription, or connection failure.
    #[error("live channel: {0}")]
    LiveChannel(String),

    /// Malformed live message payload. Recoverable per message: logged and
    /// dropped while the connection stays up.
    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for TelemetryError {
    fn from(err: reqwest::Error) -> Self {
        TelemetryError::Transport(err.to_string())
    }
}
