//! Error types for the application.

use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// Uplink errors (instance <-> controller connection).
#[derive(Debug, Error)]
pub enum UplinkError {
    #[error("Failed to connect to {addr}: {source}")]
    ConnectFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Uplink closed by remote")]
    Closed,

    #[error("Failed to encode relay event: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Uplink framing error: {0}")]
    Frame(#[from] tokio_util::codec::LinesCodecError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors delivering a message to a Discord channel.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The destination channel no longer exists (Discord error 10003).
    /// Suppressed at the dispatcher: logged once, event dropped.
    #[error("Unknown channel: {channel_id}")]
    UnknownChannel { channel_id: u64 },

    #[error("Discord client is not connected")]
    NotConnected,

    #[error("Send failed: {0}")]
    Send(#[from] serenity::Error),
}

/// Translation service errors.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("Translation service URL '{url}' is invalid")]
    InvalidUrl { url: String },

    #[error("Translation service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Translation service returned HTTP {status}")]
    Status { status: u16 },

    #[error("Malformed response from translation service: {message}")]
    MalformedResponse { message: String },
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for uplink operations.
pub type UplinkResult<T> = std::result::Result<T, UplinkError>;

/// Result type alias for delivery operations.
pub type DeliveryResult<T> = std::result::Result<T, DeliveryError>;

/// Result type alias for translation operations.
pub type TranslateResult<T> = std::result::Result<T, TranslateError>;
