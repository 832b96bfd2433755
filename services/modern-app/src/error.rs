use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort process startup
#[derive(Debug, Error)]
pub enum StartupError {
    /// Log file could not be created or opened for appending
    #[error("Failed to open log file {path:?}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Global subscriber already installed or filter rejected
    #[error("Failed to initialize logging: {0}")]
    Logging(String),

    /// Span exporter could not be built
    #[error("Failed to initialize OTLP exporter: {0}")]
    Telemetry(String),

    /// HTTP listener could not bind
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}
