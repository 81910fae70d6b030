//! Error types

use std::io;
use thiserror::Error;

/// Crate result type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the driver side of the crate
///
/// The socket factory itself reports only `std::io::Error`; configuration
/// problems there are logged and never become errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Socket allocation, bind, connect or read/write failure
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid configuration or connection string
    #[error("configuration error: {0}")]
    Config(String),

    /// Unexpected bytes from the server
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Server closed the connection
    #[error("connection closed")]
    ConnectionClosed,

    /// Server answered with an ErrorResponse
    #[error("server error: {message} ({code})")]
    Server {
        /// SQLSTATE code
        code: String,
        /// Human-readable message
        message: String,
    },
}

impl Error {
    /// True for failures a caller might reasonably retry
    ///
    /// The crate never retries on its own.
    pub fn is_retriable(&self) -> bool {
        match self {
            Error::Io(err) => matches!(
                err.kind(),
                io::ErrorKind::ConnectionRefused
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::TimedOut
                    | io::ErrorKind::Interrupted
            ),
            Error::ConnectionClosed => true,
            Error::Config(_) | Error::Protocol(_) | Error::Server { .. } => false,
        }
    }

    /// Short label for logs and metrics
    pub fn category(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Config(_) => "config",
            Error::Protocol(_) => "protocol",
            Error::ConnectionClosed => "connection_closed",
            Error::Server { .. } => "server",
        }
    }
}
