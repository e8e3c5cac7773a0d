//! Client error types.

use thiserror::Error;

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Socket failure reported by a [`QueryTransport`](crate::QueryTransport)
    /// implementation.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] mexline_protocol::ProtocolError),

    #[error("not connected")]
    NotConnected,

    #[error("connection closed")]
    ConnectionClosed,

    #[error("request timeout")]
    Timeout,

    #[error("server error: {code} - {text}")]
    ServerError { code: u16, text: String },
}

impl ClientError {
    /// Returns whether this error is retryable.
    ///
    /// Nothing in this crate retries; the classification is for callers.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Io(_) => true,
            ClientError::Timeout => true,
            ClientError::ConnectionClosed => true,
            ClientError::ServerError { code, .. } => *code >= 500 || *code == 429,
            _ => false,
        }
    }
}
