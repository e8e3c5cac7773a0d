//! Protocol error types.

use thiserror::Error;

/// Errors raised while building requests or projecting responses.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid newsletter jid: {0:?}")]
    InvalidJid(String),

    #[error("response has no 'result' payload")]
    MissingResult,

    #[error("invalid UTF-8 in result content")]
    InvalidUtf8,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing required path: data.{0}")]
    MissingPath(&'static str),
}
