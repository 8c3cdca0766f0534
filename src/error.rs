//! Error type shared by the library modules.
use thiserror::Error;

use crate::validate::ValidationErrors;

/// Failures surfaced by the API client, the quote stream and the session.
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level HTTP failure (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Websocket handshake or read failure.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Payload could not be decoded into the expected shape.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// An authenticated operation was attempted without a session token.
    #[error("not signed in; run `nse-ticker signin` first")]
    NotAuthenticated,

    #[error("{0}")]
    Validation(ValidationErrors),

    /// The sign-in token could not be decoded.
    #[error("malformed token: {0}")]
    Token(String),

    /// The server returned an empty result where data was expected.
    #[error("{0}")]
    NoData(String),
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Error::Validation(errors)
    }
}

/// Crate-wide `Result` alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;
