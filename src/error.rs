//! Crate-wide error type.
//!
//! ERROR HANDLING
//! ==============
//! Every fallible path in the client funnels into `ClientError`. Surfaces
//! decide how to present it: login and signup print the message and let the
//! user retry, the connection task logs it and reconnects.

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("websocket error: {0}")]
    Ws(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket closed")]
    WsClosed,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("invalid stored cookie: {0}")]
    Cookie(#[from] cookie::ParseError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("missing expected field `{0}`")]
    MissingField(&'static str),
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Ws(Box::new(error))
    }
}
