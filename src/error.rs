//! Error type shared by the listing aggregator and the article segmenter.
//!
//! Every failure is surfaced as a distinct variant so callers can decide
//! whether to abort or log-and-continue. [`Error::kind`] collapses the
//! variants into the four categories callers usually branch on.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status {
        url: String,
        status: StatusCode,
        message: Option<String>,
    },

    #[error("failed to decode listing response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("detail page is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("detail page is missing expected element `{0}`")]
    MissingElement(&'static str),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never produced a response (connect, timeout, body read).
    Transport,
    /// The server answered with a non-success status code.
    Status,
    /// The response could not be decoded (JSON, UTF-8, link).
    Decode,
    /// The page decoded but did not match the expected template.
    Structure,
    /// Local configuration could not be loaded.
    Config,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Transport { .. } => ErrorKind::Transport,
            Error::Status { .. } => ErrorKind::Status,
            Error::Json(_) | Error::Encoding(_) | Error::InvalidUrl { .. } => ErrorKind::Decode,
            Error::MissingElement(_) => ErrorKind::Structure,
            Error::Config(_) => ErrorKind::Config,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
