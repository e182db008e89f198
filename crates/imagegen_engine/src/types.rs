use std::fmt;
use std::path::PathBuf;

use imagegen_core::{ImageSource, RequestToken};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    GenerationCompleted {
        token: RequestToken,
        result: Result<ImageSource, GenerationError>,
    },
    SaveCompleted {
        token: RequestToken,
        result: Result<PathBuf, SaveError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct GenerationError {
    pub kind: FailureKind,
    pub message: String,
}

impl GenerationError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidEndpoint,
    HttpStatus(u16),
    Timeout,
    Network,
    InvalidResponse,
    UnrecognizedResponseShape,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidEndpoint => write!(f, "invalid endpoint"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::InvalidResponse => write!(f, "invalid response body"),
            FailureKind::UnrecognizedResponseShape => write!(f, "unrecognized response shape"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SaveError {
    #[error("inline image data is not valid base64: {0}")]
    InvalidBase64(String),
    #[error("image download failed: {0}")]
    Download(String),
    #[error("image download returned http status {0}")]
    HttpStatus(u16),
    #[error("image too large (max {max_bytes}, actual {actual:?})")]
    TooLarge { max_bytes: u64, actual: Option<u64> },
    #[error("unsupported content type {0}")]
    UnsupportedContentType(String),
    #[error("could not write image: {0}")]
    Write(String),
}
