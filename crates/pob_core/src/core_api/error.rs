use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Transport,
    Decode,
    Inflate,
    MalformedDocument,
    MalformedItemText,
    MalformedTreeUrl,
    UnrecognizedOption,
}

#[derive(Debug, Error)]
pub enum Error {
    // Transport (paste host retrieval)
    #[error("{url} is not a supported paste URL")]
    UnsupportedUrl { url: String },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("connection to {url} failed: {source}")]
    Connection {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{url} answered with HTTP status {status}")]
    HttpStatus { url: String, status: u16 },

    // Build code transport encoding
    #[error("invalid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("failed to inflate build code: {0}")]
    Inflate(#[source] std::io::Error),

    // Content
    #[error("malformed document: {reason}")]
    MalformedDocument { reason: String },

    #[error("malformed item text: {reason}")]
    MalformedItemText { reason: String },

    #[error("malformed passive tree URL: {reason}")]
    MalformedTreeUrl { reason: String },

    #[error("unrecognized config option {name:?}")]
    UnrecognizedOption { name: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedUrl { .. }
            | Self::Timeout { .. }
            | Self::Connection { .. }
            | Self::HttpStatus { .. } => ErrorCode::Transport,
            Self::Decode(_) => ErrorCode::Decode,
            Self::Inflate(_) => ErrorCode::Inflate,
            Self::MalformedDocument { .. } => ErrorCode::MalformedDocument,
            Self::MalformedItemText { .. } => ErrorCode::MalformedItemText,
            Self::MalformedTreeUrl { .. } => ErrorCode::MalformedTreeUrl,
            Self::UnrecognizedOption { .. } => ErrorCode::UnrecognizedOption,
        }
    }

    pub fn malformed_document(reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            reason: reason.into(),
        }
    }

    pub fn malformed_item(reason: impl Into<String>) -> Self {
        Self::MalformedItemText {
            reason: reason.into(),
        }
    }

    pub fn malformed_tree_url(reason: impl Into<String>) -> Self {
        Self::MalformedTreeUrl {
            reason: reason.into(),
        }
    }
}
