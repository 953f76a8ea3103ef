//! Upload error types.

use easytoolkit_protocol::ProtocolError;
use easytoolkit_transfer::{TransferError, TransferState};

/// Coarse classification of a failure, for callers deciding how to present it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad arguments; a programming error on the caller's side.
    Validation,
    /// Connection-level failure.
    Network,
    /// A bounded wait expired.
    Timeout,
    /// The backend reported failure (non-2xx or `success: false`).
    Server,
    /// The caller cancelled the transfer.
    Cancelled,
    /// Local I/O failure while reading or writing a file.
    Io,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Validation => "validation",
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::Server => "server",
            Self::Cancelled => "cancelled",
            Self::Io => "io",
        };
        f.write_str(s)
    }
}

/// Errors produced while running a transfer.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("invalid argument: {0}")]
    Validation(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("server error: {message}")]
    Server {
        status: Option<u16>,
        message: String,
    },

    #[error("cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("session already ran (state: {0})")]
    SessionReused(TransferState),

    #[error("secure random source unavailable")]
    Entropy(#[source] TransferError),
}

impl UploadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::SessionReused(_) => ErrorKind::Validation,
            Self::Network(_) => ErrorKind::Network,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Server { .. } | Self::Decode(_) => ErrorKind::Server,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Io(_) | Self::Entropy(_) => ErrorKind::Io,
        }
    }

    /// HTTP status, when the backend answered with one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => *status,
            _ => None,
        }
    }

    pub fn descriptor(&self) -> ErrorDescriptor {
        ErrorDescriptor {
            kind: self.kind(),
            message: self.to_string(),
            status: self.status(),
        }
    }
}

impl From<TransferError> for UploadError {
    fn from(e: TransferError) -> Self {
        match e {
            TransferError::InvalidArgument(msg) => Self::Validation(msg),
            TransferError::Io(io) => Self::Io(io),
            e @ TransferError::Entropy(_) => Self::Entropy(e),
        }
    }
}

impl From<easytoolkit_client::Error> for UploadError {
    fn from(e: easytoolkit_client::Error) -> Self {
        use easytoolkit_client::Error as E;

        if e.is_timeout() {
            return Self::Timeout(e.to_string());
        }
        match e {
            E::Http(err) => Self::Network(err.to_string()),
            E::Status { route, status, body } => Self::Server {
                status: Some(status),
                message: format!("{route} returned HTTP {status}: {}", body.trim()),
            },
            E::Rejected { message, .. } => Self::Server {
                status: None,
                message,
            },
            E::Json(err) => Self::Decode(err.to_string()),
            E::InvalidBaseUrl(url) => Self::Validation(format!("invalid base URL: {url}")),
            E::Timeout { route, after } => {
                Self::Timeout(format!("{route} timed out after {after:?}"))
            }
        }
    }
}

impl From<ProtocolError> for UploadError {
    fn from(e: ProtocolError) -> Self {
        Self::Decode(e.to_string())
    }
}

/// Cloneable record of a failure, kept by a session after it ends `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDescriptor {
    pub kind: ErrorKind,
    pub message: String,
    pub status: Option<u16>,
}

impl ErrorDescriptor {
    pub fn is_timeout(&self) -> bool {
        self.kind == ErrorKind::Timeout
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind == ErrorKind::Cancelled
    }
}

impl std::fmt::Display for ErrorDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
