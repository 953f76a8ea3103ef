use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Opens a chunked transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitTransferRequest {
    pub id: String,
    pub filename: String,
    pub total_chunks: u64,
    pub file_size: u64,
}

/// Body shared by every route that only needs the transfer id
/// (finalize, clear, update_access, download).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRequest {
    pub id: String,
}

impl IdRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

/// Common shape of every backend reply.
pub trait Reply {
    /// The `success` flag of the body.
    fn success(&self) -> bool;

    /// The `error` string of the body, when present and non-empty.
    fn error(&self) -> Option<&str>;
}

/// Plain `{ success, error? }` reply (init, finalize, clear, update_access).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Reply to a chunk upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_chunks: Option<u64>,
}

/// Reply to `GET /transfer/config`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Keepalive period in seconds; zero or negative disables keepalive.
    #[serde(default)]
    pub access_update_interval: f64,
}

impl ConfigResponse {
    /// Returns the advertised keepalive period, or `None` when the backend
    /// disabled keepalive (`0` or negative).
    ///
    /// Values that are not finite, overflow a `Duration`, or round down to
    /// zero are rejected.
    pub fn access_interval(&self) -> Result<Option<Duration>, ProtocolError> {
        let secs = self.access_update_interval;
        if secs.is_nan() {
            return Err(ProtocolError::InvalidInterval(secs));
        }
        if secs <= 0.0 {
            return Ok(None);
        }
        match Duration::try_from_secs_f64(secs) {
            Ok(d) if !d.is_zero() => Ok(Some(d)),
            _ => Err(ProtocolError::InvalidInterval(secs)),
        }
    }
}

/// Reply to `POST /transfer/download`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, alias = "base64_image")]
    pub base64: String,
    #[serde(default, alias = "basename")]
    pub filename: String,
    /// MIME type of the payload.
    #[serde(default)]
    pub format: String,
}

impl DownloadResponse {
    /// Decodes the payload.
    ///
    /// `text/plain` payloads are carried verbatim; everything else is
    /// standard base64.
    pub fn decode_payload(&self) -> Result<Vec<u8>, ProtocolError> {
        if self.is_plain_text() {
            return Ok(self.base64.as_bytes().to_vec());
        }
        Ok(STANDARD.decode(self.base64.trim())?)
    }

    /// File suffix derived from the MIME type (`txt` for plain text).
    pub fn file_suffix(&self) -> &str {
        if self.is_plain_text() {
            return "txt";
        }
        match self.format.rsplit_once('/') {
            Some((_, sub)) if !sub.is_empty() => sub,
            _ => "bin",
        }
    }

    fn is_plain_text(&self) -> bool {
        self.format == "text/plain"
    }
}

macro_rules! impl_reply {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Reply for $ty {
                fn success(&self) -> bool {
                    self.success
                }

                fn error(&self) -> Option<&str> {
                    self.error.as_deref().filter(|e| !e.is_empty())
                }
            }
        )*
    };
}

impl_reply!(StatusResponse, ChunkResponse, ConfigResponse, DownloadResponse);
