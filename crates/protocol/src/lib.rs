//! Wire protocol for the transfer routes exposed by the backend.
//!
//! Every route speaks JSON over HTTP except `/transfer/chunk`, which takes a
//! multipart form. Responses always carry a `success` flag; failures carry a
//! human-readable `error`.

pub mod constants;
pub mod messages;

pub use constants::{
    CHUNK_TIMEOUT, CONTROL_TIMEOUT, DEFAULT_ACCESS_UPDATE_INTERVAL, DEFAULT_CHUNK_SIZE, Route,
};
pub use messages::{
    ChunkResponse, ConfigResponse, DownloadResponse, IdRequest, InitTransferRequest, Reply,
    StatusResponse,
};

/// Errors produced while interpreting wire payloads.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid access update interval: {0} seconds")]
    InvalidInterval(f64),
}
