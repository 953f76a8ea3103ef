//! Chunked transfers against the backend's `/transfer/*` routes.
//!
//! This crate holds the transfer logic. It talks to the backend only through
//! [`RemoteEndpoint`], implemented for [`easytoolkit_client::Client`].
//!
//! # Upload pipeline
//!
//! 1. **Init**: announce id, file name, chunk count and size
//! 2. **Chunks**: send each chunk in index order, reporting progress
//! 3. **Finalize**: ask the backend to assemble the payload
//!
//! Any failure ends the session in `Failed`; nothing is retried.

pub mod config;
pub mod download;
pub mod endpoint;
pub mod error;
pub mod session;
pub mod slot;

#[cfg(test)]
pub(crate) mod testing;

pub use config::TransferConfig;
pub use download::{DownloadSession, DownloadedPayload};
pub use endpoint::{EndpointFuture, RemoteEndpoint, clear_best_effort};
pub use error::{ErrorDescriptor, ErrorKind, UploadError};
pub use session::TransferSession;
pub use slot::{SlotStatus, TransferSlot};
