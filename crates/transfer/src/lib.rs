//! Building blocks for chunked base64 transfers: identities, chunk plans,
//! progress reporting and chunk sources.
//!
//! Nothing in this crate performs network I/O; the session that drives a
//! transfer lives in `easytoolkit-uploader`.

pub mod identity;
mod plan;
mod progress;
mod source;
mod types;

pub use identity::{Resolution, TransferIdentity, ensure, resolve_collision};
pub use plan::{ChunkPlan, ChunkRange, plan};
pub use progress::{
    ChannelSink, FnSink, NoopSink, ProgressReporter, ProgressSink, ProgressUpdate, SinkError,
    percent_complete,
};
pub use source::{ChunkSource, FileSource, MemorySource};
pub use types::TransferState;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("secure random source unavailable: {0}")]
    Entropy(getrandom::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
