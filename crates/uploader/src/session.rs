//! Transfer session: init, sequential chunk upload, finalize.
//!
//! A session is single-use. It moves `Idle → Initializing → Uploading →
//! Finalizing → Completed`, or to `Failed` from any active state. Chunks
//! are sent strictly in index order with one chunk resident at a time.
//! There is no retry; a caller wanting another attempt builds a new
//! session, usually with the same identity.
//!
//! A successful run reports `0 "Initializing upload..."`, then one
//! `"Uploading... (i/n)"` per acknowledged chunk carrying the floored
//! percentage, then `100 "Finalizing upload..."` and `100 "Upload
//! complete!"`. Percentages never decrease but may repeat, for example when
//! a chunk is too small to move the floored value.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use easytoolkit_transfer::{
    ChunkPlan, ChunkSource, FileSource, ProgressReporter, ProgressSink, TransferIdentity,
    TransferState, percent_complete,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::endpoint::RemoteEndpoint;
use crate::error::{ErrorDescriptor, UploadError};

/// One upload of one payload under one identity.
pub struct TransferSession<S: ChunkSource> {
    identity: TransferIdentity,
    filename: String,
    source: S,
    plan: ChunkPlan,
    state: TransferState,
    bytes_acknowledged: u64,
    last_error: Option<ErrorDescriptor>,
    reporter: ProgressReporter,
    endpoint: Arc<dyn RemoteEndpoint>,
    cancel: CancellationToken,
}

impl TransferSession<FileSource> {
    /// Opens `path` and builds a session uploading it under its file name.
    pub async fn open(
        endpoint: Arc<dyn RemoteEndpoint>,
        identity: TransferIdentity,
        path: impl AsRef<Path>,
        chunk_size: u64,
    ) -> Result<Self, UploadError> {
        let source = FileSource::open(path.as_ref()).await?;
        let filename = source.file_name().ok_or_else(|| {
            UploadError::Validation(format!("{} has no file name", path.as_ref().display()))
        })?;
        Self::new(endpoint, identity, filename, source, chunk_size)
    }
}

impl<S: ChunkSource> TransferSession<S> {
    /// Builds an idle session. Fails if `chunk_size` is zero.
    pub fn new(
        endpoint: Arc<dyn RemoteEndpoint>,
        identity: TransferIdentity,
        filename: impl Into<String>,
        source: S,
        chunk_size: u64,
    ) -> Result<Self, UploadError> {
        let plan = ChunkPlan::new(source.len(), chunk_size)?;
        Ok(Self {
            identity,
            filename: filename.into(),
            source,
            plan,
            state: TransferState::Idle,
            bytes_acknowledged: 0,
            last_error: None,
            reporter: ProgressReporter::default(),
            endpoint,
            cancel: CancellationToken::new(),
        })
    }

    /// Sends progress updates to `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.reporter = ProgressReporter::new(sink);
        self
    }

    pub fn with_reporter(mut self, reporter: ProgressReporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Aborts the run when `cancel` fires, ending in `Failed` with a
    /// cancelled error.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn identity(&self) -> &TransferIdentity {
        &self.identity
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn file_size(&self) -> u64 {
        self.plan.total_size()
    }

    pub fn plan(&self) -> &ChunkPlan {
        &self.plan
    }

    pub fn state(&self) -> TransferState {
        self.state
    }

    pub fn bytes_acknowledged(&self) -> u64 {
        self.bytes_acknowledged
    }

    /// The failure recorded when the session ended `Failed`.
    pub fn last_error(&self) -> Option<&ErrorDescriptor> {
        self.last_error.as_ref()
    }

    pub fn reporter(&self) -> &ProgressReporter {
        &self.reporter
    }

    /// Runs the transfer to a terminal state.
    ///
    /// On failure the session is left `Failed` with `last_error` set and
    /// the same error is returned.
    pub async fn run(&mut self) -> Result<(), UploadError> {
        if self.state != TransferState::Idle {
            return Err(UploadError::SessionReused(self.state));
        }

        self.transition(TransferState::Initializing);
        self.reporter.report(0, "Initializing upload...");

        match self.drive().await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    async fn drive(&mut self) -> Result<(), UploadError> {
        let id = self.identity.as_str().to_string();
        let total_chunks = self.plan.total_chunks();
        let file_size = self.plan.total_size();

        self.check_cancelled()?;
        guarded(
            &self.cancel,
            self.endpoint
                .init_transfer(&id, &self.filename, total_chunks, file_size),
        )
        .await?;
        debug!(id = %id, filename = %self.filename, total_chunks, file_size, "transfer initialized");

        self.transition(TransferState::Uploading);

        let plan = self.plan;
        for range in plan.ranges() {
            self.check_cancelled()?;

            let data = self.source.read_range(range).await?;
            let len = data.len() as u64;
            guarded(
                &self.cancel,
                self.endpoint.upload_chunk(&id, range.index, data),
            )
            .await?;

            self.bytes_acknowledged += len;
            let percent = percent_complete(self.bytes_acknowledged, file_size, true);
            self.reporter.report(
                percent,
                format!("Uploading... ({}/{})", range.index + 1, total_chunks),
            );
            debug!(id = %id, chunk = range.index, bytes = len, percent, "chunk uploaded");
        }

        self.check_cancelled()?;
        self.transition(TransferState::Finalizing);
        self.reporter.report(100, "Finalizing upload...");
        guarded(&self.cancel, self.endpoint.finalize_transfer(&id)).await?;

        self.transition(TransferState::Completed);
        self.reporter.report(100, "Upload complete!");
        info!(id = %id, filename = %self.filename, bytes = file_size, "upload complete");
        Ok(())
    }

    fn fail(&mut self, e: &UploadError) {
        self.transition(TransferState::Failed);
        let descriptor = e.descriptor();
        let percent = self.reporter.last().map_or(0, |u| u.percent);

        if descriptor.is_cancelled() {
            info!(id = %self.identity, "upload cancelled");
            self.reporter.report(percent, "Upload cancelled");
        } else {
            warn!(
                id = %self.identity,
                kind = %descriptor.kind,
                error = %descriptor.message,
                acknowledged = self.bytes_acknowledged,
                "upload failed"
            );
            self.reporter
                .report(percent, format!("Upload failed: {}", descriptor.message));
        }

        self.last_error = Some(descriptor);
    }

    fn transition(&mut self, next: TransferState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        self.state = next;
    }

    fn check_cancelled(&self) -> Result<(), UploadError> {
        if self.cancel.is_cancelled() {
            Err(UploadError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Awaits `fut` unless `cancel` fires first; dropping `fut` aborts the request.
///
/// A reply that is already available wins over a concurrent cancel, so an
/// acknowledged call is never reported as cancelled.
async fn guarded<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T, UploadError>>,
) -> Result<T, UploadError> {
    tokio::select! {
        biased;
        r = fut => r,
        _ = cancel.cancelled() => Err(UploadError::Cancelled),
    }
}
