use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::warn;

/// One progress notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// Completion percentage, 0–100.
    pub percent: u8,
    /// Human-readable status line.
    pub status: String,
}

/// Error returned by a sink that could not take an update.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("progress receiver detached")]
    Detached,

    #[error("progress update dropped: {0}")]
    Dropped(String),
}

/// Receiver of progress updates (a UI element, a log, a channel).
pub trait ProgressSink: Send + Sync {
    fn report(&self, update: &ProgressUpdate) -> Result<(), SinkError>;
}

/// Sink that discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn report(&self, _update: &ProgressUpdate) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Sink backed by a closure.
pub struct FnSink<F>(pub F);

impl<F> ProgressSink for FnSink<F>
where
    F: Fn(&ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: &ProgressUpdate) -> Result<(), SinkError> {
        (self.0)(update);
        Ok(())
    }
}

/// Sink that forwards updates over a bounded channel without waiting.
///
/// A full channel drops the update; a closed channel reports
/// [`SinkError::Detached`].
pub struct ChannelSink {
    tx: mpsc::Sender<ProgressUpdate>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<ProgressUpdate>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelSink {
    fn report(&self, update: &ProgressUpdate) -> Result<(), SinkError> {
        self.tx.try_send(update.clone()).map_err(|e| match e {
            mpsc::error::TrySendError::Closed(_) => SinkError::Detached,
            mpsc::error::TrySendError::Full(u) => {
                SinkError::Dropped(format!("channel full at {}%", u.percent))
            }
        })
    }
}

/// Pushes updates into a sink.
///
/// Sink failures are logged at `warn` and never reach the caller.
#[derive(Clone)]
pub struct ProgressReporter {
    sink: Arc<dyn ProgressSink>,
    last: Option<ProgressUpdate>,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(Arc::new(NoopSink))
    }
}

impl ProgressReporter {
    pub fn new(sink: Arc<dyn ProgressSink>) -> Self {
        Self { sink, last: None }
    }

    /// Reports `percent` (clamped to 100) with a status line.
    pub fn report(&mut self, percent: u8, status: impl Into<String>) {
        let update = ProgressUpdate {
            percent: percent.min(100),
            status: status.into(),
        };
        if let Err(e) = self.sink.report(&update) {
            warn!(error = %e, percent = update.percent, "progress sink rejected update");
        }
        self.last = Some(update);
    }

    /// The most recent update, whether or not the sink accepted it.
    pub fn last(&self) -> Option<&ProgressUpdate> {
        self.last.as_ref()
    }
}

/// `floor(acknowledged / total * 100)`; an empty payload counts as 100 once
/// anything has been acknowledged for it.
pub fn percent_complete(acknowledged: u64, total: u64, chunk_acknowledged: bool) -> u8 {
    if total == 0 {
        return if chunk_acknowledged { 100 } else { 0 };
    }
    let pct = (u128::from(acknowledged.min(total)) * 100) / u128::from(total);
    pct as u8
}
