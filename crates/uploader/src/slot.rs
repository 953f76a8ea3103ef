//! Transfer slot: the state a hosting element keeps for its transfers.
//!
//! A slot holds the transfer id, the name of the last uploaded file, the
//! most recent progress line, and optionally an access keepalive bound to
//! the id. Dropping the slot stops the keepalive.

use std::sync::{Arc, Mutex, Weak};

use easytoolkit_client::AccessKeepalive;
use easytoolkit_transfer::{
    ChunkSource, ProgressSink, ProgressUpdate, SinkError, TransferIdentity, ensure,
    resolve_collision,
};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::endpoint::RemoteEndpoint;
use crate::error::UploadError;
use crate::session::TransferSession;

/// Latest progress shown by a slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotStatus {
    pub percent: u8,
    pub text: String,
}

pub struct TransferSlot {
    id: String,
    filename: Option<String>,
    status: Arc<Mutex<SlotStatus>>,
    keepalive: Option<AccessKeepalive>,
}

impl TransferSlot {
    /// A new slot with a freshly generated id.
    pub fn created() -> Result<Self, UploadError> {
        Self::restore(None)
    }

    /// A slot restored from saved state; an absent or blank id is replaced.
    pub fn restore(id: Option<&str>) -> Result<Self, UploadError> {
        Ok(Self {
            id: ensure(id)?,
            filename: None,
            status: Arc::new(Mutex::new(SlotStatus::default())),
            keepalive: None,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn identity(&self) -> Result<TransferIdentity, UploadError> {
        Ok(TransferIdentity::from_existing(self.id.clone())?)
    }

    /// Name of the last file uploaded through this slot.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Re-checks the id against sibling slots after the host element was
    /// configured (e.g. pasted). Returns `true` if the id was replaced.
    pub fn on_configure<I, S>(&mut self, sibling_ids: I) -> Result<bool, UploadError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let resolution = resolve_collision(&self.id, sibling_ids)?;
        if resolution.changed {
            info!(old = %self.id, new = %resolution.id, "duplicate transfer id regenerated");
            self.replace_id(resolution.id);
        }
        Ok(resolution.changed)
    }

    /// Unconditionally replaces the id.
    ///
    /// Any keepalive bound to the old id is stopped.
    pub fn regenerate_id(&mut self) -> Result<&str, UploadError> {
        let fresh = TransferIdentity::generate()?.into_string();
        info!(old = %self.id, new = %fresh, "transfer id regenerated");
        self.replace_id(fresh);
        Ok(&self.id)
    }

    fn replace_id(&mut self, id: String) {
        self.id = id;
        self.keepalive = None;
    }

    /// Binds a keepalive to this slot, replacing (and stopping) any previous one.
    pub fn attach_keepalive(&mut self, keepalive: AccessKeepalive) {
        self.keepalive = Some(keepalive);
    }

    pub fn keepalive(&self) -> Option<&AccessKeepalive> {
        self.keepalive.as_ref()
    }

    /// A sink writing into this slot's status. It detaches once the slot is dropped.
    pub fn progress_sink(&self) -> Arc<dyn ProgressSink> {
        Arc::new(SlotSink {
            status: Arc::downgrade(&self.status),
        })
    }

    pub fn record_progress(&self, percent: u8, text: impl Into<String>) {
        let mut status = self
            .status
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        status.percent = percent.min(100);
        status.text = text.into();
    }

    pub fn status(&self) -> SlotStatus {
        self.status
            .lock()
            .map(|s| s.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Uploads `source` under this slot's id, reporting into the slot.
    pub async fn upload<S: ChunkSource>(
        &mut self,
        endpoint: Arc<dyn RemoteEndpoint>,
        filename: &str,
        source: S,
        chunk_size: u64,
        cancel: CancellationToken,
    ) -> Result<(), UploadError> {
        let mut session =
            TransferSession::new(endpoint, self.identity()?, filename, source, chunk_size)?
                .with_sink(self.progress_sink())
                .with_cancel(cancel);
        session.run().await?;
        self.filename = Some(filename.to_string());
        Ok(())
    }

    /// Stops the keepalive and releases the slot.
    pub async fn dispose(mut self) {
        if let Some(keepalive) = self.keepalive.take() {
            keepalive.stop().await;
        }
    }
}

struct SlotSink {
    status: Weak<Mutex<SlotStatus>>,
}

impl ProgressSink for SlotSink {
    fn report(&self, update: &ProgressUpdate) -> Result<(), SinkError> {
        let status = self.status.upgrade().ok_or(SinkError::Detached)?;
        let mut guard = status
            .lock()
            .map_err(|_| SinkError::Dropped("slot status lock poisoned".into()))?;
        guard.percent = update.percent;
        guard.text.clone_from(&update.status);
        Ok(())
    }
}
