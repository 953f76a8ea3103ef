//! Transfer configuration.

use std::time::Duration;

use easytoolkit_client::Client;
use easytoolkit_protocol::{
    CHUNK_TIMEOUT, CONTROL_TIMEOUT, DEFAULT_ACCESS_UPDATE_INTERVAL, DEFAULT_CHUNK_SIZE,
};
use serde::{Deserialize, Serialize};

use crate::error::UploadError;

/// Settings shared by every transfer against one backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Backend root, e.g. `http://127.0.0.1:8188`.
    pub base_url: String,
    /// Bytes per chunk.
    pub chunk_size: u64,
    pub control_timeout_secs: u64,
    /// `None` leaves chunk uploads unbounded.
    pub chunk_timeout_secs: Option<u64>,
    /// Keepalive period used when the backend does not advertise one.
    pub access_update_interval_secs: u64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8188".into(),
            chunk_size: DEFAULT_CHUNK_SIZE as u64,
            control_timeout_secs: CONTROL_TIMEOUT.as_secs(),
            chunk_timeout_secs: Some(CHUNK_TIMEOUT.as_secs()),
            access_update_interval_secs: DEFAULT_ACCESS_UPDATE_INTERVAL.as_secs(),
        }
    }
}

impl TransferConfig {
    pub fn validate(&self) -> Result<(), UploadError> {
        if self.base_url.trim().is_empty() {
            return Err(UploadError::Validation("base_url must not be empty".into()));
        }
        if self.chunk_size == 0 {
            return Err(UploadError::Validation("chunk_size must be positive".into()));
        }
        if self.control_timeout_secs == 0 {
            return Err(UploadError::Validation(
                "control_timeout_secs must be positive".into(),
            ));
        }
        if self.chunk_timeout_secs == Some(0) {
            return Err(UploadError::Validation(
                "chunk_timeout_secs must be positive (omit it for no limit)".into(),
            ));
        }
        if self.access_update_interval_secs == 0 {
            return Err(UploadError::Validation(
                "access_update_interval_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn control_timeout(&self) -> Duration {
        Duration::from_secs(self.control_timeout_secs)
    }

    pub fn chunk_timeout(&self) -> Option<Duration> {
        self.chunk_timeout_secs.map(Duration::from_secs)
    }

    pub fn access_fallback(&self) -> Duration {
        Duration::from_secs(self.access_update_interval_secs)
    }

    /// Validates the config and builds a client for its backend.
    pub fn client(&self) -> Result<Client, UploadError> {
        self.validate()?;
        Ok(Client::new(&self.base_url)?.with_timeouts(self.control_timeout(), self.chunk_timeout()))
    }
}
