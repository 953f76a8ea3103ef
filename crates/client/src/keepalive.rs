//! Access keepalive: periodic `update_access` pings for one transfer id.
//!
//! The backend evicts cached data it has not seen touched for a while. A
//! keepalive owns a background task that refreshes the access time at the
//! interval the backend advertises, and stops when cancelled or dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::Client;

/// Handle to a running keepalive task. Dropping it stops the task.
#[derive(Debug)]
pub struct AccessKeepalive {
    id: String,
    interval: Duration,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl AccessKeepalive {
    /// Fetches the advertised interval and starts pinging `id`.
    ///
    /// Returns `None` when the backend disables keepalive (interval `0`) or
    /// when no usable interval remains. If the config cannot be fetched or
    /// advertises an out-of-range interval, `fallback` is used instead.
    pub async fn start(client: Arc<Client>, id: &str, fallback: Duration) -> Option<Self> {
        let interval = match client.config().await {
            Ok(cfg) => match cfg.access_interval() {
                Ok(Some(interval)) => interval,
                Ok(None) => {
                    info!(id, "backend disabled access keepalive");
                    return None;
                }
                Err(e) => {
                    warn!(id, error = %e, ?fallback, "unusable advertised interval, using fallback");
                    fallback
                }
            },
            Err(e) => {
                warn!(id, error = %e, ?fallback, "config fetch failed, using fallback interval");
                fallback
            }
        };

        Self::with_interval(client, id, interval)
    }

    /// Starts pinging `id` every `interval`, beginning immediately.
    ///
    /// Returns `None` for a zero interval.
    pub fn with_interval(client: Arc<Client>, id: &str, interval: Duration) -> Option<Self> {
        if interval.is_zero() {
            warn!(id, "access keepalive interval is zero, not starting");
            return None;
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(access_pump(
            client,
            id.to_string(),
            interval,
            cancel.clone(),
        ));
        debug!(id, ?interval, "access keepalive started");

        Some(Self {
            id: id.to_string(),
            interval,
            cancel,
            handle: Some(handle),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancels the task and waits for it to exit.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        debug!(id = %self.id, "access keepalive stopped");
    }
}

impl Drop for AccessKeepalive {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn access_pump(
    client: Arc<Client>,
    id: String,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                let ping = client.update_access(&id);
                let result = tokio::select! {
                    _ = cancel.cancelled() => break,
                    r = ping => r,
                };
                if let Err(e) = result {
                    warn!(id = %id, error = %e, "access update failed");
                }
            }
        }
    }
}
