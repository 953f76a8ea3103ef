//! Transfer backend client.
//!
//! Async HTTP client using `reqwest`. Each call is bounded by a wall-clock
//! timeout; dropping the in-flight future on expiry aborts the request.

use std::time::Duration;

use easytoolkit_protocol::constants::{
    CHUNK_PART_FILE_NAME, FIELD_CHUNK_DATA, FIELD_CHUNK_INDEX, FIELD_ID,
};
use easytoolkit_protocol::{
    CHUNK_TIMEOUT, CONTROL_TIMEOUT, ChunkResponse, ConfigResponse, DownloadResponse, IdRequest,
    InitTransferRequest, Reply, Route, StatusResponse,
};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

/// Errors from the transfer client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{route} timed out after {after:?}")]
    Timeout { route: Route, after: Duration },

    #[error("{route} returned HTTP {status}: {body}")]
    Status {
        route: Route,
        status: u16,
        body: String,
    },

    #[error("{route} failed: {message}")]
    Rejected { route: Route, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl Error {
    /// Returns `true` for a bounded wait that expired, including transport-level
    /// timeouts reported by `reqwest`.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Http(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// HTTP status code, when the server answered with a non-2xx status.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Transfer backend client.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    control_timeout: Duration,
    chunk_timeout: Option<Duration>,
}

impl Client {
    /// Creates a client for the backend at `base_url` (e.g. `http://127.0.0.1:8188`).
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(Error::InvalidBaseUrl(base_url.to_string()));
        }

        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            http,
            base_url: trimmed.to_string(),
            control_timeout: CONTROL_TIMEOUT,
            chunk_timeout: Some(CHUNK_TIMEOUT),
        })
    }

    /// Overrides the control-call and chunk-call timeouts.
    ///
    /// A `chunk_timeout` of `None` leaves chunk uploads unbounded.
    pub fn with_timeouts(mut self, control: Duration, chunk_timeout: Option<Duration>) -> Self {
        self.control_timeout = control;
        self.chunk_timeout = chunk_timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn control_timeout(&self) -> Duration {
        self.control_timeout
    }

    pub fn chunk_timeout(&self) -> Option<Duration> {
        self.chunk_timeout
    }

    fn url(&self, route: Route) -> String {
        format!("{}{}", self.base_url, route.path())
    }

    /// Opens a chunked transfer.
    pub async fn init_transfer(&self, req: &InitTransferRequest) -> Result<StatusResponse, Error> {
        self.post_json(Route::Init, req).await
    }

    /// Uploads chunk `index` of transfer `id` as a multipart form.
    pub async fn upload_chunk(
        &self,
        id: &str,
        index: u64,
        data: Vec<u8>,
    ) -> Result<ChunkResponse, Error> {
        let size = data.len();
        let part = Part::bytes(data)
            .file_name(CHUNK_PART_FILE_NAME)
            .mime_str("application/octet-stream")?;
        let form = Form::new()
            .text(FIELD_ID, id.to_string())
            .text(FIELD_CHUNK_INDEX, index.to_string())
            .part(FIELD_CHUNK_DATA, part);

        let req = self.http.post(self.url(Route::Chunk)).multipart(form);
        let resp: ChunkResponse = self.execute(Route::Chunk, req, self.chunk_timeout).await?;
        debug!(
            id,
            chunk = index,
            bytes = size,
            received = ?resp.received_chunks,
            "chunk acknowledged"
        );
        Ok(resp)
    }

    /// Tells the backend every chunk of `id` has arrived.
    pub async fn finalize_transfer(&self, id: &str) -> Result<StatusResponse, Error> {
        self.post_json(Route::Finalize, &IdRequest::new(id)).await
    }

    /// Drops any backend state held for `id`.
    pub async fn clear_transfer(&self, id: &str) -> Result<StatusResponse, Error> {
        self.post_json(Route::Clear, &IdRequest::new(id)).await
    }

    /// Refreshes the backend's access time for `id`.
    pub async fn update_access(&self, id: &str) -> Result<StatusResponse, Error> {
        self.post_json(Route::UpdateAccess, &IdRequest::new(id)).await
    }

    /// Fetches the backend's transfer configuration.
    pub async fn config(&self) -> Result<ConfigResponse, Error> {
        let req = self.http.get(self.url(Route::Config));
        self.execute(Route::Config, req, Some(self.control_timeout))
            .await
    }

    /// Fetches the cached payload for `id`.
    pub async fn download(&self, id: &str) -> Result<DownloadResponse, Error> {
        self.post_json(Route::Download, &IdRequest::new(id)).await
    }

    async fn post_json<B, R>(&self, route: Route, body: &B) -> Result<R, Error>
    where
        B: serde::Serialize + ?Sized,
        R: DeserializeOwned + Reply,
    {
        let req = self.http.post(self.url(route)).json(body);
        self.execute(route, req, Some(self.control_timeout)).await
    }

    /// Sends `req`, enforcing `timeout` over the whole exchange (headers and
    /// body), then checks the status code and the `success` flag.
    async fn execute<R>(
        &self,
        route: Route,
        req: reqwest::RequestBuilder,
        timeout: Option<Duration>,
    ) -> Result<R, Error>
    where
        R: DeserializeOwned + Reply,
    {
        trace!(%route, "sending request");

        let exchange = async {
            let resp = req.send().await?;
            let status = resp.status();

            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(Error::Status {
                    route,
                    status: status.as_u16(),
                    body,
                });
            }

            let bytes = resp.bytes().await?;
            Ok::<R, Error>(serde_json::from_slice(&bytes)?)
        };

        let reply = match timeout {
            Some(after) => tokio::time::timeout(after, exchange)
                .await
                .map_err(|_| Error::Timeout { route, after })??,
            None => exchange.await?,
        };

        if !reply.success() {
            return Err(Error::Rejected {
                route,
                message: reply.error().unwrap_or("request failed").to_string(),
            });
        }

        Ok(reply)
    }
}
