//! Remote endpoint trait.
//!
//! Sessions talk to the backend only through `RemoteEndpoint`, so the
//! transfer logic stays independent of the HTTP transport and testable
//! with in-memory mocks.

use std::future::Future;
use std::pin::Pin;

use easytoolkit_client::Client;
use easytoolkit_protocol::{DownloadResponse, InitTransferRequest};
use tracing::{debug, warn};

use crate::error::UploadError;

/// Boxed future returned by [`RemoteEndpoint`] methods.
pub type EndpointFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, UploadError>> + Send + 'a>>;

/// Request/response access to the transfer routes.
///
/// Implementations own timeouts and normalize failures into
/// [`UploadError`]; they never retry.
pub trait RemoteEndpoint: Send + Sync {
    fn init_transfer<'a>(
        &'a self,
        id: &'a str,
        filename: &'a str,
        total_chunks: u64,
        file_size: u64,
    ) -> EndpointFuture<'a, ()>;

    fn upload_chunk<'a>(&'a self, id: &'a str, index: u64, data: Vec<u8>)
    -> EndpointFuture<'a, ()>;

    fn finalize_transfer<'a>(&'a self, id: &'a str) -> EndpointFuture<'a, ()>;

    fn clear_transfer<'a>(&'a self, id: &'a str) -> EndpointFuture<'a, ()>;

    fn download<'a>(&'a self, id: &'a str) -> EndpointFuture<'a, DownloadResponse>;
}

impl RemoteEndpoint for Client {
    fn init_transfer<'a>(
        &'a self,
        id: &'a str,
        filename: &'a str,
        total_chunks: u64,
        file_size: u64,
    ) -> EndpointFuture<'a, ()> {
        Box::pin(async move {
            let req = InitTransferRequest {
                id: id.to_string(),
                filename: filename.to_string(),
                total_chunks,
                file_size,
            };
            Client::init_transfer(self, &req).await?;
            Ok(())
        })
    }

    fn upload_chunk<'a>(
        &'a self,
        id: &'a str,
        index: u64,
        data: Vec<u8>,
    ) -> EndpointFuture<'a, ()> {
        Box::pin(async move {
            Client::upload_chunk(self, id, index, data).await?;
            Ok(())
        })
    }

    fn finalize_transfer<'a>(&'a self, id: &'a str) -> EndpointFuture<'a, ()> {
        Box::pin(async move {
            Client::finalize_transfer(self, id).await?;
            Ok(())
        })
    }

    fn clear_transfer<'a>(&'a self, id: &'a str) -> EndpointFuture<'a, ()> {
        Box::pin(async move {
            Client::clear_transfer(self, id).await?;
            Ok(())
        })
    }

    fn download<'a>(&'a self, id: &'a str) -> EndpointFuture<'a, DownloadResponse> {
        Box::pin(async move { Ok(Client::download(self, id).await?) })
    }
}

/// Asks the backend to drop its state for `id`, logging any failure.
pub async fn clear_best_effort(endpoint: &dyn RemoteEndpoint, id: &str) {
    match endpoint.clear_transfer(id).await {
        Ok(()) => debug!(id, "transfer cleared"),
        Err(e) => warn!(id, error = %e, "failed to clear transfer"),
    }
}
