//! In-memory endpoint for session and slot tests.

use std::sync::Mutex;

use easytoolkit_protocol::DownloadResponse;
use tokio_util::sync::CancellationToken;

use crate::endpoint::{EndpointFuture, RemoteEndpoint};
use crate::error::UploadError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Init {
        id: String,
        filename: String,
        total_chunks: u64,
        file_size: u64,
    },
    Chunk {
        index: u64,
        data: Vec<u8>,
    },
    Finalize,
}

#[derive(Default)]
pub(crate) struct MockEndpoint {
    pub calls: Mutex<Vec<Call>>,
    pub fail_init: bool,
    pub fail_chunk: Option<u64>,
    pub fail_finalize: bool,
    pub hang_chunk: Option<u64>,
    pub cancel_after_chunk: Option<(u64, CancellationToken)>,
    pub cancel_on_finalize: Option<CancellationToken>,
}

impl MockEndpoint {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn finalized(&self) -> bool {
        self.calls().contains(&Call::Finalize)
    }
}

impl RemoteEndpoint for MockEndpoint {
    fn init_transfer<'a>(
        &'a self,
        id: &'a str,
        filename: &'a str,
        total_chunks: u64,
        file_size: u64,
    ) -> EndpointFuture<'a, ()> {
        self.calls.lock().unwrap().push(Call::Init {
            id: id.to_string(),
            filename: filename.to_string(),
            total_chunks,
            file_size,
        });
        let fail = self.fail_init;
        Box::pin(async move {
            if fail {
                Err(UploadError::Server {
                    status: Some(500),
                    message: "POST /transfer/init returned HTTP 500".into(),
                })
            } else {
                Ok(())
            }
        })
    }

    fn upload_chunk<'a>(
        &'a self,
        _id: &'a str,
        index: u64,
        data: Vec<u8>,
    ) -> EndpointFuture<'a, ()> {
        self.calls.lock().unwrap().push(Call::Chunk { index, data });
        let fail = self.fail_chunk == Some(index);
        let hang = self.hang_chunk == Some(index);
        if let Some((after, token)) = &self.cancel_after_chunk
            && *after == index
        {
            token.cancel();
        }
        Box::pin(async move {
            if hang {
                std::future::pending::<()>().await;
            }
            if fail {
                Err(UploadError::Network("connection reset".into()))
            } else {
                Ok(())
            }
        })
    }

    fn finalize_transfer<'a>(&'a self, _id: &'a str) -> EndpointFuture<'a, ()> {
        self.calls.lock().unwrap().push(Call::Finalize);
        if let Some(token) = &self.cancel_on_finalize {
            token.cancel();
        }
        let fail = self.fail_finalize;
        Box::pin(async move {
            if fail {
                Err(UploadError::Server {
                    status: None,
                    message: "Missing chunks".into(),
                })
            } else {
                Ok(())
            }
        })
    }

    fn clear_transfer<'a>(&'a self, _id: &'a str) -> EndpointFuture<'a, ()> {
        Box::pin(async { Ok(()) })
    }

    fn download<'a>(&'a self, _id: &'a str) -> EndpointFuture<'a, DownloadResponse> {
        Box::pin(async { Ok(DownloadResponse::default()) })
    }
}
