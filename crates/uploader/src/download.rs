//! Download of a cached payload by transfer id.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::endpoint::RemoteEndpoint;
use crate::error::UploadError;

/// A decoded payload fetched from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedPayload {
    pub filename: String,
    /// MIME type reported by the backend.
    pub format: String,
    pub bytes: Vec<u8>,
    suffix: String,
}

impl DownloadedPayload {
    /// `filename.suffix`, with the suffix taken from the MIME type.
    pub fn suggested_file_name(&self) -> String {
        let stem = if self.filename.is_empty() {
            "download"
        } else {
            self.filename.as_str()
        };
        format!("{stem}.{}", self.suffix)
    }

    /// Writes the payload to `dir` under [`suggested_file_name`](Self::suggested_file_name),
    /// or to `path` directly when it is not a directory.
    pub async fn write_to(&self, path: impl AsRef<Path>) -> Result<PathBuf, UploadError> {
        let path = path.as_ref();
        let target = if tokio::fs::metadata(path).await.is_ok_and(|m| m.is_dir()) {
            path.join(self.suggested_file_name())
        } else {
            path.to_path_buf()
        };
        tokio::fs::write(&target, &self.bytes).await?;
        info!(path = %target.display(), bytes = self.bytes.len(), "payload written");
        Ok(target)
    }
}

/// Fetches the payload cached under one id.
pub struct DownloadSession {
    endpoint: Arc<dyn RemoteEndpoint>,
    id: String,
}

impl DownloadSession {
    pub fn new(endpoint: Arc<dyn RemoteEndpoint>, id: impl Into<String>) -> Self {
        Self {
            endpoint,
            id: id.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Fetches and decodes the payload.
    pub async fn run(&self) -> Result<DownloadedPayload, UploadError> {
        if self.id.trim().is_empty() {
            return Err(UploadError::Validation("transfer id must not be empty".into()));
        }

        let resp = self.endpoint.download(&self.id).await?;
        let bytes = resp.decode_payload()?;
        debug!(id = %self.id, format = %resp.format, bytes = bytes.len(), "payload downloaded");

        Ok(DownloadedPayload {
            suffix: resp.file_suffix().to_string(),
            filename: resp.filename,
            format: resp.format,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::EndpointFuture;
    use crate::error::ErrorKind;
    use easytoolkit_protocol::DownloadResponse;

    struct FixedDownload(DownloadResponse);

    impl RemoteEndpoint for FixedDownload {
        fn init_transfer<'a>(
            &'a self,
            _id: &'a str,
            _filename: &'a str,
            _total_chunks: u64,
            _file_size: u64,
        ) -> EndpointFuture<'a, ()> {
            Box::pin(async { Ok(()) })
        }

        fn upload_chunk<'a>(
            &'a self,
            _id: &'a str,
            _index: u64,
            _data: Vec<u8>,
        ) -> EndpointFuture<'a, ()> {
            Box::pin(async { Ok(()) })
        }

        fn finalize_transfer<'a>(&'a self, _id: &'a str) -> EndpointFuture<'a, ()> {
            Box::pin(async { Ok(()) })
        }

        fn clear_transfer<'a>(&'a self, _id: &'a str) -> EndpointFuture<'a, ()> {
            Box::pin(async { Ok(()) })
        }

        fn download<'a>(&'a self, _id: &'a str) -> EndpointFuture<'a, DownloadResponse> {
            let resp = self.0.clone();
            Box::pin(async move { Ok(resp) })
        }
    }

    fn response(base64: &str, filename: &str, format: &str) -> DownloadResponse {
        DownloadResponse {
            success: true,
            error: None,
            base64: base64.into(),
            filename: filename.into(),
            format: format.into(),
        }
    }

    fn session(resp: DownloadResponse) -> DownloadSession {
        DownloadSession::new(Arc::new(FixedDownload(resp)), "abc")
    }

    #[tokio::test]
    async fn decodes_base64_payload() {
        let payload = session(response("aGVsbG8=", "frame", "image/png"))
            .run()
            .await
            .unwrap();
        assert_eq!(payload.bytes, b"hello");
        assert_eq!(payload.suggested_file_name(), "frame.png");
    }

    #[tokio::test]
    async fn plain_text_is_verbatim() {
        let payload = session(response("not base64!", "notes", "text/plain"))
            .run()
            .await
            .unwrap();
        assert_eq!(payload.bytes, b"not base64!");
        assert_eq!(payload.suggested_file_name(), "notes.txt");
    }

    #[tokio::test]
    async fn invalid_base64_is_decode_error() {
        let err = session(response("%%%", "x", "video/mp4"))
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Decode(_)));
        assert_eq!(err.kind(), ErrorKind::Server);
    }

    #[tokio::test]
    async fn missing_name_and_format_fall_back() {
        let payload = session(response("AA==", "", "")).run().await.unwrap();
        assert_eq!(payload.suggested_file_name(), "download.bin");
    }

    #[tokio::test]
    async fn empty_id_is_rejected() {
        let s = DownloadSession::new(
            Arc::new(FixedDownload(DownloadResponse::default())),
            " ",
        );
        assert!(matches!(s.run().await, Err(UploadError::Validation(_))));
    }

    #[tokio::test]
    async fn write_to_directory_uses_suggested_name() {
        let dir = tempfile::tempdir().unwrap();
        let payload = session(response("aGk=", "clip", "video/mp4"))
            .run()
            .await
            .unwrap();

        let written = payload.write_to(dir.path()).await.unwrap();
        assert_eq!(written, dir.path().join("clip.mp4"));
        assert_eq!(std::fs::read(&written).unwrap(), b"hi");

        let explicit = dir.path().join("renamed.bin");
        let written = payload.write_to(&explicit).await.unwrap();
        assert_eq!(written, explicit);
    }
}
