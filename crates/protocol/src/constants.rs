use std::time::Duration;

/// Size of one upload chunk (1 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Timeout for control-plane calls (init, finalize, clear, config, access).
pub const CONTROL_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for a single chunk upload.
///
/// Chunk uploads may take significantly longer than control calls on slow
/// links; the chunk size bounds the worst case.
pub const CHUNK_TIMEOUT: Duration = Duration::from_secs(120);

/// Keepalive period used when the backend does not advertise one.
pub const DEFAULT_ACCESS_UPDATE_INTERVAL: Duration = Duration::from_secs(60);

/// Multipart field carrying the transfer id.
pub const FIELD_ID: &str = "id";

/// Multipart field carrying the decimal chunk index.
pub const FIELD_CHUNK_INDEX: &str = "chunk_index";

/// Multipart field carrying the raw chunk bytes.
pub const FIELD_CHUNK_DATA: &str = "chunk_data";

/// File name attached to the chunk part (browsers send `blob` for a sliced `Blob`).
pub const CHUNK_PART_FILE_NAME: &str = "blob";

/// A backend route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Init,
    Chunk,
    Finalize,
    Clear,
    UpdateAccess,
    Config,
    Download,
}

impl Route {
    /// Path relative to the backend base URL.
    pub const fn path(self) -> &'static str {
        match self {
            Self::Init => "/transfer/init",
            Self::Chunk => "/transfer/chunk",
            Self::Finalize => "/transfer/finalize",
            Self::Clear => "/transfer/clear",
            Self::UpdateAccess => "/transfer/update_access",
            Self::Config => "/transfer/config",
            Self::Download => "/transfer/download",
        }
    }

    /// Whether the route is fetched with `GET` rather than `POST`.
    pub const fn is_get(self) -> bool {
        matches!(self, Self::Config)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let method = if self.is_get() { "GET" } else { "POST" };
        write!(f, "{method} {}", self.path())
    }
}
