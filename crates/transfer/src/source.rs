use std::future::Future;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::{ChunkRange, TransferError};

/// Random-access byte source a transfer reads its chunks from.
///
/// Only the requested range is read, so at most one chunk is resident.
pub trait ChunkSource: Send {
    /// Total size in bytes.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads exactly the bytes of `range`.
    fn read_range(
        &mut self,
        range: ChunkRange,
    ) -> impl Future<Output = Result<Vec<u8>, TransferError>> + Send;
}

/// A file on disk.
pub struct FileSource {
    file: tokio::fs::File,
    path: PathBuf,
    len: u64,
}

impl FileSource {
    /// Opens `path` for chunked reading.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, TransferError> {
        let path = path.as_ref().to_path_buf();
        let file = tokio::fs::File::open(&path).await?;
        let len = file.metadata().await?.len();
        Ok(Self { file, path, len })
    }

    /// Final path component, used as the remote file name.
    pub fn file_name(&self) -> Option<String> {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ChunkSource for FileSource {
    fn len(&self) -> u64 {
        self.len
    }

    async fn read_range(&mut self, range: ChunkRange) -> Result<Vec<u8>, TransferError> {
        if range.end > self.len {
            return Err(TransferError::InvalidArgument(format!(
                "range {}..{} exceeds file size {}",
                range.start, range.end, self.len
            )));
        }
        let mut buf = vec![0u8; range.len() as usize];
        if buf.is_empty() {
            return Ok(buf);
        }
        self.file.seek(SeekFrom::Start(range.start)).await?;
        self.file.read_exact(&mut buf).await?;
        Ok(buf)
    }
}

/// Bytes already in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    data: Vec<u8>,
}

impl MemorySource {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }
}

impl ChunkSource for MemorySource {
    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    async fn read_range(&mut self, range: ChunkRange) -> Result<Vec<u8>, TransferError> {
        let (start, end) = (range.start as usize, range.end as usize);
        self.data
            .get(start..end)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| {
                TransferError::InvalidArgument(format!(
                    "range {start}..{end} exceeds buffer of {} bytes",
                    self.data.len()
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChunkPlan;
    use std::io::Write;

    fn create_test_file(data: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(data).unwrap();
        f.flush().unwrap();
        f
    }

    #[tokio::test]
    async fn file_source_reads_every_range() {
        let f = create_test_file(b"AABBCCDDEE");
        let mut source = FileSource::open(f.path()).await.unwrap();
        assert_eq!(source.len(), 10);

        let plan = ChunkPlan::new(source.len(), 4).unwrap();
        let mut chunks = Vec::new();
        for range in plan.ranges() {
            chunks.push(source.read_range(range).await.unwrap());
        }
        assert_eq!(chunks, vec![b"AABB".to_vec(), b"CCDD".to_vec(), b"EE".to_vec()]);
    }

    #[tokio::test]
    async fn file_source_reads_out_of_order() {
        let f = create_test_file(b"0123456789");
        let mut source = FileSource::open(f.path()).await.unwrap();
        let plan = ChunkPlan::new(10, 4).unwrap();

        let tail = source.read_range(plan.range_for(2).unwrap()).await.unwrap();
        let head = source.read_range(plan.range_for(0).unwrap()).await.unwrap();
        assert_eq!(tail, b"89");
        assert_eq!(head, b"0123");
    }

    #[tokio::test]
    async fn file_source_empty_file() {
        let f = create_test_file(b"");
        let mut source = FileSource::open(f.path()).await.unwrap();
        assert!(source.is_empty());
        let plan = ChunkPlan::new(0, 4).unwrap();
        let bytes = source.read_range(plan.range_for(0).unwrap()).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn file_source_reports_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"x").unwrap();
        let source = FileSource::open(&path).await.unwrap();
        assert_eq!(source.file_name().as_deref(), Some("clip.mp4"));
    }

    #[tokio::test]
    async fn file_source_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileSource::open(dir.path().join("nope.bin")).await;
        assert!(matches!(result, Err(TransferError::Io(_))));
    }

    #[tokio::test]
    async fn memory_source_rejects_out_of_bounds() {
        let mut source = MemorySource::new(b"abc".to_vec());
        let bad = ChunkRange {
            index: 0,
            start: 2,
            end: 8,
        };
        assert!(matches!(
            source.read_range(bad).await,
            Err(TransferError::InvalidArgument(_))
        ));
    }
}
