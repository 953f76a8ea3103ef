use crate::TransferError;

/// How a payload of `total_size` bytes is split into fixed-size chunks.
///
/// An empty payload still plans exactly one chunk covering `[0, 0)`, so
/// the remote side always sees init, one chunk, finalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    total_size: u64,
    chunk_size: u64,
    total_chunks: u64,
}

/// Half-open byte range `[start, end)` of one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    pub index: u64,
    pub start: u64,
    pub end: u64,
}

impl ChunkRange {
    /// Length of the range in bytes.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Returns `true` for the zero-length chunk of an empty payload.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Plans a transfer from signed sizes, rejecting negative totals and
/// non-positive chunk sizes.
pub fn plan(total_size: i64, chunk_size: i64) -> Result<ChunkPlan, TransferError> {
    if total_size < 0 {
        return Err(TransferError::InvalidArgument(format!(
            "total size must not be negative (got {total_size})"
        )));
    }
    if chunk_size <= 0 {
        return Err(TransferError::InvalidArgument(format!(
            "chunk size must be positive (got {chunk_size})"
        )));
    }
    ChunkPlan::new(total_size as u64, chunk_size as u64)
}

impl ChunkPlan {
    /// Creates a plan; `chunk_size` must be non-zero.
    pub fn new(total_size: u64, chunk_size: u64) -> Result<Self, TransferError> {
        if chunk_size == 0 {
            return Err(TransferError::InvalidArgument(
                "chunk size must be positive (got 0)".into(),
            ));
        }
        let total_chunks = total_size.div_ceil(chunk_size).max(1);
        Ok(Self {
            total_size,
            chunk_size,
            total_chunks,
        })
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    pub fn total_chunks(&self) -> u64 {
        self.total_chunks
    }

    /// Returns the byte range of chunk `index` (0-based).
    pub fn range_for(&self, index: u64) -> Result<ChunkRange, TransferError> {
        if index >= self.total_chunks {
            return Err(TransferError::InvalidArgument(format!(
                "chunk index {index} out of range (plan has {} chunks)",
                self.total_chunks
            )));
        }
        let start = index * self.chunk_size;
        let end = start.saturating_add(self.chunk_size).min(self.total_size);
        Ok(ChunkRange { index, start, end })
    }

    /// Iterates over every chunk range in index order.
    pub fn ranges(&self) -> impl Iterator<Item = ChunkRange> + '_ {
        (0..self.total_chunks).filter_map(|i| self.range_for(i).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_bytes_in_fours() {
        let p = ChunkPlan::new(10, 4).unwrap();
        assert_eq!(p.total_chunks(), 3);
        let lens: Vec<u64> = p.ranges().map(|r| r.len()).collect();
        assert_eq!(lens, vec![4, 4, 2]);
    }

    #[test]
    fn exact_multiple_has_no_tail_chunk() {
        let p = ChunkPlan::new(8, 4).unwrap();
        assert_eq!(p.total_chunks(), 2);
        assert_eq!(p.range_for(1).unwrap(), ChunkRange { index: 1, start: 4, end: 8 });
    }

    #[test]
    fn empty_payload_plans_one_empty_chunk() {
        let p = ChunkPlan::new(0, 1024).unwrap();
        assert_eq!(p.total_chunks(), 1);
        let r = p.range_for(0).unwrap();
        assert!(r.is_empty());
        assert_eq!((r.start, r.end), (0, 0));
    }

    #[test]
    fn chunk_count_is_ceiling() {
        for total in 1..200u64 {
            for chunk in 1..20u64 {
                let p = ChunkPlan::new(total, chunk).unwrap();
                assert_eq!(p.total_chunks(), total.div_ceil(chunk), "{total}/{chunk}");
            }
        }
    }

    #[test]
    fn ranges_partition_the_payload() {
        for total in 0..150u64 {
            for chunk in 1..17u64 {
                let p = ChunkPlan::new(total, chunk).unwrap();
                let ranges: Vec<ChunkRange> = p.ranges().collect();
                assert_eq!(ranges.len() as u64, p.total_chunks());
                assert_eq!(ranges[0].start, 0);
                assert_eq!(ranges[ranges.len() - 1].end, total);
                for pair in ranges.windows(2) {
                    assert_eq!(pair[0].end, pair[1].start, "gap or overlap at {total}/{chunk}");
                }
                assert!(ranges.iter().all(|r| r.len() <= chunk));
            }
        }
    }

    #[test]
    fn default_chunk_size_plan() {
        let p = ChunkPlan::new(2_500_000, 1024 * 1024).unwrap();
        assert_eq!(p.total_chunks(), 3);
        assert_eq!(p.range_for(2).unwrap().len(), 2_500_000 - 2 * 1024 * 1024);
    }

    #[test]
    fn zero_chunk_size_rejected() {
        assert!(matches!(
            ChunkPlan::new(10, 0),
            Err(TransferError::InvalidArgument(_))
        ));
        assert!(matches!(plan(10, 0), Err(TransferError::InvalidArgument(_))));
        assert!(matches!(plan(10, -4), Err(TransferError::InvalidArgument(_))));
    }

    #[test]
    fn negative_total_rejected() {
        assert!(matches!(plan(-1, 4), Err(TransferError::InvalidArgument(_))));
    }

    #[test]
    fn index_out_of_range_rejected() {
        let p = plan(10, 4).unwrap();
        assert!(p.range_for(2).is_ok());
        assert!(matches!(
            p.range_for(3),
            Err(TransferError::InvalidArgument(_))
        ));
    }
}
