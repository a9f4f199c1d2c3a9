//! Static round-robin assignment of manifest entries to workers.

use serde::{Deserialize, Serialize};

use crate::catalog::ManifestEntry;
use crate::error::{PipelineError, PipelineResult};

/// The identity of one worker within a fixed-size run.
///
/// Worker `index` owns every entry whose manifest position `i` satisfies
/// `i % count == index`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Partition {
    index: usize,
    count: usize,
}

impl Partition {
    /// Validate `index` and `count`; requires `count >= 1` and `index < count`.
    pub fn new(index: usize, count: usize) -> PipelineResult<Self> {
        if count == 0 || index >= count {
            return Err(PipelineError::InvalidPartition { index, count });
        }
        Ok(Self { index, count })
    }

    /// The partition of a single-worker run.
    pub fn single() -> Self {
        Self { index: 0, count: 1 }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether the entry at manifest `position` belongs to this worker.
    pub fn owns(&self, position: usize) -> bool {
        position % self.count == self.index
    }

    /// The entries owned by this worker, in manifest order.
    pub fn assign<'a>(&self, entries: &'a [ManifestEntry]) -> Vec<&'a ManifestEntry> {
        entries.iter().skip(self.index).step_by(self.count).collect()
    }

    /// Every partition of a run with `count` workers.
    pub fn all(count: usize) -> PipelineResult<Vec<Self>> {
        if count == 0 {
            return Err(PipelineError::InvalidPartition { index: 0, count });
        }
        Ok((0..count).map(|index| Self { index, count }).collect())
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.index, self.count)
    }
}

/// The subsequence of `entries` owned by worker `index` of `count`.
pub fn assign(
    entries: &[ManifestEntry],
    index: usize,
    count: usize,
) -> PipelineResult<Vec<ManifestEntry>> {
    let partition = Partition::new(index, count)?;
    Ok(partition.assign(entries).into_iter().cloned().collect())
}
